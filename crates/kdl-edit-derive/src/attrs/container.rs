//! Struct-level attribute definitions.

/// Parsed from `#[edit(...)]` on the struct.
#[derive(Debug, Default)]
pub struct StructAttrs {
    /// Display name reported by `type_name()`.
    pub name: Option<String>,
}

impl StructAttrs {
    pub fn resolved_name(&self, ident: &syn::Ident) -> String {
        self.name.clone().unwrap_or_else(|| ident.to_string())
    }
}
