use crate::value::FieldKind;

/// Static metadata about one field of an [`crate::Editable`] struct.
///
/// Generated by `#[derive(Editable)]` as a `const` table in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field (and command) name, unique within the owning struct.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Declared Rust type as written in the struct.
    pub type_name: &'static str,
    /// Never emitted as a command.
    pub excluded: bool,
    /// Rejected by mutators and skipped by reload. Implies `excluded`.
    pub readonly: bool,
    /// Declared type is text (`String`, `PathBuf`); free text is stored as-is.
    pub text: bool,
    /// Declared type is a sequence collection.
    pub sequence: bool,
    pub description: Option<&'static str>,
    /// Value a freshly constructed config carries, for display.
    pub default_option: Option<&'static str>,
    /// Explicit description lines, in order.
    pub comments: &'static [&'static str],
    /// Comment text carried by a `#[serde(rename = "// ...")]` attribute.
    pub serialized_comment: Option<&'static str>,
}

impl FieldDescriptor {
    /// A plain, included field with no description metadata.
    pub const fn new(name: &'static str, kind: FieldKind, type_name: &'static str) -> Self {
        Self {
            name,
            kind,
            type_name,
            excluded: false,
            readonly: false,
            text: false,
            sequence: false,
            description: None,
            default_option: None,
            comments: &[],
            serialized_comment: None,
        }
    }

    pub fn is_nested(&self) -> bool {
        self.kind == FieldKind::Nested
    }
}
