//! Field-level attribute definitions.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{spanned::Spanned, Field, Ident, Type};

use super::parse::{parse_field_attrs, serde_comment_from_attrs};
use super::type_utils::{infer_shape, is_sequence_type, is_text_type, type_label};

/// Raw values of `#[edit(...)]` on one field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    pub span: Option<Span>,
    pub skip: bool,
    pub exclude: bool,
    pub readonly: bool,
    pub rename: Option<String>,
    pub description: Option<String>,
    pub default: Option<String>,
    pub comments: Vec<String>,
    pub nested: bool,
    pub opaque: bool,
}

/// How a field is exposed through `Editable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Boolean,
    Integer32,
    Float32,
    Float64,
    Opaque,
    Nested,
}

impl FieldShape {
    /// Path of the matching `FieldKind` variant.
    pub fn kind_tokens(self) -> TokenStream {
        match self {
            FieldShape::Boolean => quote!(::kdl_edit::FieldKind::Boolean),
            FieldShape::Integer32 => quote!(::kdl_edit::FieldKind::Integer32),
            FieldShape::Float32 => quote!(::kdl_edit::FieldKind::Float32),
            FieldShape::Float64 => quote!(::kdl_edit::FieldKind::Float64),
            FieldShape::Opaque => quote!(::kdl_edit::FieldKind::Opaque),
            FieldShape::Nested => quote!(::kdl_edit::FieldKind::Nested),
        }
    }
}

/// A field ready for code generation.
#[derive(Debug)]
pub struct FieldInfo {
    pub ident: Ident,
    pub ty: Type,
    /// Name used for lookups and commands.
    pub name: String,
    pub shape: FieldShape,
    pub type_label: String,
    pub text: bool,
    pub sequence: bool,
    pub attrs: FieldAttrs,
    pub serialized_comment: Option<String>,
}

impl FieldInfo {
    /// `None` for `#[edit(skip)]` fields.
    pub fn from_field(field: &Field) -> syn::Result<Option<Self>> {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            return Ok(None);
        }
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "tuple structs are not supported"))?;

        if attrs.nested && attrs.opaque {
            return Err(syn::Error::new(
                attrs.span.unwrap_or_else(|| ident.span()),
                "a field cannot be both `nested` and `opaque`",
            ));
        }

        let ty = field.ty.clone();
        let shape = if attrs.nested {
            FieldShape::Nested
        } else if attrs.opaque {
            FieldShape::Opaque
        } else {
            infer_shape(&ty)
        };
        // `r#type` is exposed as `type`.
        let name = attrs
            .rename
            .clone()
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());

        Ok(Some(Self {
            name,
            shape,
            type_label: type_label(&ty),
            text: is_text_type(&ty),
            sequence: is_sequence_type(&ty),
            serialized_comment: serde_comment_from_attrs(&field.attrs)?,
            ident,
            ty,
            attrs,
        }))
    }

    pub fn is_readonly(&self) -> bool {
        self.attrs.readonly
    }

    pub fn is_excluded(&self) -> bool {
        self.attrs.exclude || self.attrs.readonly
    }
}
