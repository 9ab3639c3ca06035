//! Type analysis used to infer how a field is exposed.

use quote::ToTokens;
use syn::{Type, TypePath};

use super::field::FieldShape;

const SEQUENCES: &[&str] = &["Vec", "VecDeque", "HashSet", "BTreeSet", "LinkedList"];

/// Standard and primitive types that serialize as plain values.
const VALUE_TYPES: &[&str] = &[
    "i8", "i16", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "char",
    "str", "String", "PathBuf", "Option", "HashMap", "BTreeMap", "Box", "Cow", "Duration",
];

/// Last path segment name, unqualified.
fn last_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(TypePath { path, qself: None }) => {
            path.segments.last().map(|s| s.ident.to_string())
        }
        Type::Group(group) => last_ident(&group.elem),
        Type::Paren(paren) => last_ident(&paren.elem),
        _ => None,
    }
}

/// Check if a type is `String` or `PathBuf`.
pub fn is_text_type(ty: &Type) -> bool {
    matches!(last_ident(ty).as_deref(), Some("String" | "PathBuf"))
}

/// Check if a type is one of the standard sequence collections.
pub fn is_sequence_type(ty: &Type) -> bool {
    last_ident(ty).is_some_and(|name| SEQUENCES.contains(&name.as_str()))
}

/// `bool`, `i32`, `f32` and `f64` are scalars, known value types are opaque,
/// and any other named type is a nested object.
pub fn infer_shape(ty: &Type) -> FieldShape {
    match ty {
        Type::Path(_) | Type::Group(_) | Type::Paren(_) => {}
        _ => return FieldShape::Opaque,
    }
    let Some(name) = last_ident(ty) else {
        return FieldShape::Opaque;
    };
    match name.as_str() {
        "bool" => FieldShape::Boolean,
        "i32" => FieldShape::Integer32,
        "f32" => FieldShape::Float32,
        "f64" => FieldShape::Float64,
        other if VALUE_TYPES.contains(&other) || SEQUENCES.contains(&other) => FieldShape::Opaque,
        _ => FieldShape::Nested,
    }
}

/// The type as written, with token spacing tidied: `Vec<String>`, `HashMap<String, i32>`.
pub fn type_label(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace(" ;", ";")
        .replace("& ", "&")
}
