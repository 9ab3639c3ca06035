use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::AccessError;

/// Semantic kind of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Boolean,
    Integer32,
    Float32,
    Float64,
    /// Strings, sequences and any other serde value, edited as one text payload.
    Opaque,
    /// A structured object that is itself [`crate::Editable`].
    Nested,
}

impl FieldKind {
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Integer32 => "integer",
            FieldKind::Float32 => "float",
            FieldKind::Float64 => "double",
            FieldKind::Opaque => "value",
            FieldKind::Nested => "object",
        }
    }

    pub fn is_scalar(self) -> bool {
        !matches!(self, FieldKind::Nested)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current value of a non-nested field, as exchanged with generated accessors.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Double(f64),
    Opaque(JsonValue),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Boolean,
            FieldValue::Int(_) => FieldKind::Integer32,
            FieldValue::Float(_) => FieldKind::Float32,
            FieldValue::Double(_) => FieldKind::Float64,
            FieldValue::Opaque(_) => FieldKind::Opaque,
        }
    }

    pub fn label(&self) -> &'static str {
        self.kind().label()
    }

    /// Serialize an opaque field value.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(FieldValue::Opaque)
    }

    pub fn into_json(self) -> JsonValue {
        match self {
            FieldValue::Bool(b) => JsonValue::Bool(b),
            FieldValue::Int(n) => JsonValue::from(n),
            FieldValue::Float(f) => JsonValue::from(f),
            FieldValue::Double(f) => JsonValue::from(f),
            FieldValue::Opaque(v) => v,
        }
    }

    pub fn into_bool(self, type_name: &'static str, field: &str) -> Result<bool, AccessError> {
        match self {
            FieldValue::Bool(b) => Ok(b),
            other => Err(AccessError::wrong_kind(
                type_name,
                field,
                FieldKind::Boolean.label(),
                other.label(),
            )),
        }
    }

    pub fn into_i32(self, type_name: &'static str, field: &str) -> Result<i32, AccessError> {
        match self {
            FieldValue::Int(n) => Ok(n),
            other => Err(AccessError::wrong_kind(
                type_name,
                field,
                FieldKind::Integer32.label(),
                other.label(),
            )),
        }
    }

    pub fn into_f32(self, type_name: &'static str, field: &str) -> Result<f32, AccessError> {
        match self {
            FieldValue::Float(f) => Ok(f),
            FieldValue::Int(n) => Ok(n as f32),
            other => Err(AccessError::wrong_kind(
                type_name,
                field,
                FieldKind::Float32.label(),
                other.label(),
            )),
        }
    }

    pub fn into_f64(self, type_name: &'static str, field: &str) -> Result<f64, AccessError> {
        match self {
            FieldValue::Double(f) => Ok(f),
            FieldValue::Float(f) => Ok(f64::from(f)),
            FieldValue::Int(n) => Ok(f64::from(n)),
            other => Err(AccessError::wrong_kind(
                type_name,
                field,
                FieldKind::Float64.label(),
                other.label(),
            )),
        }
    }

    /// Deserialize into the declared shape of an opaque field.
    pub fn into_opaque<T: DeserializeOwned>(
        self,
        type_name: &'static str,
        field: &str,
    ) -> Result<T, AccessError> {
        serde_json::from_value(self.into_json())
            .map_err(|err| AccessError::convert(type_name, field, err))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Double(v) => write!(f, "{v}"),
            FieldValue::Opaque(JsonValue::String(s)) => f.write_str(s),
            FieldValue::Opaque(other) => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_scalar_conversions() {
        assert_eq!(FieldValue::Bool(true).into_bool("T", "flag"), Ok(true));
        let err = FieldValue::Int(3).into_bool("T", "flag").unwrap_err();
        assert_eq!(err, AccessError::wrong_kind("T", "flag", "boolean", "integer"));
        assert_eq!(FieldValue::Int(3).into_f64("T", "ratio"), Ok(3.0));
    }

    #[test]
    fn opaque_values_display_without_quotes_for_strings() {
        let text = FieldValue::from_serialize("hello").unwrap();
        assert_eq!(text.to_string(), "hello");

        let list = FieldValue::from_serialize(&vec!["a", "b"]).unwrap();
        assert_eq!(list.to_string(), r#"["a","b"]"#);
    }

    #[test]
    fn opaque_deserializes_into_declared_shape() {
        let value = FieldValue::Opaque(serde_json::json!([1, 2, 3]));
        let parsed: Vec<u8> = value.into_opaque("T", "bytes").unwrap();
        assert_eq!(parsed, vec![1, 2, 3]);

        let bad = FieldValue::Opaque(serde_json::json!("nope"));
        assert!(matches!(
            bad.into_opaque::<Vec<u8>>("T", "bytes"),
            Err(AccessError::Convert { .. })
        ));
    }
}
