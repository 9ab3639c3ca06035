//! KDL 2 text rendering of a configuration graph.

use std::fmt::Write;

use serde_json::Value as JsonValue;

use crate::describe::DescriptionResolver;
use crate::descriptor::FieldDescriptor;
use crate::object::Editable;
use crate::value::FieldValue;

/// Property holding values that have no natural KDL shape.
pub const JSON_PROPERTY: &str = "json";

const RESERVED: &[&str] = &["true", "false", "null", "inf", "-inf", "nan"];

pub fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(result, "\\u{{{:x}}}", c as u32);
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') && !RESERVED.contains(&s)
}

pub fn render_key(key: &str) -> String {
    if is_valid_identifier(key) {
        key.to_string()
    } else {
        escape_string(key)
    }
}

pub fn render_float(value: f64) -> String {
    if value.is_nan() {
        return "#nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "#inf" } else { "#-inf" }.to_string();
    }
    with_fraction(value.to_string())
}

/// Like [`render_float`], using the shortest `f32` representation.
pub fn render_float32(value: f32) -> String {
    if value.is_finite() {
        with_fraction(value.to_string())
    } else {
        render_float(f64::from(value))
    }
}

fn with_fraction(s: String) -> String {
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s
    } else {
        format!("{s}.0")
    }
}

/// Render a JSON scalar as a KDL value. `None` for arrays and objects.
pub fn render_json_scalar(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => Some("#null".to_string()),
        JsonValue::Bool(true) => Some("#true".to_string()),
        JsonValue::Bool(false) => Some("#false".to_string()),
        JsonValue::Number(n) => Some(match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (None, Some(u), _) => u.to_string(),
            (None, None, Some(f)) => render_float(f),
            (None, None, None) => n.to_string(),
        }),
        JsonValue::String(s) => Some(escape_string(s)),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Entries following the node name of `field` holding `value`, each with a
/// leading space. Only sequence fields spread into several arguments.
pub fn render_field_entries(field: &FieldDescriptor, value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(b) => format!(" #{b}"),
        FieldValue::Int(n) => format!(" {n}"),
        FieldValue::Float(f) => format!(" {}", render_float32(*f)),
        FieldValue::Double(f) => format!(" {}", render_float(*f)),
        FieldValue::Opaque(json) => render_json_entries(json, field.sequence),
    }
}

fn render_json_entries(value: &JsonValue, sequence: bool) -> String {
    if let Some(scalar) = render_json_scalar(value) {
        return format!(" {scalar}");
    }
    if let (true, JsonValue::Array(items)) = (sequence, value) {
        let scalars: Option<Vec<String>> = items.iter().map(render_json_scalar).collect();
        if let Some(scalars) = scalars {
            return scalars.iter().map(|s| format!(" {s}")).collect();
        }
    }
    format!(" {JSON_PROPERTY}={}", escape_string(&value.to_string()))
}

pub fn write_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("    ");
    }
}

/// Renders configuration objects as KDL documents.
#[derive(Debug, Clone)]
pub struct ConfigRenderer {
    comment_prefix: String,
    resolver: DescriptionResolver,
}

impl ConfigRenderer {
    pub fn new(comment_prefix: impl Into<String>) -> Self {
        let comment_prefix = comment_prefix.into();
        Self {
            resolver: DescriptionResolver::new(comment_prefix.as_str()),
            comment_prefix,
        }
    }

    /// Whether `name` is a companion comment field, rendered only as comments.
    pub fn is_comment_field(&self, name: &str) -> bool {
        !self.comment_prefix.is_empty() && name.starts_with(&self.comment_prefix)
    }

    /// A full document with `config` as the single root node `root_name`.
    pub fn render_document(&self, config: &dyn Editable, root_name: &str) -> String {
        let mut out = String::new();
        self.render_object(&mut out, config, root_name, 0);
        out
    }

    fn render_object(&self, out: &mut String, object: &dyn Editable, name: &str, indent: usize) {
        write_indent(out, indent);
        out.push_str(&render_key(name));
        out.push_str(" {\n");

        for field in object.fields() {
            if self.is_comment_field(field.name) {
                continue;
            }
            for line in self.resolver.lines(object, field) {
                for part in line.lines() {
                    write_indent(out, indent + 1);
                    out.push_str("// ");
                    out.push_str(part);
                    out.push('\n');
                }
            }

            if field.is_nested() {
                match object.nested(field.name) {
                    Some(child) => self.render_object(out, child, field.name, indent + 1),
                    None => tracing::warn!(field = field.name, "nested field did not resolve"),
                }
                continue;
            }

            match object.get(field.name) {
                Ok(value) => {
                    write_indent(out, indent + 1);
                    out.push_str(&render_key(field.name));
                    out.push_str(&render_field_entries(field, &value));
                    out.push('\n');
                }
                Err(err) => {
                    tracing::warn!(field = field.name, error = %err, "field left out of document");
                }
            }
        }

        write_indent(out, indent);
        out.push_str("}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldKind;
    use serde_json::json;

    #[test]
    fn identifiers_are_quoted_when_needed() {
        assert_eq!(render_key("volume"), "volume");
        assert_eq!(render_key("max-volume"), "max-volume");
        assert_eq!(render_key("2d"), "\"2d\"");
        assert_eq!(render_key("true"), "\"true\"");
        assert_eq!(render_key("with space"), "\"with space\"");
    }

    #[test]
    fn floats_always_carry_a_fraction() {
        assert_eq!(render_float(1.0), "1.0");
        assert_eq!(render_float(0.25), "0.25");
        assert_eq!(render_float(f64::INFINITY), "#inf");
        assert_eq!(render_float32(1.1), "1.1");
    }

    #[test]
    fn opaque_values_pick_a_kdl_shape() {
        let tags = FieldDescriptor {
            sequence: true,
            ..FieldDescriptor::new("tags", FieldKind::Opaque, "Vec<String>")
        };
        let pair = FieldDescriptor::new("pair", FieldKind::Opaque, "[i32; 1]");
        let entries = |field: &FieldDescriptor, json: JsonValue| {
            render_field_entries(field, &FieldValue::Opaque(json))
        };

        assert_eq!(entries(&pair, json!("hi")), " \"hi\"");
        assert_eq!(entries(&tags, json!(["a", 2, null])), " \"a\" 2 #null");
        assert_eq!(entries(&tags, json!([])), "");
        assert_eq!(entries(&tags, json!([[1]])), r#" json="[[1]]""#);
        assert_eq!(entries(&pair, json!([7])), r#" json="[7]""#);
        assert_eq!(entries(&pair, json!({"k": 1})), r#" json="{\"k\":1}""#);
        assert_eq!(render_field_entries(&pair, &FieldValue::Bool(true)), " #true");
    }
}
