use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::classify::DEFAULT_COMMENT_PREFIX;
use crate::descriptor::FieldDescriptor;
use crate::messages::{self, MessageCatalog};
use crate::object::Editable;
use crate::value::FieldValue;

/// Replacement for the built-in description lookup.
pub type Describer = Arc<dyn Fn(&dyn Editable, &FieldDescriptor) -> String + Send + Sync>;

/// Computes human-readable descriptions of fields.
///
/// Description lines come from, in order: the field's own description, its
/// explicit comment lines, and companion fields. A companion is another field
/// of the same object whose name starts with the comment prefix and contains
/// the described field's name, e.g. `_comment_volume0`, `_comment_volume1`.
#[derive(Clone)]
pub struct DescriptionResolver {
    comment_prefix: String,
    serialized_comments: bool,
    catalog: MessageCatalog,
    custom: Option<Describer>,
}

impl Default for DescriptionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_COMMENT_PREFIX)
    }
}

impl fmt::Debug for DescriptionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptionResolver")
            .field("comment_prefix", &self.comment_prefix)
            .field("serialized_comments", &self.serialized_comments)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl DescriptionResolver {
    pub fn new(comment_prefix: impl Into<String>) -> Self {
        Self {
            comment_prefix: comment_prefix.into(),
            serialized_comments: true,
            catalog: MessageCatalog::default(),
            custom: None,
        }
    }

    pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Whether `#[serde(rename = "// ...")]` text counts as companion content.
    pub fn with_serialized_comments(mut self, enabled: bool) -> Self {
        self.serialized_comments = enabled;
        self
    }

    pub fn with_describer(mut self, describer: Describer) -> Self {
        self.custom = Some(describer);
        self
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    pub fn comment_prefix(&self) -> &str {
        &self.comment_prefix
    }

    /// Description of `field`, owned by `owner`.
    pub fn describe(&self, owner: &dyn Editable, field: &FieldDescriptor) -> String {
        if let Some(custom) = &self.custom {
            return custom(owner, field);
        }

        let lines = self.lines(owner, field);
        if lines.is_empty() {
            return self
                .catalog
                .render(messages::NO_DESCRIPTION_FOUND, &[field.name]);
        }
        lines.join("\n")
    }

    /// Built-in description lines, without the no-description fallback.
    pub fn lines(&self, owner: &dyn Editable, field: &FieldDescriptor) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        if let Some(description) = field.description.filter(|d| !d.is_empty()) {
            lines.push(description.to_string());
        }
        lines.extend(field.comments.iter().map(|line| line.to_string()));
        lines.extend(self.companion_lines(owner, field));
        lines
    }

    /// Lines contributed by companion fields, ordered by their index suffix.
    pub fn companion_lines(&self, owner: &dyn Editable, field: &FieldDescriptor) -> Vec<String> {
        if self.comment_prefix.is_empty() {
            return Vec::new();
        }
        let companions: Vec<&FieldDescriptor> = owner
            .fields()
            .iter()
            .filter(|other| {
                other.name != field.name
                    && other.name.starts_with(&self.comment_prefix)
                    && other.name.contains(field.name)
            })
            .collect();

        let mut slots: Vec<Option<String>> = vec![None; companions.len()];
        for companion in companions {
            let Some(content) = self.companion_content(owner, companion) else {
                continue;
            };
            let index = trailing_index(companion.name);
            // Out-of-range indices are dropped, repeated ones overwrite.
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(content);
            }
        }
        slots.into_iter().flatten().collect()
    }

    fn companion_content(
        &self,
        owner: &dyn Editable,
        companion: &FieldDescriptor,
    ) -> Option<String> {
        if let Some(description) = companion.description.filter(|d| !d.is_empty()) {
            return Some(description.to_string());
        }
        if self.serialized_comments {
            if let Some(comment) = companion.serialized_comment {
                return Some(comment.to_string());
            }
        }
        match owner.get(companion.name) {
            Ok(FieldValue::Opaque(JsonValue::String(text))) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// Full report for a describe action: description, default value, current
    /// value and declared type. Nested fields only carry their description.
    pub fn field_info(&self, owner: &dyn Editable, field: &FieldDescriptor) -> String {
        let mut out = self.describe(owner, field);

        let default = field.default_option.filter(|d| !d.is_empty());
        if let Some(default) = default {
            out.push('\n');
            out.push_str(&self.catalog.render(messages::DEFAULT_VALUE, &[default]));
        }

        if field.is_nested() {
            return out;
        }

        match owner.get(field.name) {
            Ok(value) => {
                let mut current = value.to_string();
                if default.is_some_and(|d| d != current) {
                    current.push(' ');
                    current.push_str(&self.catalog.render(messages::MODIFIED_MARKER, &[]));
                }
                out.push('\n');
                out.push_str(&self.catalog.render(messages::CURRENT_VALUE, &[current.as_str()]));
            }
            Err(err) => {
                tracing::warn!(field = field.name, error = %err, "could not read current value");
            }
        }

        out.push('\n');
        out.push_str(&self.catalog.render(messages::DECLARED_TYPE, &[field.type_name]));
        out
    }
}

/// Zero-based index carried by the trailing digits of a companion name.
pub fn trailing_index(name: &str) -> usize {
    let digits = name.len() - name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    name[name.len() - digits..].parse().unwrap_or(0)
}
