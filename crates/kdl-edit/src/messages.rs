//! Plain-text feedback templates.

use std::collections::BTreeMap;

use kdl::{KdlDocument, KdlValue};

use crate::error::PersistError;

pub const EDIT_SUCCESS: &str = "command.edit.success";
pub const EDIT_FAILURE: &str = "command.edit.failure";
pub const EDIT_SAVE_FAILURE: &str = "command.edit.save_failure";
pub const NO_DESCRIPTION_FOUND: &str = "command.edit.no_description_found";
pub const DEFAULT_VALUE: &str = "misc.default";
pub const CURRENT_VALUE: &str = "misc.current_value";
pub const MODIFIED_MARKER: &str = "misc.modified";
pub const DECLARED_TYPE: &str = "misc.type";
pub const RELOAD_SUCCESS: &str = "command.reload.success";
pub const RELOAD_PARTIAL: &str = "command.reload.partial";
pub const RELOAD_FAILURE: &str = "command.reload.failure";

const DEFAULTS: &[(&str, &str)] = &[
    (EDIT_SUCCESS, "Set {0} to {1}."),
    (EDIT_FAILURE, "Failed to set {0}: {1}"),
    (EDIT_SAVE_FAILURE, "Changed {0}, but saving failed: {1}"),
    (NO_DESCRIPTION_FOUND, "no description found for {0}"),
    (DEFAULT_VALUE, "Default: {0}"),
    (CURRENT_VALUE, "Current value: {0}"),
    (MODIFIED_MARKER, "(*)"),
    (DECLARED_TYPE, "Type: {0}"),
    (RELOAD_SUCCESS, "Reloaded the configuration."),
    (RELOAD_PARTIAL, "Reloaded the configuration, {0} field(s) kept their old value."),
    (RELOAD_FAILURE, "Reloading the configuration failed: {0}"),
];

/// Message templates keyed by a stable identifier.
///
/// Templates use positional placeholders `{0}`, `{1}`, .... Keys without a
/// template render as the key itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCatalog {
    templates: BTreeMap<String, String>,
    passthrough: bool,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::english()
    }
}

impl MessageCatalog {
    /// Built-in English templates.
    pub fn english() -> Self {
        Self {
            templates: DEFAULTS
                .iter()
                .map(|(key, template)| (key.to_string(), template.to_string()))
                .collect(),
            passthrough: false,
        }
    }

    /// A catalog with no templates at all.
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
            passthrough: false,
        }
    }

    /// Render raw keys followed by their arguments, for hosts that translate
    /// on the client.
    pub fn passthrough() -> Self {
        Self {
            templates: BTreeMap::new(),
            passthrough: true,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(key, template);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    pub fn template(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Apply overrides from a KDL document of the form
    /// `messages { "command.edit.success" "..." }`.
    ///
    /// Top-level `key "template"` nodes are accepted as well.
    pub fn load_overrides(&mut self, source: &str) -> Result<usize, PersistError> {
        let doc: KdlDocument = source.parse()?;
        let mut applied = 0;
        for node in doc.nodes() {
            let entries = match (node.name().value(), node.children()) {
                ("messages", Some(children)) => children.nodes().iter().collect::<Vec<_>>(),
                _ => vec![node],
            };
            for entry in entries {
                let key = entry.name().value();
                let template = entry
                    .entries()
                    .iter()
                    .find(|arg| arg.name().is_none())
                    .map(|arg| arg.value());
                match template {
                    Some(KdlValue::String(text)) => {
                        self.insert(key, text.as_str());
                        applied += 1;
                    }
                    _ => {
                        return Err(PersistError::Custom(format!(
                            "message `{key}` needs a string template"
                        )));
                    }
                }
            }
        }
        tracing::debug!(applied, "loaded message overrides");
        Ok(applied)
    }

    /// Render `key` with `args` substituted for its placeholders.
    pub fn render(&self, key: &str, args: &[&str]) -> String {
        if self.passthrough {
            let mut out = key.to_string();
            for arg in args {
                out.push(' ');
                out.push_str(arg);
            }
            return out;
        }
        match self.templates.get(key) {
            Some(template) => substitute(template, args),
            None => key.to_string(),
        }
    }
}

fn substitute(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after.find('}').and_then(|close| {
            after[..close]
                .parse::<usize>()
                .ok()
                .map(|index| (index, close))
        });
        match placeholder {
            Some((index, close)) => {
                match args.get(index) {
                    Some(arg) => out.push_str(arg),
                    None => out.push_str(&rest[open..open + close + 2]),
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
