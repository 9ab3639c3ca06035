//! Loading and saving configurations as KDL files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlNode, KdlValue};
use serde_json::Value as JsonValue;

use crate::classify::DEFAULT_COMMENT_PREFIX;
use crate::descriptor::FieldDescriptor;
use crate::error::PersistError;
use crate::object::Editable;
use crate::render::{ConfigRenderer, JSON_PROPERTY};
use crate::value::{FieldKind, FieldValue};

/// Root node name used when none is configured.
pub const DEFAULT_ROOT_NAME: &str = "config";

/// Where a configuration is loaded from and saved to.
pub trait Persistence {
    /// Apply the stored configuration onto `target`. `Ok(None)` when nothing
    /// is stored yet.
    fn load_into(&self, target: &mut dyn Editable) -> Result<Option<LoadReport>, PersistError>;

    fn save(&self, config: &dyn Editable) -> Result<(), PersistError>;
}

/// A field of the document that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadIssue {
    /// Dotted node path inside the root node.
    pub path: String,
    pub message: String,
}

/// What a load applied and what it left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub applied: Vec<String>,
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn issue(&mut self, path: String, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(path = %path, reason = %message, "config entry not applied");
        self.issues.push(LoadIssue { path, message });
    }
}

/// A configuration file in KDL 2 syntax.
///
/// ```kdl
/// config {
///     // Whether the feature runs.
///     enabled #true
///     threshold 1.5
///     tags "a" "b"
///     audio {
///         volume 10
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct KdlConfigFile {
    path: PathBuf,
    root_name: String,
    comment_prefix: String,
}

impl KdlConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root_name: DEFAULT_ROOT_NAME.to_string(),
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
        }
    }

    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = root_name.into();
        self
    }

    /// Fields with this prefix are written as comments only, never loaded.
    pub fn with_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    fn renderer(&self) -> ConfigRenderer {
        ConfigRenderer::new(self.comment_prefix.as_str())
    }

    /// Render `config` the way [`Persistence::save`] writes it.
    pub fn render(&self, config: &dyn Editable) -> String {
        self.renderer().render_document(config, &self.root_name)
    }

    /// Apply a KDL document onto `target`.
    pub fn apply_str(
        &self,
        source: &str,
        target: &mut dyn Editable,
    ) -> Result<LoadReport, PersistError> {
        let doc: KdlDocument = source.parse()?;
        let root = single_root(&doc, &self.root_name)?;
        let mut report = LoadReport::default();
        if let Some(children) = root.children() {
            self.apply_document(children, target, "", &mut report);
        }
        Ok(report)
    }

    fn apply_document(
        &self,
        doc: &KdlDocument,
        target: &mut dyn Editable,
        prefix: &str,
        report: &mut LoadReport,
    ) {
        let renderer = self.renderer();
        for node in doc.nodes() {
            let name = node.name().value();
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            };
            let Some(field) = target.fields().iter().find(|field| field.name == name) else {
                report.issue(path, format!("{} has no field `{name}`", target.type_name()));
                continue;
            };
            if field.readonly || renderer.is_comment_field(field.name) {
                tracing::debug!(path = %path, "ignoring stored value of fixed field");
                continue;
            }

            if field.is_nested() {
                let type_name = target.type_name();
                match (target.nested_mut(field.name), node.children()) {
                    (Some(child), Some(children)) => {
                        self.apply_document(children, child, &path, report);
                    }
                    (None, _) => {
                        report.issue(path, format!("{type_name} cannot resolve `{name}`"));
                    }
                    (Some(_), None) => report.issue(path, "expected a block of fields"),
                }
                continue;
            }

            let value = match decode_field(field, node) {
                Ok(value) => value,
                Err(message) => {
                    report.issue(path, message);
                    continue;
                }
            };
            match target.set(field.name, value) {
                Ok(()) => report.applied.push(path),
                Err(err) => report.issue(path, err.to_string()),
            }
        }
    }
}

impl Persistence for KdlConfigFile {
    fn load_into(&self, target: &mut dyn Editable) -> Result<Option<LoadReport>, PersistError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let report = self.apply_str(&contents, target)?;
        tracing::debug!(
            path = %self.path.display(),
            applied = report.applied.len(),
            issues = report.issues.len(),
            "loaded config file"
        );
        Ok(Some(report))
    }

    fn save(&self, config: &dyn Editable) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let existed = self.path.exists();
        fs::write(&self.path, self.render(config))?;
        if !existed {
            tracing::info!(path = %self.path.display(), "created config file");
        }
        Ok(())
    }
}

fn single_root<'a>(doc: &'a KdlDocument, root_name: &str) -> Result<&'a KdlNode, PersistError> {
    match doc.nodes() {
        [node] if node.name().value() == root_name => Ok(node),
        nodes => Err(PersistError::Shape {
            expected: root_name.to_string(),
            found: if nodes.is_empty() {
                "nothing".to_string()
            } else {
                nodes
                    .iter()
                    .map(|node| format!("`{}`", node.name().value()))
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        }),
    }
}

/// Read the value a field node carries.
fn decode_field(field: &FieldDescriptor, node: &KdlNode) -> Result<FieldValue, String> {
    let mut args = Vec::new();
    let mut json = None;
    for entry in node.entries() {
        match entry.name().map(|name| name.value()) {
            None => args.push(entry.value()),
            Some(JSON_PROPERTY) => json = Some(entry.value()),
            Some(other) => return Err(format!("unexpected property `{other}`")),
        }
    }

    if let Some(json) = json {
        if !args.is_empty() || field.kind != FieldKind::Opaque {
            return Err("`json` must be the only entry of an opaque field".to_string());
        }
        let KdlValue::String(text) = json else {
            return Err("`json` must hold a string".to_string());
        };
        return serde_json::from_str(text)
            .map(FieldValue::Opaque)
            .map_err(|err| format!("invalid json: {err}"));
    }

    if field.kind == FieldKind::Opaque {
        return match args.as_slice() {
            [] if field.sequence => Ok(FieldValue::Opaque(JsonValue::Array(Vec::new()))),
            [] => Err("missing value".to_string()),
            [single] if !field.sequence => kdl_to_json(single).map(FieldValue::Opaque),
            many => many
                .iter()
                .map(|value| kdl_to_json(value))
                .collect::<Result<Vec<_>, _>>()
                .map(|items| FieldValue::Opaque(JsonValue::Array(items))),
        };
    }

    let [value] = args.as_slice() else {
        return Err(format!("expected exactly one value, found {}", args.len()));
    };
    match (field.kind, *value) {
        (FieldKind::Boolean, KdlValue::Bool(b)) => Ok(FieldValue::Bool(*b)),
        (FieldKind::Integer32, KdlValue::Integer(n)) => i32::try_from(*n)
            .map(FieldValue::Int)
            .map_err(|_| format!("{n} does not fit in an i32")),
        (FieldKind::Float32, KdlValue::Float(f)) => Ok(FieldValue::Float(*f as f32)),
        (FieldKind::Float32, KdlValue::Integer(n)) => Ok(FieldValue::Float(*n as f32)),
        (FieldKind::Float64, KdlValue::Float(f)) => Ok(FieldValue::Double(*f)),
        (FieldKind::Float64, KdlValue::Integer(n)) => Ok(FieldValue::Double(*n as f64)),
        (kind, other) => Err(format!("expected {}, found {other}", kind.label())),
    }
}

fn kdl_to_json(value: &KdlValue) -> Result<JsonValue, String> {
    match value {
        KdlValue::String(s) => Ok(JsonValue::String(s.clone())),
        KdlValue::Bool(b) => Ok(JsonValue::Bool(*b)),
        KdlValue::Null => Ok(JsonValue::Null),
        KdlValue::Integer(n) => {
            if let Ok(i) = i64::try_from(*n) {
                Ok(JsonValue::from(i))
            } else if let Ok(u) = u64::try_from(*n) {
                Ok(JsonValue::from(u))
            } else {
                Err(format!("{n} is out of range"))
            }
        }
        KdlValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| format!("{f} has no json representation")),
    }
}

/// A default `T` with the stored configuration applied.
///
/// Nothing stored yields the default. Read and parse failures are returned.
pub fn fresh_instance<T>(persistence: &dyn Persistence) -> Result<T, PersistError>
where
    T: Editable + Default,
{
    let mut config = T::default();
    persistence.load_into(&mut config)?;
    Ok(config)
}

/// Load `file` if it exists, fall back to `T::default()` otherwise or when
/// the file cannot be read, and write the result back.
pub fn load_or_default<T>(file: &KdlConfigFile) -> T
where
    T: Editable + Default,
{
    let config = match fresh_instance::<T>(file) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                path = %file.path().display(),
                error = %err,
                "could not load config, using defaults"
            );
            T::default()
        }
    };
    if let Err(err) = file.save(&config) {
        tracing::warn!(path = %file.path().display(), error = %err, "could not write config");
    }
    config
}
