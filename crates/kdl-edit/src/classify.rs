use std::collections::BTreeSet;

use crate::descriptor::FieldDescriptor;
use crate::error::AccessError;
use crate::object::Editable;
use crate::path::ObjectPath;
use crate::value::FieldKind;

/// Default prefix of the companion fields that carry descriptions.
pub const DEFAULT_COMMENT_PREFIX: &str = "_comment_";

/// Embedder options for a classification pass.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Fields whose name starts with this prefix are excluded. Empty disables.
    pub comment_prefix: String,
    /// Field names excluded at any depth.
    pub excluded_fields: BTreeSet<String>,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
            excluded_fields: BTreeSet::new(),
        }
    }
}

impl ClassifyOptions {
    pub fn with_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    pub fn exclude(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_fields.extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether `field` stays out of the command tree.
    pub fn is_excluded(&self, field: &FieldDescriptor) -> bool {
        field.excluded
            || field.readonly
            || (!self.comment_prefix.is_empty() && field.name.starts_with(&self.comment_prefix))
            || self.excluded_fields.contains(field.name)
    }
}

/// One classified object: its editable fields bucketed by kind, plus one child
/// node per nested object.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigNode {
    /// Field of the parent that holds this object. `None` for the root.
    pub owner_field: Option<&'static FieldDescriptor>,
    pub path: ObjectPath,
    pub type_name: &'static str,
    pub booleans: Vec<&'static FieldDescriptor>,
    pub ints: Vec<&'static FieldDescriptor>,
    pub floats: Vec<&'static FieldDescriptor>,
    pub doubles: Vec<&'static FieldDescriptor>,
    pub opaques: Vec<&'static FieldDescriptor>,
    pub children: Vec<ConfigNode>,
    /// Nested fields that could not be resolved.
    pub issues: Vec<AccessError>,
}

impl ConfigNode {
    /// Name the node is emitted under.
    pub fn name(&self) -> &'static str {
        self.owner_field
            .map(|field| field.name)
            .unwrap_or(self.type_name)
    }

    /// All leaf descriptors in emission order.
    pub fn leaves(&self) -> impl Iterator<Item = &'static FieldDescriptor> + '_ {
        self.booleans
            .iter()
            .chain(&self.ints)
            .chain(&self.floats)
            .chain(&self.doubles)
            .chain(&self.opaques)
            .copied()
    }

    /// Leaves plus groups below this node, the node itself excluded.
    pub fn command_count(&self) -> usize {
        self.leaves().count()
            + self
                .children
                .iter()
                .map(|child| 1 + child.command_count())
                .sum::<usize>()
    }

    /// Every access failure in this subtree.
    pub fn all_issues(&self) -> Vec<&AccessError> {
        let mut issues: Vec<&AccessError> = self.issues.iter().collect();
        for child in &self.children {
            issues.extend(child.all_issues());
        }
        issues
    }
}

/// Classify a root instance.
pub fn classify(instance: &dyn Editable, options: &ClassifyOptions) -> ConfigNode {
    classify_node(None, instance, ObjectPath::root(), options)
}

/// Classify `instance`, reached through `owner_field` at `path`.
pub fn classify_node(
    owner_field: Option<&'static FieldDescriptor>,
    instance: &dyn Editable,
    path: ObjectPath,
    options: &ClassifyOptions,
) -> ConfigNode {
    let mut node = ConfigNode {
        owner_field,
        path,
        type_name: instance.type_name(),
        booleans: Vec::new(),
        ints: Vec::new(),
        floats: Vec::new(),
        doubles: Vec::new(),
        opaques: Vec::new(),
        children: Vec::new(),
        issues: Vec::new(),
    };

    for field in instance.fields() {
        if options.is_excluded(field) {
            continue;
        }
        match field.kind {
            FieldKind::Boolean => node.booleans.push(field),
            FieldKind::Integer32 => node.ints.push(field),
            FieldKind::Float32 => node.floats.push(field),
            FieldKind::Float64 => node.doubles.push(field),
            FieldKind::Opaque => node.opaques.push(field),
            FieldKind::Nested => match instance.nested(field.name) {
                Some(child) => {
                    let child_path = node.path.child(field.name);
                    node.children.push(classify_node(Some(field), child, child_path, options));
                }
                None => {
                    let err = AccessError::not_nested(instance.type_name(), field.name);
                    tracing::warn!(
                        path = %node.path,
                        field = field.name,
                        error = %err,
                        "skipping unresolvable nested field"
                    );
                    node.issues.push(err);
                }
            },
        }
    }

    node
}
