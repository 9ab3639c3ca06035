use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::classify::{classify, ClassifyOptions, ConfigNode, DEFAULT_COMMENT_PREFIX};
use crate::describe::{Describer, DescriptionResolver};
use crate::descriptor::FieldDescriptor;
use crate::editor::{FieldEditor, SaveHook};
use crate::error::{PersistError, TreeError};
use crate::messages::{self, MessageCatalog};
use crate::object::Editable;
use crate::path::ObjectPath;
use crate::permission::PermissionPath;
use crate::store::ConfigStore;
use crate::tree::{
    Action, ArgumentType, Binding, CommandContext, CommandNode, CommandStatus, Requirement,
    VALUE_ARGUMENT,
};
use crate::value::FieldKind;

pub const CONFIG_LITERAL: &str = "config";
pub const EDIT_LITERAL: &str = "edit";
pub const RELOAD_LITERAL: &str = "reload";

/// Emits the command tree that mirrors a [`ConfigNode`].
#[derive(Debug, Clone)]
pub struct CommandTreeBuilder {
    store: ConfigStore,
    editor: Arc<FieldEditor>,
    resolver: Arc<DescriptionResolver>,
}

impl CommandTreeBuilder {
    pub fn new(store: ConfigStore, save: SaveHook, resolver: DescriptionResolver) -> Self {
        let editor = FieldEditor::new(store.clone(), save, resolver.catalog().clone());
        Self {
            store,
            editor: Arc::new(editor),
            resolver: Arc::new(resolver),
        }
    }

    /// Attach one literal per leaf and one group per child of `node` to `root`.
    pub fn build(
        &self,
        root: &mut CommandNode,
        node: &ConfigNode,
        permissions: &mut PermissionPath,
    ) -> Result<(), TreeError> {
        for field in node.leaves() {
            let leaf = self.leaf(node, field, permissions);
            tracing::debug!(
                command = %node.path.qualify(field.name),
                permission = leaf.permission().unwrap_or_default(),
                "emitted leaf command"
            );
            root.add_child(leaf)?;
        }

        for child in &node.children {
            let name = match child.owner_field {
                Some(owner) => owner.name.to_string(),
                None => root.name().to_string(),
            };
            let mut group = CommandNode::literal(name.as_str())
                .with_binding(Binding::Group {
                    path: child.path.clone(),
                    owner: child.owner_field,
                })
                .executes(self.group_action(node, child));

            permissions.push(&name);
            let built = self.build(&mut group, child, permissions);
            permissions.pop();
            built?;

            tracing::debug!(command = %child.path, "emitted group command");
            root.add_child(group)?;
        }
        Ok(())
    }

    fn leaf(
        &self,
        node: &ConfigNode,
        field: &'static FieldDescriptor,
        permissions: &PermissionPath,
    ) -> CommandNode {
        let path = node.path.clone();
        let editor = Arc::clone(&self.editor);
        let edit_path = path.clone();
        let edit: Action = Arc::new(move |ctx: &CommandContext<'_>| {
            editor.execute(ctx, &edit_path, field)
        });

        CommandNode::literal(field.name)
            .with_binding(Binding::Leaf {
                path: path.clone(),
                field,
            })
            .requires(Requirement::permission(permissions.child(field.name)))
            .with_argument(VALUE_ARGUMENT, argument_type(field.kind), edit)
            .executes(self.describe_action(path, field))
    }

    fn group_action(&self, parent: &ConfigNode, child: &ConfigNode) -> Action {
        match child.owner_field {
            Some(owner) => self.describe_action(parent.path.clone(), owner),
            None => Arc::new(|_: &CommandContext<'_>| CommandStatus::NotExecutable),
        }
    }

    /// Action that reports the field `field` of the object at `path`.
    fn describe_action(&self, path: ObjectPath, field: &'static FieldDescriptor) -> Action {
        let store = self.store.clone();
        let resolver = Arc::clone(&self.resolver);
        Arc::new(move |ctx: &CommandContext<'_>| {
            match store.with_object(&path, |owner| resolver.field_info(owner, field)) {
                Ok(info) => ctx.success(&info),
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "describe target vanished");
                    ctx.failure(&err.to_string());
                }
            }
            CommandStatus::Success
        })
    }
}

/// Argument type used to edit a field of `kind`.
pub fn argument_type(kind: FieldKind) -> ArgumentType {
    match kind {
        FieldKind::Boolean => ArgumentType::Bool,
        FieldKind::Integer32 => ArgumentType::Integer,
        FieldKind::Float32 => ArgumentType::Float,
        FieldKind::Float64 => ArgumentType::Double,
        FieldKind::Opaque | FieldKind::Nested => ArgumentType::GreedyString,
    }
}

/// Classify the live configuration in `store` and attach its edit commands to
/// `root`, with permissions under `permission_prefix` (dotted, may be empty).
pub fn attach_config_commands(
    root: &mut CommandNode,
    store: &ConfigStore,
    save: SaveHook,
    permission_prefix: &str,
) -> Result<(), TreeError> {
    ConfigCommands::new()
        .save_hook(save)
        .attach_to(root, store, PermissionPath::parse(permission_prefix))
}

type FreshConfig = dyn Fn() -> Result<Box<dyn Editable>, PersistError> + Send + Sync;

/// Builder for the whole `/<mod_id> config ...` command family.
#[derive(Clone)]
pub struct ConfigCommands {
    comment_prefix: String,
    excluded_fields: BTreeSet<String>,
    serialized_comments: bool,
    catalog: MessageCatalog,
    describer: Option<Describer>,
    save: SaveHook,
    fresh: Option<Arc<FreshConfig>>,
}

impl Default for ConfigCommands {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigCommands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigCommands")
            .field("comment_prefix", &self.comment_prefix)
            .field("excluded_fields", &self.excluded_fields)
            .field("serialized_comments", &self.serialized_comments)
            .field("describer", &self.describer.is_some())
            .field("reloadable", &self.fresh.is_some())
            .finish()
    }
}

impl ConfigCommands {
    pub fn new() -> Self {
        Self {
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
            excluded_fields: BTreeSet::new(),
            serialized_comments: true,
            catalog: MessageCatalog::default(),
            describer: None,
            save: SaveHook::noop(),
            fresh: None,
        }
    }

    /// Prefix of companion comment fields. Empty includes every field.
    pub fn comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    /// Replace the excluded field names.
    pub fn excluded_fields(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_fields = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_fields(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_fields.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn serialized_comments(mut self, enabled: bool) -> Self {
        self.serialized_comments = enabled;
        self
    }

    pub fn messages(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Produce descriptions with `describer` instead of the built-in lookup.
    pub fn describer<F>(mut self, describer: F) -> Self
    where
        F: Fn(&dyn Editable, &FieldDescriptor) -> String + Send + Sync + 'static,
    {
        self.describer = Some(Arc::new(describer));
        self
    }

    pub fn save_hook(mut self, save: SaveHook) -> Self {
        self.save = save;
        self
    }

    /// Enable the reload command, copying from configs built by `fresh`.
    pub fn reload_with<F>(mut self, fresh: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Editable>, PersistError> + Send + Sync + 'static,
    {
        self.fresh = Some(Arc::new(fresh));
        self
    }

    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions::default()
            .with_comment_prefix(self.comment_prefix.as_str())
            .exclude(self.excluded_fields.iter().cloned())
    }

    pub fn resolver(&self) -> DescriptionResolver {
        let resolver = DescriptionResolver::new(self.comment_prefix.as_str())
            .with_catalog(self.catalog.clone())
            .with_serialized_comments(self.serialized_comments);
        match &self.describer {
            Some(describer) => resolver.with_describer(Arc::clone(describer)),
            None => resolver,
        }
    }

    /// Classify the live config and attach its edit commands to `edit_node`.
    pub fn attach_to(
        &self,
        edit_node: &mut CommandNode,
        store: &ConfigStore,
        mut permissions: PermissionPath,
    ) -> Result<(), TreeError> {
        let node = store.with_root(|root| classify(root, &self.classify_options()));
        for issue in node.all_issues() {
            tracing::warn!(error = %issue, "field left out of the command tree");
        }
        let builder = CommandTreeBuilder::new(store.clone(), self.save.clone(), self.resolver());
        builder.build(edit_node, &node, &mut permissions)?;
        tracing::debug!(
            type_name = node.type_name,
            commands = node.command_count(),
            "attached config commands"
        );
        Ok(())
    }

    /// Build `<mod_id> config edit ...` plus `<mod_id> config reload` when a
    /// fresh-config supplier is set.
    pub fn build_root(&self, mod_id: &str, store: &ConfigStore) -> Result<CommandNode, TreeError> {
        let mut edit = CommandNode::literal(EDIT_LITERAL);
        self.attach_to(
            &mut edit,
            store,
            PermissionPath::new([mod_id, CONFIG_LITERAL, EDIT_LITERAL]),
        )?;

        let mut config = CommandNode::literal(CONFIG_LITERAL);
        if let Some(fresh) = &self.fresh {
            let permission = PermissionPath::new([mod_id, CONFIG_LITERAL]).child(RELOAD_LITERAL);
            let reload = CommandNode::literal(RELOAD_LITERAL)
                .requires(Requirement::permission(permission))
                .executes(self.reload_action(store, Arc::clone(fresh)));
            config.add_child(reload)?;
        }
        config.add_child(edit)?;

        let mut root = CommandNode::literal(mod_id);
        root.add_child(config)?;
        Ok(root)
    }

    fn reload_action(&self, store: &ConfigStore, fresh: Arc<FreshConfig>) -> Action {
        let store = store.clone();
        let save = self.save.clone();
        let catalog = self.catalog.clone();
        Arc::new(move |ctx: &CommandContext<'_>| {
            let fresh_config = match fresh() {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(error = %err, "could not build fresh config for reload");
                    let reason = err.to_string();
                    ctx.failure(&catalog.render(messages::RELOAD_FAILURE, &[reason.as_str()]));
                    return CommandStatus::Failure;
                }
            };
            let report = store.reload_from(&*fresh_config);
            if let Err(err) = save.save(&store) {
                tracing::warn!(error = %err, "saving after reload failed");
                let reason = err.to_string();
                ctx.failure(&catalog.render(messages::RELOAD_FAILURE, &[reason.as_str()]));
                return CommandStatus::Failure;
            }
            if report.is_clean() {
                ctx.success(&catalog.render(messages::RELOAD_SUCCESS, &[]));
            } else {
                let skipped = report.skipped.len().to_string();
                ctx.success(&catalog.render(messages::RELOAD_PARTIAL, &[skipped.as_str()]));
            }
            CommandStatus::Success
        })
    }
}
