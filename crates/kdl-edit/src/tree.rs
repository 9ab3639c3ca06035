//! Minimal in-memory command tree: literal nodes with one optional typed
//! argument, permission requirements and execution actions.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::descriptor::FieldDescriptor;
use crate::error::TreeError;
use crate::path::ObjectPath;

/// Name of the typed argument attached to every leaf.
pub const VALUE_ARGUMENT: &str = "value";

/// Result of executing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandStatus {
    Success,
    Failure,
    /// The node exists only to group its children.
    NotExecutable,
}

impl CommandStatus {
    pub fn code(self) -> i32 {
        match self {
            CommandStatus::Success => 1,
            CommandStatus::Failure => 0,
            CommandStatus::NotExecutable => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentType {
    Bool,
    Integer,
    Float,
    Double,
    /// Consumes the rest of the input.
    GreedyString,
}

impl ArgumentType {
    pub fn is_greedy(self) -> bool {
        matches!(self, ArgumentType::GreedyString)
    }

    pub fn label(self) -> &'static str {
        match self {
            ArgumentType::Bool => "bool",
            ArgumentType::Integer => "integer",
            ArgumentType::Float => "float",
            ArgumentType::Double => "double",
            ArgumentType::GreedyString => "text",
        }
    }

    pub fn parse(self, raw: &str) -> Result<ArgValue, String> {
        match self {
            ArgumentType::Bool => match raw {
                "true" => Ok(ArgValue::Bool(true)),
                "false" => Ok(ArgValue::Bool(false)),
                _ => Err(format!("expected true or false, got `{raw}`")),
            },
            ArgumentType::Integer => raw
                .parse::<i32>()
                .map(ArgValue::Integer)
                .map_err(|err| format!("invalid integer `{raw}`: {err}")),
            ArgumentType::Float => raw
                .parse::<f32>()
                .map(ArgValue::Float)
                .map_err(|err| format!("invalid float `{raw}`: {err}")),
            ArgumentType::Double => raw
                .parse::<f64>()
                .map(ArgValue::Double)
                .map_err(|err| format!("invalid double `{raw}`: {err}")),
            ArgumentType::GreedyString => Ok(ArgValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Integer(i32),
    Float(f32),
    Double(f64),
    Text(String),
}

impl ArgValue {
    pub fn label(&self) -> &'static str {
        match self {
            ArgValue::Bool(_) => "boolean",
            ArgValue::Integer(_) => "integer",
            ArgValue::Float(_) => "float",
            ArgValue::Double(_) => "double",
            ArgValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Integer(n) => write!(f, "{n}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Double(v) => write!(f, "{v}"),
            ArgValue::Text(s) => f.write_str(s),
        }
    }
}

/// What a command node stands for in the configuration graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// An editable field of the object at `path`.
    Leaf {
        path: ObjectPath,
        field: &'static FieldDescriptor,
    },
    /// The nested object at `path`, held by `owner` of its parent.
    Group {
        path: ObjectPath,
        owner: Option<&'static FieldDescriptor>,
    },
    Plain,
}

/// The party executing a command.
pub trait CommandSource {
    /// Whether `permission` is granted, `fallback` when the host has no
    /// opinion about it.
    fn check_permission(&self, permission: &str, fallback: bool) -> bool;

    /// Whether the source passes the host's default operator check.
    fn baseline_authorized(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    Success,
    Failure,
}

/// Channel that receives messages produced by commands.
pub trait Feedback {
    fn send(&self, kind: FeedbackKind, message: &str);
}

/// Permission gate of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone may run the node.
    #[default]
    None,
    /// An empty permission defers to the host baseline.
    Permission(String),
}

impl Requirement {
    pub fn permission(permission: impl Into<String>) -> Self {
        Requirement::Permission(permission.into())
    }

    pub fn allows(&self, source: &dyn CommandSource) -> bool {
        match self {
            Requirement::None => true,
            Requirement::Permission(permission) if permission.is_empty() => {
                source.baseline_authorized()
            }
            Requirement::Permission(permission) => {
                source.check_permission(permission, source.baseline_authorized())
            }
        }
    }
}

/// Everything an action sees while it runs.
pub struct CommandContext<'a> {
    pub source: &'a dyn CommandSource,
    pub feedback: &'a dyn Feedback,
    pub argument: Option<&'a ArgValue>,
}

impl CommandContext<'_> {
    pub fn success(&self, message: &str) {
        self.feedback.send(FeedbackKind::Success, message);
    }

    pub fn failure(&self, message: &str) {
        self.feedback.send(FeedbackKind::Failure, message);
    }
}

pub type Action = Arc<dyn Fn(&CommandContext<'_>) -> CommandStatus + Send + Sync>;

/// The typed argument child of a literal.
#[derive(Clone)]
pub struct Argument {
    pub name: String,
    pub kind: ArgumentType,
    pub action: Action,
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A literal command node.
#[derive(Clone)]
pub struct CommandNode {
    name: String,
    binding: Binding,
    requirement: Requirement,
    argument: Option<Argument>,
    action: Option<Action>,
    children: Vec<CommandNode>,
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("binding", &self.binding)
            .field("requirement", &self.requirement)
            .field("argument", &self.argument)
            .field("executable", &self.action.is_some())
            .field("children", &self.children)
            .finish()
    }
}

impl CommandNode {
    pub fn literal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: Binding::Plain,
            requirement: Requirement::None,
            argument: None,
            action: None,
            children: Vec::new(),
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    pub fn requires(mut self, requirement: Requirement) -> Self {
        self.requirement = requirement;
        self
    }

    /// Action run when the node is invoked without an argument.
    pub fn executes(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_argument(
        mut self,
        name: impl Into<String>,
        kind: ArgumentType,
        action: Action,
    ) -> Self {
        self.argument = Some(Argument {
            name: name.into(),
            kind,
            action,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Permission string of the node, if it is gated by one.
    pub fn permission(&self) -> Option<&str> {
        match &self.requirement {
            Requirement::None => None,
            Requirement::Permission(permission) => Some(permission),
        }
    }

    pub fn argument(&self) -> Option<&Argument> {
        self.argument.as_ref()
    }

    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut CommandNode> {
        self.children.iter_mut().find(|child| child.name == name)
    }

    /// Attach `child`; sibling names must be unique.
    pub fn add_child(&mut self, child: CommandNode) -> Result<&mut CommandNode, TreeError> {
        if self.child(&child.name).is_some() {
            return Err(TreeError::DuplicateChild {
                parent: self.name.clone(),
                name: child.name,
            });
        }
        self.children.push(child);
        let index = self.children.len() - 1;
        Ok(&mut self.children[index])
    }

    /// Follow literal names below this node.
    pub fn find(&self, names: &[&str]) -> Option<&CommandNode> {
        let mut current = self;
        for name in names {
            current = current.child(name)?;
        }
        Some(current)
    }

    /// Visit every node below this one depth-first, in insertion order, with
    /// the literal names leading to it.
    pub fn walk(&self, visit: &mut dyn FnMut(&[&str], &CommandNode)) {
        let mut names = Vec::new();
        self.walk_inner(&mut names, visit);
    }

    fn walk_inner<'a>(
        &'a self,
        names: &mut Vec<&'a str>,
        visit: &mut dyn FnMut(&[&str], &CommandNode),
    ) {
        for child in &self.children {
            names.push(&child.name);
            visit(names, child);
            child.walk_inner(names, visit);
            names.pop();
        }
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

/// A command source backed by an explicit permission set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    granted: BTreeSet<String>,
    operator: bool,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that passes the baseline check and therefore every fallback.
    pub fn operator() -> Self {
        Self {
            granted: BTreeSet::new(),
            operator: true,
        }
    }

    pub fn grant(mut self, permission: impl Into<String>) -> Self {
        self.granted.insert(permission.into());
        self
    }
}

impl CommandSource for PermissionSet {
    fn check_permission(&self, permission: &str, fallback: bool) -> bool {
        self.granted.contains(permission) || fallback
    }

    fn baseline_authorized(&self) -> bool {
        self.operator
    }
}

/// Feedback sink that records every message.
#[derive(Debug, Default)]
pub struct FeedbackLog {
    messages: Mutex<Vec<(FeedbackKind, String)>>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(FeedbackKind, String)> {
        self.messages.lock().clone()
    }

    pub fn last(&self) -> Option<(FeedbackKind, String)> {
        self.messages.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl Feedback for FeedbackLog {
    fn send(&self, kind: FeedbackKind, message: &str) {
        tracing::debug!(?kind, text = message, "command feedback");
        self.messages.lock().push((kind, message.to_string()));
    }
}
