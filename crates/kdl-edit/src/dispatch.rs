use crate::error::{DispatchError, TreeError};
use crate::tree::{CommandContext, CommandNode, CommandSource, CommandStatus, Feedback};

/// Executes text input against registered command trees.
#[derive(Debug, Default, Clone)]
pub struct Dispatcher {
    roots: Vec<CommandNode>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root literal. Root names must be unique.
    pub fn register(&mut self, node: CommandNode) -> Result<&mut CommandNode, TreeError> {
        if self.root(node.name()).is_some() {
            return Err(TreeError::DuplicateChild {
                parent: "<dispatcher>".to_string(),
                name: node.name().to_string(),
            });
        }
        tracing::debug!(command = node.name(), "registered command");
        self.roots.push(node);
        let index = self.roots.len() - 1;
        Ok(&mut self.roots[index])
    }

    pub fn root(&self, name: &str) -> Option<&CommandNode> {
        self.roots.iter().find(|root| root.name() == name)
    }

    pub fn root_mut(&mut self, name: &str) -> Option<&mut CommandNode> {
        self.roots.iter_mut().find(|root| root.name() == name)
    }

    pub fn roots(&self) -> &[CommandNode] {
        &self.roots
    }

    /// Parse and run `input`, e.g. `mymod config edit enabled false`.
    pub fn execute(
        &self,
        input: &str,
        source: &dyn CommandSource,
        feedback: &dyn Feedback,
    ) -> Result<CommandStatus, DispatchError> {
        let unknown = || DispatchError::UnknownCommand {
            input: input.trim().to_string(),
        };

        let (first, mut rest) = split_token(input).ok_or_else(unknown)?;
        let mut node = self.root(first).ok_or_else(unknown)?;
        let mut path = vec![node.name()];
        if !node.requirement().allows(source) {
            return Err(DispatchError::PermissionDenied {
                path: path.join(" "),
            });
        }

        loop {
            let Some((token, after)) = split_token(rest) else {
                let action = node.action().ok_or_else(|| DispatchError::Incomplete {
                    path: path.join(" "),
                })?;
                let ctx = CommandContext {
                    source,
                    feedback,
                    argument: None,
                };
                return Ok(action(&ctx));
            };

            if let Some(child) = node.child(token) {
                path.push(child.name());
                if !child.requirement().allows(source) {
                    return Err(DispatchError::PermissionDenied {
                        path: path.join(" "),
                    });
                }
                node = child;
                rest = after;
                continue;
            }

            let argument = node.argument().ok_or_else(unknown)?;
            let raw = if argument.kind.is_greedy() {
                rest.trim()
            } else {
                if split_token(after).is_some() {
                    return Err(DispatchError::InvalidArgument {
                        path: path.join(" "),
                        message: format!("unexpected input after `{token}`"),
                    });
                }
                token
            };
            let value = argument
                .kind
                .parse(raw)
                .map_err(|message| DispatchError::InvalidArgument {
                    path: path.join(" "),
                    message,
                })?;
            tracing::debug!(command = %path.join(" "), argument = %value, "dispatching");
            let ctx = CommandContext {
                source,
                feedback,
                argument: Some(&value),
            };
            return Ok((argument.action)(&ctx));
        }
    }

    /// Every runnable form `source` may use, one line each.
    pub fn usage(&self, source: &dyn CommandSource) -> Vec<String> {
        let mut lines = Vec::new();
        for root in &self.roots {
            collect_usage(root, root.name().to_string(), source, &mut lines);
        }
        lines
    }
}

fn collect_usage(
    node: &CommandNode,
    prefix: String,
    source: &dyn CommandSource,
    lines: &mut Vec<String>,
) {
    if !node.requirement().allows(source) {
        return;
    }
    if node.action().is_some() {
        lines.push(prefix.clone());
    }
    if let Some(argument) = node.argument() {
        lines.push(format!("{prefix} <{}:{}>", argument.name, argument.kind));
    }
    for child in node.children() {
        collect_usage(child, format!("{prefix} {}", child.name()), source, lines);
    }
}

/// Split off the next whitespace-delimited token.
fn split_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(end) => Some((&input[..end], &input[end..])),
        None => Some((input, "")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tree::{ArgValue, ArgumentType, FeedbackLog, PermissionSet, Requirement};

    fn echo_tree() -> CommandNode {
        let echo = CommandNode::literal("say").with_argument(
            "value",
            ArgumentType::GreedyString,
            Arc::new(|ctx: &CommandContext<'_>| {
                if let Some(ArgValue::Text(text)) = ctx.argument {
                    ctx.success(text);
                }
                CommandStatus::Success
            }),
        );
        let count = CommandNode::literal("count")
            .requires(Requirement::permission("demo.count"))
            .with_argument(
                "value",
                ArgumentType::Integer,
                Arc::new(|_: &CommandContext<'_>| CommandStatus::Success),
            );
        let mut root = CommandNode::literal("demo");
        root.add_child(echo).unwrap();
        root.add_child(count).unwrap();
        root
    }

    #[test]
    fn greedy_arguments_take_the_rest_of_the_line() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(echo_tree()).unwrap();
        let log = FeedbackLog::new();
        let status = dispatcher
            .execute("demo say  hello   there ", &PermissionSet::new(), &log)
            .unwrap();
        assert_eq!(status, CommandStatus::Success);
        assert_eq!(log.messages()[0].1, "hello   there");
    }

    #[test]
    fn reports_dispatch_failures() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(echo_tree()).unwrap();
        let log = FeedbackLog::new();
        let player = PermissionSet::new();
        let allowed = PermissionSet::new().grant("demo.count");

        assert!(matches!(
            dispatcher.execute("nope", &player, &log),
            Err(DispatchError::UnknownCommand { .. })
        ));
        assert!(matches!(
            dispatcher.execute("demo", &player, &log),
            Err(DispatchError::Incomplete { .. })
        ));
        assert!(matches!(
            dispatcher.execute("demo count 3", &player, &log),
            Err(DispatchError::PermissionDenied { .. })
        ));
        assert!(matches!(
            dispatcher.execute("demo count three", &allowed, &log),
            Err(DispatchError::InvalidArgument { .. })
        ));
        assert!(matches!(
            dispatcher.execute("demo count 3 4", &allowed, &log),
            Err(DispatchError::InvalidArgument { .. })
        ));
        assert_eq!(
            dispatcher.execute("demo count 3", &allowed, &log),
            Ok(CommandStatus::Success)
        );
        assert!(dispatcher.register(CommandNode::literal("demo")).is_err());
    }

    #[test]
    fn usage_hides_forbidden_commands() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(echo_tree()).unwrap();
        assert_eq!(dispatcher.usage(&PermissionSet::new()), ["demo say <value:text>"]);
        assert_eq!(
            dispatcher.usage(&PermissionSet::operator()),
            ["demo say <value:text>", "demo count <value:integer>"]
        );
    }
}
