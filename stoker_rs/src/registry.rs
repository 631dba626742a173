//! Top-level command table.

use std::collections::BTreeMap;

use crate::command::CommandNode;
use crate::dispatch;
use crate::error::{ConstructionError, DispatchError};
use crate::host::LogSink;
use crate::suggest::{self, closest_match};
use crate::tokenize::{tokenize, tokenize_partial};

/// Built command trees keyed by their root name.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandNode>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a built tree.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::DuplicateCommand`] when the name is taken.
    pub fn register(&mut self, node: CommandNode) -> Result<(), ConstructionError> {
        if self.commands.contains_key(node.name()) {
            return Err(ConstructionError::DuplicateCommand {
                node: String::new(),
                name: node.name().to_string(),
            });
        }
        tracing::debug!(command = node.name(), "registered command");
        self.commands.insert(node.name().to_string(), node);
        Ok(())
    }

    /// Registry holding every tree in `nodes`.
    pub fn with_commands(
        nodes: impl IntoIterator<Item = CommandNode>,
    ) -> Result<Self, ConstructionError> {
        let mut registry = Self::new();
        for node in nodes {
            registry.register(node)?;
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&CommandNode> {
        self.commands.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandNode> {
        self.commands.values()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Dispatch `tokens`, the first of which names a registered command.
    pub fn dispatch<S: AsRef<str>>(
        &self,
        tokens: &[S],
        sink: &dyn LogSink,
    ) -> Result<(), DispatchError> {
        let Some((first, rest)) = tokens.split_first() else {
            return Err(DispatchError::NoSuchCommand {
                path: String::new(),
                token: None,
                suggestion: None,
            });
        };
        let name = first.as_ref();
        match self.commands.get(name) {
            Some(node) => dispatch::dispatch(node, rest, sink),
            None => Err(DispatchError::NoSuchCommand {
                path: String::new(),
                token: Some(name.to_string()),
                suggestion: closest_match(name, self.names()),
            }),
        }
    }

    /// Tokenize `line` and dispatch it.
    pub fn dispatch_line(&self, line: &str, sink: &dyn LogSink) -> Result<(), DispatchError> {
        let tokens = tokenize(line)?;
        self.dispatch(&tokens, sink)
    }

    /// Completions for the last token of `partial`.
    pub fn suggest<S: AsRef<str>>(&self, partial: &[S]) -> Vec<String> {
        match partial.split_first() {
            None => self.names().map(str::to_string).collect(),
            Some((_, [])) => self.names().map(str::to_string).collect(),
            Some((first, rest)) => self
                .commands
                .get(first.as_ref())
                .map(|node| suggest::suggest(node, rest))
                .unwrap_or_default(),
        }
    }

    pub fn suggest_line(&self, line: &str) -> Vec<String> {
        self.suggest(&tokenize_partial(line))
    }
}
