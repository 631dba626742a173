//! The immutable command tree produced by [`CommandBuilder::build`].
//!
//! [`CommandBuilder::build`]: super::CommandBuilder::build

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::definition::{ArgumentDef, OptionDef};
use crate::dispatch::{InvocationContext, Middleware};

/// Terminal handler of a command.
pub type Handler = Arc<dyn Fn(&InvocationContext<'_>) -> anyhow::Result<()> + Send + Sync>;

/// One command in the tree.
///
/// A node with children and no handler is a pure router. A node with both
/// routes full child-name matches to the child and binds everything else as
/// its own arguments.
pub struct CommandNode {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) description: String,
    pub(crate) arguments: Vec<ArgumentDef>,
    pub(crate) options: BTreeMap<String, OptionDef>,
    /// alias -> option name
    pub(crate) aliases: BTreeMap<String, String>,
    pub(crate) children: BTreeMap<String, CommandNode>,
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) handler: Option<Handler>,
}

impl CommandNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Space separated names from the root of the tree, e.g. `card list`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Positional arguments in declaration order.
    pub fn arguments(&self) -> &[ArgumentDef] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentDef> {
        self.arguments.iter().find(|arg| arg.name() == name)
    }

    /// Options sorted by name.
    pub fn options(&self) -> impl Iterator<Item = &OptionDef> {
        self.options.values()
    }

    pub fn option(&self, name: &str) -> Option<&OptionDef> {
        self.options.get(name)
    }

    pub fn option_by_alias(&self, alias: &str) -> Option<&OptionDef> {
        self.aliases.get(alias).and_then(|name| self.options.get(name))
    }

    /// Children sorted by name.
    pub fn children(&self) -> impl Iterator<Item = &CommandNode> {
        self.children.values()
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.get(name)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Follow a chain of child names from this node.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&CommandNode> {
        path.iter()
            .try_fold(self, |node, name| node.child(name.as_ref()))
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("path", &self.path)
            .field("arguments", &self.arguments)
            .field("options", &self.options)
            .field("children", &self.children)
            .field("middleware", &self.middleware.len())
            .field("handler", &self.handler.is_some())
            .finish()
    }
}
