//! Fluent construction of command trees.
//!
//! Every sub-builder owns the builder it was opened from, so the builder chain
//! is a stack of frames encoded in the type: `parent()` pops one frame and
//! hands the owner back, and `build()` only exists on the outermost frame.
//!
//! ```
//! use stoker::{CommandBuilder, BufferSink};
//!
//! let card = CommandBuilder::new("card")
//!     .with_description("Manage cards")
//!     .with_sub_command("list")
//!         .with_option::<i64>("page")
//!             .with_default_value("1")
//!             .with_aliases(["p"])
//!             .parent()
//!         .set_handler(|ctx| {
//!             let page = ctx.required_option::<i64>("page")?;
//!             ctx.log(format!("page {page}"));
//!             Ok(())
//!         })
//!         .parent()
//!     .use_help_middleware()
//!     .build()
//!     .expect("valid tree");
//!
//! let sink = BufferSink::new();
//! stoker::dispatch(&card, &["list", "-p", "3"], &sink).unwrap();
//! assert_eq!(sink.lines(), vec!["page 3"]);
//! ```

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::definition::{ArgumentDef, OptionDef, SuggestionSource, ValueSpec};
use super::node::{CommandNode, Handler};
use crate::dispatch::{HelpMiddleware, InvocationContext, Middleware};
use crate::error::{ConstructionError, ParseError, SlotKind};
use crate::value::{ErasedParser, builtin_parser, erase, type_tag_for};

/// Marker for the outermost builder frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Root;

/// Marker for positional argument definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Positional;

/// Marker for option definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Named;

/// Builder for a positional argument owned by a `CommandBuilder<P>`.
pub type ArgumentBuilder<T, P> = DefinitionBuilder<T, P, Positional>;

/// Builder for an option owned by a `CommandBuilder<P>`.
pub type OptionBuilder<T, P> = DefinitionBuilder<T, P, Named>;

/// Accumulates one command node.
pub struct CommandBuilder<P = Root> {
    parent: P,
    draft: NodeDraft,
}

struct NodeDraft {
    name: String,
    description: String,
    arguments: Vec<ArgumentDef>,
    options: Vec<OptionDef>,
    children: Vec<NodeDraft>,
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Option<Handler>,
}

impl CommandBuilder<Root> {
    /// Start a new top-level command.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parent: Root,
            draft: NodeDraft::new(name.into()),
        }
    }

    /// Validate the whole tree and freeze it.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConstructionError`] found, depth first.
    pub fn build(self) -> Result<CommandNode, ConstructionError> {
        let node = self.draft.freeze(None)?;
        tracing::debug!(command = %node.path(), "command tree built");
        Ok(node)
    }
}

impl<P> CommandBuilder<CommandBuilder<P>> {
    /// Commit this subcommand into its parent and return the parent builder.
    pub fn parent(self) -> CommandBuilder<P> {
        let mut parent = self.parent;
        parent.draft.children.push(self.draft);
        parent
    }
}

impl<P> CommandBuilder<P> {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.draft.description = description.into();
        self
    }

    /// Declare the next positional argument, parsed as `T`.
    ///
    /// Integers, `String`, `bool` and `f64` get a built-in parser; other types
    /// need [`DefinitionBuilder::with_parser`].
    pub fn with_argument<T: Any + Send + Sync>(
        self,
        name: impl Into<String>,
    ) -> ArgumentBuilder<T, P> {
        DefinitionBuilder::open(self, name.into())
    }

    /// Shorthand for a positional string argument called `name`.
    pub fn with_name_argument(self) -> ArgumentBuilder<String, P> {
        self.with_argument::<String>("name")
    }

    /// Declare an option, parsed as `T`.
    pub fn with_option<T: Any + Send + Sync>(self, name: impl Into<String>) -> OptionBuilder<T, P> {
        DefinitionBuilder::open(self, name.into())
    }

    /// Open a nested builder for a child command.
    pub fn with_sub_command(self, name: impl Into<String>) -> CommandBuilder<CommandBuilder<P>> {
        CommandBuilder {
            draft: NodeDraft::new(name.into()),
            parent: self,
        }
    }

    /// Attach the terminal handler, replacing any previous one.
    pub fn set_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&InvocationContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.draft.handler = Some(Arc::new(handler));
        self
    }

    /// Append the built-in help middleware (`--help` / `-h`).
    pub fn use_help_middleware(self) -> Self {
        self.use_middleware(HelpMiddleware)
    }

    /// Append a middleware; middleware runs in the order it was added.
    pub fn use_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.draft.middleware.push(Arc::new(middleware));
        self
    }
}

impl<P> fmt::Debug for CommandBuilder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("name", &self.draft.name)
            .field("arguments", &self.draft.arguments.len())
            .field("options", &self.draft.options.len())
            .field("children", &self.draft.children.len())
            .finish()
    }
}

// ============================================================================
// Argument / option sub-builder
// ============================================================================

/// Accumulates one argument (`K = Positional`) or option (`K = Named`).
pub struct DefinitionBuilder<T, P, K> {
    owner: CommandBuilder<P>,
    spec: ValueSpec,
    aliases: Vec<String>,
    _marker: PhantomData<fn() -> (T, K)>,
}

impl<T: Any + Send + Sync, P, K> DefinitionBuilder<T, P, K> {
    fn open(owner: CommandBuilder<P>, name: String) -> Self {
        Self {
            owner,
            spec: ValueSpec::new(name, type_tag_for::<T>(), builtin_parser::<T>()),
            aliases: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = description.into();
        self
    }

    /// Raw text parsed whenever no token is supplied.
    pub fn with_default_value(mut self, raw: impl Into<String>) -> Self {
        self.spec.default_raw = Some(raw.into());
        self
    }

    /// Live completion source for this slot.
    pub fn with_suggestions(mut self, source: impl SuggestionSource + 'static) -> Self {
        self.spec.suggestions = Some(Arc::new(source));
        self
    }

    /// Override the type name shown in help and parse errors.
    pub fn with_type_tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.type_tag = tag.into();
        self
    }

    /// Replace the parser. The error's `Display` text becomes the parse
    /// failure reason; a [`ParseError`] keeps its own reason.
    pub fn with_parser<F, E>(mut self, parser: F) -> Self
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        E: fmt::Display + 'static,
    {
        self.spec.parser = Some(erase_custom(parser));
        self
    }
}

impl<T, P> DefinitionBuilder<T, P, Positional> {
    /// Commit the argument and return the owning command builder.
    pub fn parent(self) -> CommandBuilder<P> {
        let mut owner = self.owner;
        owner.draft.arguments.push(ArgumentDef { spec: self.spec });
        owner
    }
}

impl<T, P> DefinitionBuilder<T, P, Named> {
    /// Short forms accepted as `-alias`.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Commit the option and return the owning command builder.
    pub fn parent(self) -> CommandBuilder<P> {
        let mut owner = self.owner;
        owner.draft.options.push(OptionDef {
            spec: self.spec,
            aliases: self.aliases,
        });
        owner
    }
}

fn erase_custom<T, F, E>(parser: F) -> ErasedParser
where
    T: Any + Send + Sync,
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    E: fmt::Display + 'static,
{
    erase(move |raw: &str| {
        parser(raw).map_err(|err| {
            let reason = match (&err as &dyn Any).downcast_ref::<ParseError>() {
                Some(parse) => parse.reason.clone(),
                None => Some(err.to_string()),
            };
            ParseError {
                token: raw.to_string(),
                expected: String::new(),
                reason,
            }
        })
    })
}

// ============================================================================
// Validation
// ============================================================================

impl NodeDraft {
    fn new(name: String) -> Self {
        Self {
            name,
            description: String::new(),
            arguments: Vec::new(),
            options: Vec::new(),
            children: Vec::new(),
            middleware: Vec::new(),
            handler: None,
        }
    }

    fn freeze(self, parent_path: Option<&str>) -> Result<CommandNode, ConstructionError> {
        let path = match parent_path {
            Some(parent) => format!("{parent} {}", self.name),
            None => self.name.clone(),
        };
        if self.name.trim().is_empty() {
            return Err(ConstructionError::EmptyName {
                node: parent_path.unwrap_or_default().to_string(),
                what: "command",
            });
        }

        let mut seen = BTreeSet::new();
        for arg in &self.arguments {
            check_spec(&path, &arg.spec, SlotKind::Argument)?;
            if !seen.insert(arg.spec.name.as_str()) {
                return Err(ConstructionError::DuplicateArgument {
                    node: path,
                    name: arg.spec.name.clone(),
                });
            }
        }

        let mut options = BTreeMap::new();
        for opt in self.options {
            check_spec(&path, &opt.spec, SlotKind::Option)?;
            if options.contains_key(&opt.spec.name) {
                return Err(ConstructionError::DuplicateOption {
                    node: path,
                    name: opt.spec.name.clone(),
                });
            }
            options.insert(opt.spec.name.clone(), opt);
        }
        let aliases = collect_aliases(&path, &options)?;

        let mut children = BTreeMap::new();
        for child in self.children {
            if children.contains_key(&child.name) {
                return Err(ConstructionError::DuplicateCommand {
                    node: path,
                    name: child.name,
                });
            }
            let name = child.name.clone();
            children.insert(name, child.freeze(Some(&path))?);
        }

        Ok(CommandNode {
            name: self.name,
            path,
            description: self.description,
            arguments: self.arguments,
            options,
            aliases,
            children,
            middleware: self.middleware,
            handler: self.handler,
        })
    }
}

fn check_spec(node: &str, spec: &ValueSpec, slot: SlotKind) -> Result<(), ConstructionError> {
    if spec.name.trim().is_empty() {
        return Err(ConstructionError::EmptyName {
            node: node.to_string(),
            what: match slot {
                SlotKind::Argument => "argument",
                SlotKind::Option => "option",
            },
        });
    }
    if spec.parser.is_none() {
        return Err(ConstructionError::MissingParser {
            node: node.to_string(),
            slot,
            name: spec.name.clone(),
            type_tag: spec.type_tag.clone(),
        });
    }
    if let Some(raw) = spec.default_raw.as_deref() {
        spec.parse(raw, true)
            .map_err(|source| ConstructionError::InvalidDefault {
                node: node.to_string(),
                slot,
                name: spec.name.clone(),
                source,
            })?;
    }
    Ok(())
}

/// Map every alias to its option, rejecting aliases that collide with another
/// alias or with an option name.
fn collect_aliases(
    node: &str,
    options: &BTreeMap<String, OptionDef>,
) -> Result<BTreeMap<String, String>, ConstructionError> {
    let mut aliases = BTreeMap::new();
    for opt in options.values() {
        for alias in &opt.aliases {
            let taken_by_name = options.contains_key(alias) && alias != &opt.spec.name;
            if alias.trim().is_empty() || taken_by_name || aliases.contains_key(alias) {
                return Err(ConstructionError::DuplicateAlias {
                    node: node.to_string(),
                    option: opt.spec.name.clone(),
                    alias: alias.clone(),
                });
            }
            aliases.insert(alias.clone(), opt.spec.name.clone());
        }
    }
    Ok(aliases)
}
