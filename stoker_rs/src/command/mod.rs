//! Command definitions: the builder, the frozen node tree and help text.
//!
//! - `builder`: fluent `CommandBuilder` and its argument/option sub-builders
//! - `definition`: `ArgumentDef`, `OptionDef` and the `SuggestionSource` capability
//! - `node`: immutable `CommandNode`
//! - `help`: help page rendering used by the help middleware

mod builder;
mod definition;
mod help;
mod node;

pub use builder::{
    ArgumentBuilder, CommandBuilder, DefinitionBuilder, Named, OptionBuilder, Positional, Root,
};
pub use definition::{ArgumentDef, OptionDef, SourceUnavailable, StaticSuggestions, SuggestionSource};
pub use help::{render_help, usage};
pub use node::{CommandNode, Handler};
