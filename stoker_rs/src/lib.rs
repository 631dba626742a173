//! # stoker
//!
//! **Command trees for interactive consoles.** Describe commands once with a
//! fluent builder, then dispatch command lines against them and offer
//! tab-completions from the same description.
//!
//! ## Features
//!
//! - **Fluent builder** - nested subcommands, typed arguments and options,
//!   aliases, defaults, custom parsers
//! - **Validated at build time** - duplicate names, alias collisions and bad
//!   defaults fail `build()`, never a later dispatch
//! - **Middleware** - wrap handlers; built-in `--help`/`-h` pages
//! - **Live suggestions** - completion sources are queried on every request
//!   and may report that their backing state is not loaded yet
//! - **Shell** - line tokenizer, top-level registry and a read-eval loop
//!
//! ## Quick Start
//!
//! ```rust
//! use stoker::{BufferSink, CommandBuilder, CommandRegistry, StaticSuggestions};
//!
//! let spell = CommandBuilder::new("spell")
//!     .with_sub_command("cast")
//!         .with_name_argument()
//!             .with_suggestions(StaticSuggestions::new(["Fireball", "IceBolt"]))
//!             .parent()
//!         .set_handler(|ctx| {
//!             ctx.log(format!("casting {}", ctx.required_argument::<String>("name")?));
//!             Ok(())
//!         })
//!         .parent()
//!     .use_help_middleware()
//!     .build()
//!     .expect("valid tree");
//!
//! let registry = CommandRegistry::with_commands([spell]).expect("unique names");
//! let sink = BufferSink::new();
//! registry.dispatch_line("spell cast Fireball", &sink).unwrap();
//! assert_eq!(sink.lines(), vec!["casting Fireball"]);
//! assert_eq!(registry.suggest_line("spell cast "), vec!["Fireball", "IceBolt"]);
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// Builder, frozen command nodes and help rendering.
pub mod command;
/// Resolver, dispatcher, invocation context and middleware.
pub mod dispatch;
pub mod error;
/// Host-facing interfaces: log sinks and identifier registries.
pub mod host;
/// Completion of partial command lines.
pub mod suggest;
/// Parsed values and built-in parsers.
pub mod value;

// ============================================================================
// Shell
// ============================================================================

pub mod config;
pub mod registry;
/// Demo `item` commands over an in-memory catalog.
pub mod sample;
pub mod shell;
pub mod tokenize;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{
    ArgumentDef, CommandBuilder, CommandNode, OptionDef, SourceUnavailable, StaticSuggestions,
    SuggestionSource, render_help,
};
pub use config::ShellConfig;
pub use dispatch::{HelpMiddleware, InvocationContext, Middleware, Next, dispatch, resolve};
pub use error::{ConstructionError, DispatchError, ParseError, SlotKind, TokenizeError};
pub use host::{BufferSink, IdentifierKind, IdentifierRegistry, LogSink, StdoutSink, TracingSink};
pub use registry::CommandRegistry;
pub use shell::{LineOutcome, Shell};
pub use suggest::suggest;
pub use tokenize::{tokenize, tokenize_partial};
pub use value::{ParsedValue, one_of, parse_bool, parse_float, parse_int, parse_string};
