//! Error taxonomy for building and dispatching command trees.
//!
//! Three families live here:
//!
//! - [`ConstructionError`] - raised by `build()`/`register()`, fatal to startup
//! - [`ParseError`] - a raw token rejected by a value parser
//! - [`DispatchError`] - everything that can go wrong for one invocation
//!
//! Dispatch-time errors are always returned, never turned into a process exit;
//! the hosting shell prints them and keeps the session alive.

use thiserror::Error;

/// Which kind of definition a token was bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Argument,
    Option,
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotKind::Argument => f.write_str("argument"),
            SlotKind::Option => f.write_str("option"),
        }
    }
}

/// A command tree that cannot be built.
///
/// `node` is the space-separated path of the offending command (for example
/// `card list`), so nested mistakes can be located without a debugger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("command '{node}': {what} name must not be empty")]
    EmptyName { node: String, what: &'static str },

    #[error("command '{node}': duplicate argument '{name}'")]
    DuplicateArgument { node: String, name: String },

    #[error("command '{node}': duplicate option '--{name}'")]
    DuplicateOption { node: String, name: String },

    #[error("command '{node}': alias '-{alias}' of option '--{option}' is already taken")]
    DuplicateAlias {
        node: String,
        option: String,
        alias: String,
    },

    #[error("command '{node}': duplicate subcommand '{name}'")]
    DuplicateCommand { node: String, name: String },

    #[error("command '{node}': {slot} '{name}' has no parser for type {type_tag}")]
    MissingParser {
        node: String,
        slot: SlotKind,
        name: String,
        type_tag: String,
    },

    #[error("command '{node}': default value of {slot} '{name}' is invalid: {source}")]
    InvalidDefault {
        node: String,
        slot: SlotKind,
        name: String,
        #[source]
        source: ParseError,
    },
}

/// A raw token that does not convert to the declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{token}' is not a valid {expected}{}", reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
pub struct ParseError {
    pub token: String,
    pub expected: String,
    pub reason: Option<String>,
}

impl ParseError {
    pub fn new(token: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expected: expected.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Why one invocation failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid value for {slot} '{name}' of '{command}': {source}")]
    InvalidValue {
        command: String,
        slot: SlotKind,
        name: String,
        #[source]
        source: ParseError,
    },

    #[error("unrecognized option '{flag}' for '{command}'{}", hint(suggestion))]
    UnrecognizedOption {
        command: String,
        flag: String,
        suggestion: Option<String>,
    },

    #[error("too many arguments for '{command}': expected at most {expected}, got unexpected '{token}'")]
    TooManyArguments {
        command: String,
        expected: usize,
        token: String,
    },

    #[error("{}{}", no_such_command(path, token), hint(suggestion))]
    NoSuchCommand {
        path: String,
        token: Option<String>,
        suggestion: Option<String>,
    },

    #[error("option '--{option}' of '{command}' expects a value")]
    MissingOptionValue { command: String, option: String },

    #[error("missing required {slot} '{name}' for '{command}'")]
    MissingRequiredValue {
        command: String,
        slot: SlotKind,
        name: String,
    },

    #[error("{slot} '{name}' of '{command}' does not hold a {expected}")]
    WrongValueType {
        command: String,
        slot: SlotKind,
        name: String,
        expected: &'static str,
    },

    #[error("command '{command}' failed: {error:#}")]
    Handler {
        command: String,
        error: anyhow::Error,
    },

    #[error("command '{command}' panicked: {message}")]
    HandlerPanicked { command: String, message: String },

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

impl DispatchError {
    /// The same error with any "did you mean" hint dropped.
    pub fn without_suggestion(mut self) -> Self {
        match &mut self {
            DispatchError::UnrecognizedOption { suggestion, .. }
            | DispatchError::NoSuchCommand { suggestion, .. } => *suggestion = None,
            _ => {}
        }
        self
    }
}

/// A command line that cannot be split into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot split command line: unbalanced quotes in '{line}'")]
pub struct TokenizeError {
    pub line: String,
}

fn hint(suggestion: &Option<String>) -> String {
    suggestion
        .as_deref()
        .map(|s| format!(". Did you mean '{s}'?"))
        .unwrap_or_default()
}

fn no_such_command(path: &str, token: &Option<String>) -> String {
    match (path.is_empty(), token) {
        (true, Some(token)) => format!("no such command '{token}'"),
        (true, None) => "no command given".to_string(),
        (false, Some(token)) => format!("no such command '{token}' under '{path}'"),
        (false, None) => format!("'{path}' needs a subcommand"),
    }
}
