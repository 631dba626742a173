//! Argument and option definitions, and the suggestion capability they carry.

use std::fmt;
use std::sync::Arc;

use crate::error::ParseError;
use crate::value::{ErasedParser, ParsedValue};

/// Backing state of a suggestion source is not available right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnavailable {
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SourceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "suggestion source unavailable: {}", self.reason)
    }
}

/// Live completions for one argument or option.
///
/// Queried on every suggestion call, never cached. Implementations read
/// whatever external state they wrap at call time and report
/// [`SourceUnavailable`] when that state is not initialized yet.
pub trait SuggestionSource: Send + Sync {
    fn suggestions(&self) -> Result<Vec<String>, SourceUnavailable>;
}

impl<F> SuggestionSource for F
where
    F: Fn() -> Vec<String> + Send + Sync,
{
    fn suggestions(&self) -> Result<Vec<String>, SourceUnavailable> {
        Ok(self())
    }
}

/// A fixed list of completions.
#[derive(Debug, Clone, Default)]
pub struct StaticSuggestions(pub Vec<String>);

impl StaticSuggestions {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(items.into_iter().map(Into::into).collect())
    }
}

impl SuggestionSource for StaticSuggestions {
    fn suggestions(&self) -> Result<Vec<String>, SourceUnavailable> {
        Ok(self.0.clone())
    }
}

/// Fields shared by positional arguments and options.
#[derive(Clone)]
pub(crate) struct ValueSpec {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) type_tag: String,
    pub(crate) default_raw: Option<String>,
    pub(crate) suggestions: Option<Arc<dyn SuggestionSource>>,
    pub(crate) parser: Option<ErasedParser>,
}

impl ValueSpec {
    pub(crate) fn new(name: String, type_tag: String, parser: Option<ErasedParser>) -> Self {
        Self {
            name,
            description: String::new(),
            type_tag,
            default_raw: None,
            suggestions: None,
            parser,
        }
    }

    /// Run the parser. Errors always carry this definition's type tag.
    pub(crate) fn parse(&self, raw: &str, from_default: bool) -> Result<ParsedValue, ParseError> {
        let Some(parser) = self.parser.as_ref() else {
            return Err(ParseError::new(raw, &self.type_tag).with_reason("no parser registered"));
        };
        parser(raw)
            .map(|value| ParsedValue::new(raw, from_default, value))
            .map_err(|err| ParseError {
                token: raw.to_string(),
                expected: self.type_tag.clone(),
                reason: err.reason,
            })
    }
}

impl fmt::Debug for ValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSpec")
            .field("name", &self.name)
            .field("type_tag", &self.type_tag)
            .field("default_raw", &self.default_raw)
            .field("suggestions", &self.suggestions.is_some())
            .finish()
    }
}

/// A positional argument.
#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub(crate) spec: ValueSpec,
}

/// A named option bound by `--name` or `-alias`.
#[derive(Debug, Clone)]
pub struct OptionDef {
    pub(crate) spec: ValueSpec,
    pub(crate) aliases: Vec<String>,
}

macro_rules! value_spec_accessors {
    ($ty:ty) => {
        impl $ty {
            pub fn name(&self) -> &str {
                &self.spec.name
            }

            pub fn description(&self) -> &str {
                &self.spec.description
            }

            /// Semantic type shown in help and parse errors (`int`, `string`, ...).
            pub fn type_tag(&self) -> &str {
                &self.spec.type_tag
            }

            pub fn default_value(&self) -> Option<&str> {
                self.spec.default_raw.as_deref()
            }

            pub fn suggestion_source(&self) -> Option<&Arc<dyn SuggestionSource>> {
                self.spec.suggestions.as_ref()
            }

            /// Parse a raw token with this definition's parser.
            pub fn parse(&self, raw: &str) -> Result<ParsedValue, ParseError> {
                self.spec.parse(raw, false)
            }
        }
    };
}

value_spec_accessors!(ArgumentDef);
value_spec_accessors!(OptionDef);

impl OptionDef {
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}
