//! Value parsers and the type-erased values they produce.
//!
//! A parser is a pure `&str -> T` conversion. Built-in parsers are picked from
//! the Rust type a definition is declared with (`with_argument::<i64>` gets the
//! integer parser, `with_argument::<String>` the passthrough one); anything else
//! needs an explicit `with_parser`.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::ParseError;

/// Type-erased parser stored on a definition.
pub(crate) type ErasedParser =
    Arc<dyn Fn(&str) -> Result<Arc<dyn Any + Send + Sync>, ParseError> + Send + Sync>;

/// One parsed argument or option value.
#[derive(Clone)]
pub struct ParsedValue {
    raw: String,
    from_default: bool,
    value: Arc<dyn Any + Send + Sync>,
}

impl ParsedValue {
    pub(crate) fn new(raw: &str, from_default: bool, value: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            raw: raw.to_string(),
            from_default,
            value,
        }
    }

    /// The token (or default text) this value was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether no token was supplied and the declared default was used.
    pub fn is_default(&self) -> bool {
        self.from_default
    }

    /// Borrow the value as `T`, or `None` when it was parsed into another type.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedValue")
            .field("raw", &self.raw)
            .field("from_default", &self.from_default)
            .finish()
    }
}

/// Values compare by the text they were parsed from; parsers are pure, so the
/// same text through the same definition always yields the same value.
impl PartialEq for ParsedValue {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.from_default == other.from_default
    }
}

// ============================================================================
// Built-in parsers
// ============================================================================

/// Parse any integer type, reporting the type tag `int` on failure.
pub fn parse_int<T>(raw: &str) -> Result<T, ParseError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ParseError::new(raw, "int").with_reason(e.to_string()))
}

/// Parse a floating point number.
pub fn parse_float(raw: &str) -> Result<f64, ParseError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| ParseError::new(raw, "float").with_reason(e.to_string()))
}

/// Passthrough parser: the token is the value.
pub fn parse_string(raw: &str) -> Result<String, ParseError> {
    Ok(raw.to_string())
}

/// Parse a boolean switch value.
pub fn parse_bool(raw: &str) -> Result<bool, ParseError> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ParseError::new(raw, "bool").with_reason("use true/false, yes/no, on/off or 1/0")),
    }
}

/// Build a case-insensitive choice parser that yields the canonical spelling.
///
/// ```
/// let rarity = stoker::value::one_of(&["Common", "Rare"]);
/// assert_eq!(rarity("rare").unwrap(), "Rare");
/// assert!(rarity("epic").is_err());
/// ```
pub fn one_of(
    choices: &[&str],
) -> impl Fn(&str) -> Result<String, ParseError> + Send + Sync + 'static {
    let choices: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
    move |raw: &str| {
        choices
            .iter()
            .find(|c| c.eq_ignore_ascii_case(raw))
            .cloned()
            .ok_or_else(|| {
                ParseError::new(raw, "choice").with_reason(format!("one of: {}", choices.join(", ")))
            })
    }
}

// ============================================================================
// Type-directed selection
// ============================================================================

pub(crate) fn erase<T, F>(parser: F) -> ErasedParser
where
    T: Any + Send + Sync,
    F: Fn(&str) -> Result<T, ParseError> + Send + Sync + 'static,
{
    Arc::new(move |raw: &str| parser(raw).map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>))
}

/// Semantic type tag shown in help and errors for a declared Rust type.
pub(crate) fn type_tag_for<T: Any>() -> String {
    let id = TypeId::of::<T>();
    if is_integer(id) {
        "int".to_string()
    } else if id == TypeId::of::<String>() {
        "string".to_string()
    } else if id == TypeId::of::<bool>() {
        "bool".to_string()
    } else if id == TypeId::of::<f64>() {
        "float".to_string()
    } else {
        let full = std::any::type_name::<T>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }
}

/// Built-in parser for `T`, if the framework ships one.
pub(crate) fn builtin_parser<T: Any>() -> Option<ErasedParser> {
    let id = TypeId::of::<T>();
    if let Some(parser) = integer_parser(id) {
        return Some(parser);
    }
    let parser = if id == TypeId::of::<String>() {
        erase(parse_string)
    } else if id == TypeId::of::<bool>() {
        erase(parse_bool)
    } else if id == TypeId::of::<f64>() {
        erase(parse_float)
    } else {
        return None;
    };
    Some(parser)
}

macro_rules! integer_types {
    ($($ty:ty),+ $(,)?) => {
        fn is_integer(id: TypeId) -> bool {
            [$(TypeId::of::<$ty>()),+].contains(&id)
        }

        fn integer_parser(id: TypeId) -> Option<ErasedParser> {
            $(
                if id == TypeId::of::<$ty>() {
                    return Some(erase(parse_int::<$ty>));
                }
            )+
            None
        }
    };
}

integer_types!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
