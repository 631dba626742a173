//! Token classification and binding against a resolved node.

use std::collections::BTreeMap;

use crate::command::{CommandNode, OptionDef};
use crate::error::{DispatchError, SlotKind};
use crate::suggest::closest_match;
use crate::value::ParsedValue;

/// What one token is, relative to a node's option table.
pub(crate) enum Flag<'n, 't> {
    /// A declared option; `inline` carries the `=value` part if present.
    Option {
        def: &'n OptionDef,
        inline: Option<&'t str>,
    },
    /// Looks like a flag but matches no option or alias.
    Unknown,
    /// Anything else, including `-` and negative numbers.
    Positional,
}

/// Classify `token` as an option flag, an unknown flag or a positional.
pub(crate) fn classify<'n, 't>(node: &'n CommandNode, token: &'t str) -> Flag<'n, 't> {
    if let Some(body) = token.strip_prefix("--") {
        if body.is_empty() {
            return Flag::Positional;
        }
        let (name, inline) = split_inline(body);
        return match node.option(name) {
            Some(def) => Flag::Option { def, inline },
            None => Flag::Unknown,
        };
    }
    if let Some(body) = token.strip_prefix('-') {
        if body.is_empty() {
            return Flag::Positional;
        }
        let (alias, inline) = split_inline(body);
        if let Some(def) = node.option_by_alias(alias) {
            return Flag::Option { def, inline };
        }
        if token.parse::<f64>().is_ok() {
            return Flag::Positional;
        }
        return Flag::Unknown;
    }
    Flag::Positional
}

fn split_inline(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}

/// Parsed values bound from the remaining tokens.
#[derive(Debug, Default)]
pub(crate) struct Bound {
    pub(crate) arguments: BTreeMap<String, ParsedValue>,
    pub(crate) options: BTreeMap<String, ParsedValue>,
}

/// Bind `tokens` to `node`'s arguments and options, filling in defaults.
pub(crate) fn bind<S: AsRef<str>>(node: &CommandNode, tokens: &[S]) -> Result<Bound, DispatchError> {
    let mut bound = Bound::default();
    let mut positionals: Vec<&str> = Vec::new();
    let mut options_done = false;
    let mut iter = tokens.iter().map(|token| token.as_ref());

    while let Some(token) = iter.next() {
        if options_done {
            positionals.push(token);
            continue;
        }
        if token == "--" {
            options_done = true;
            continue;
        }
        match classify(node, token) {
            Flag::Option { def, inline } => {
                let raw = match inline {
                    Some(value) => value,
                    None => iter.next().ok_or_else(|| DispatchError::MissingOptionValue {
                        command: node.path().to_string(),
                        option: def.name().to_string(),
                    })?,
                };
                let value = parse_value(node, SlotKind::Option, def.name(), || def.parse(raw))?;
                if bound.options.insert(def.name().to_string(), value).is_some() {
                    tracing::debug!(command = %node.path(), option = def.name(), "option repeated, last value wins");
                }
            }
            Flag::Unknown => {
                return Err(DispatchError::UnrecognizedOption {
                    command: node.path().to_string(),
                    flag: token.to_string(),
                    suggestion: suggest_flag(node, token),
                });
            }
            Flag::Positional => positionals.push(token),
        }
    }

    let declared = node.arguments();
    if let Some(extra) = positionals.get(declared.len()) {
        return Err(DispatchError::TooManyArguments {
            command: node.path().to_string(),
            expected: declared.len(),
            token: extra.to_string(),
        });
    }
    for (def, raw) in declared.iter().zip(positionals.iter()) {
        let value = parse_value(node, SlotKind::Argument, def.name(), || def.parse(raw))?;
        bound.arguments.insert(def.name().to_string(), value);
    }

    for def in declared.iter().skip(positionals.len()) {
        if let Some(raw) = def.default_value() {
            let value = parse_value(node, SlotKind::Argument, def.name(), || def.spec.parse(raw, true))?;
            bound.arguments.insert(def.name().to_string(), value);
        }
    }
    for def in node.options() {
        if bound.options.contains_key(def.name()) {
            continue;
        }
        if let Some(raw) = def.default_value() {
            let value = parse_value(node, SlotKind::Option, def.name(), || def.spec.parse(raw, true))?;
            bound.options.insert(def.name().to_string(), value);
        }
    }

    Ok(bound)
}

fn parse_value(
    node: &CommandNode,
    slot: SlotKind,
    name: &str,
    parse: impl FnOnce() -> Result<ParsedValue, crate::error::ParseError>,
) -> Result<ParsedValue, DispatchError> {
    parse().map_err(|source| DispatchError::InvalidValue {
        command: node.path().to_string(),
        slot,
        name: name.to_string(),
        source,
    })
}

fn suggest_flag(node: &CommandNode, token: &str) -> Option<String> {
    let flags: Vec<String> = node
        .options()
        .flat_map(|opt| {
            std::iter::once(format!("--{}", opt.name()))
                .chain(opt.aliases().iter().map(|alias| format!("-{alias}")))
        })
        .collect();
    let flag = token.split_once('=').map_or(token, |(flag, _)| flag);
    closest_match(flag, flags.iter().map(String::as_str))
}
