//! Suggestion engine: completions for the next slot of a partial command line.
//!
//! Sources are queried live on every call. Nothing is cached and nothing is
//! filtered here; prefix filtering belongs to the caller (see `Shell`).

use strsim::levenshtein;

use crate::command::{CommandNode, SuggestionSource};
use crate::dispatch::{Flag, classify, resolve};

/// Largest edit distance still worth a "did you mean" hint.
const MAX_HINT_DISTANCE: usize = 2;

/// Closest candidate to `input` within [`MAX_HINT_DISTANCE`], compared
/// case-insensitively. Ties keep the first candidate seen.
pub(crate) fn closest_match<'a>(
    input: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let input_lower = input.to_lowercase();
    let mut best: Option<(&str, usize)> = None;

    for candidate in candidates {
        let distance = levenshtein(&input_lower, &candidate.to_lowercase());
        if distance > MAX_HINT_DISTANCE {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((candidate, distance)),
        }
    }

    best.map(|(candidate, _)| candidate.to_string())
}

/// Completions for the last token of `partial`, relative to `root`.
///
/// The last token is the fragment being typed; pass an empty string as the
/// last element to ask about a fresh slot. An empty `partial` is the same as
/// `[""]`.
pub fn suggest<S: AsRef<str>>(root: &CommandNode, partial: &[S]) -> Vec<String> {
    let (fragment, completed) = match partial.split_last() {
        Some((last, completed)) => (last.as_ref(), completed),
        None => ("", partial),
    };
    let (node, consumed) = resolve(root, completed);
    let rest = &completed[consumed..];

    let mut pending: Option<&dyn SuggestionSource> = None;
    let mut expects_value = false;
    let mut options_done = false;
    let mut position = 0;

    for token in rest.iter().map(|token| token.as_ref()) {
        if expects_value {
            expects_value = false;
            pending = None;
            continue;
        }
        if options_done {
            position += 1;
            continue;
        }
        if token == "--" {
            options_done = true;
            continue;
        }
        match classify(node, token) {
            Flag::Option { inline: Some(_), .. } => {}
            Flag::Option { def, inline: None } => {
                expects_value = true;
                pending = def.suggestion_source().map(|source| source.as_ref());
            }
            Flag::Unknown => {
                tracing::trace!(command = %node.path(), flag = token, "no completions after unknown flag");
                return Vec::new();
            }
            Flag::Positional => position += 1,
        }
    }

    if expects_value {
        return pending.map(|source| query(node, source)).unwrap_or_default();
    }
    if fragment.starts_with('-') && !options_done {
        return option_flags(node);
    }

    let mut suggestions = Vec::new();
    if position == 0 {
        suggestions.extend(node.children().map(|child| child.name().to_string()));
    }
    if let Some(source) = node
        .arguments()
        .get(position)
        .and_then(|arg| arg.suggestion_source())
    {
        suggestions.extend(query(node, source.as_ref()));
    }
    suggestions
}

fn query(node: &CommandNode, source: &dyn SuggestionSource) -> Vec<String> {
    match source.suggestions() {
        Ok(items) => {
            tracing::trace!(command = %node.path(), count = items.len(), "suggestions");
            items
        }
        Err(unavailable) => {
            tracing::trace!(command = %node.path(), "suggestion source unavailable: {unavailable}");
            Vec::new()
        }
    }
}

fn option_flags(node: &CommandNode) -> Vec<String> {
    node.options()
        .flat_map(|opt| {
            std::iter::once(format!("--{}", opt.name()))
                .chain(opt.aliases().iter().map(|alias| format!("-{alias}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::command::{CommandBuilder, SourceUnavailable, StaticSuggestions};

    struct Roster(Arc<Mutex<Option<Vec<String>>>>);

    impl SuggestionSource for Roster {
        fn suggestions(&self) -> Result<Vec<String>, SourceUnavailable> {
            self.0
                .lock()
                .map_err(|_| SourceUnavailable::new("roster lock poisoned"))?
                .clone()
                .ok_or_else(|| SourceUnavailable::new("roster not loaded"))
        }
    }

    fn spell_tree(roster: Arc<Mutex<Option<Vec<String>>>>) -> CommandNode {
        CommandBuilder::new("spell")
            .with_sub_command("cast")
            .with_name_argument()
            .with_suggestions(StaticSuggestions::new(["Fireball", "IceBolt"]))
            .parent()
            .with_option::<String>("target")
            .with_aliases(["t"])
            .with_suggestions(|| vec!["self".to_string(), "enemy".to_string()])
            .parent()
            .set_handler(|_| Ok(()))
            .parent()
            .with_sub_command("forget")
            .with_name_argument()
            .with_suggestions(Roster(roster))
            .parent()
            .set_handler(|_| Ok(()))
            .parent()
            .build()
            .unwrap()
    }

    fn tree() -> CommandNode {
        spell_tree(Arc::new(Mutex::new(None)))
    }

    #[test]
    fn closest_match_respects_distance() {
        let names = ["list", "add", "remove"];
        assert_eq!(closest_match("lsit", names).as_deref(), Some("list"));
        assert_eq!(closest_match("ADD", names).as_deref(), Some("add"));
        assert_eq!(closest_match("frobnicate", names), None);
    }

    #[test]
    fn provider_output_is_returned_verbatim() {
        let tree = tree();
        assert_eq!(suggest(&tree, &["cast", ""]), vec!["Fireball", "IceBolt"]);
        // The fragment does not filter.
        assert_eq!(suggest(&tree, &["cast", "Ice"]), vec!["Fireball", "IceBolt"]);
    }

    #[test]
    fn uninitialized_source_yields_nothing() {
        let roster = Arc::new(Mutex::new(None));
        let tree = spell_tree(Arc::clone(&roster));
        assert!(suggest(&tree, &["forget", ""]).is_empty());

        *roster.lock().unwrap() = Some(vec!["Fireball".to_string()]);
        assert_eq!(suggest(&tree, &["forget", ""]), vec!["Fireball"]);
    }

    #[test]
    fn child_names_offered_at_first_slot() {
        let tree = tree();
        assert_eq!(suggest::<&str>(&tree, &[]), vec!["cast", "forget"]);
        assert_eq!(suggest(&tree, &["ca"]), vec!["cast", "forget"]);
    }

    #[test]
    fn option_value_slot_uses_option_source() {
        let tree = tree();
        assert_eq!(suggest(&tree, &["cast", "--target", ""]), vec!["self", "enemy"]);
        assert_eq!(suggest(&tree, &["cast", "-t", "en"]), vec!["self", "enemy"]);
        // Value consumed; back to the argument slot.
        assert_eq!(
            suggest(&tree, &["cast", "-t", "enemy", ""]),
            vec!["Fireball", "IceBolt"]
        );
    }

    #[test]
    fn dash_fragment_completes_flags() {
        let tree = tree();
        assert_eq!(suggest(&tree, &["cast", "-"]), vec!["--target", "-t"]);
    }

    #[test]
    fn past_last_argument_or_unknown_flag_is_empty() {
        let tree = tree();
        assert!(suggest(&tree, &["cast", "Fireball", ""]).is_empty());
        assert!(suggest(&tree, &["cast", "--nope", ""]).is_empty());
    }
}
