//! Command-line splitting with POSIX shell-word rules.

use crate::error::TokenizeError;

/// Split a full command line into tokens.
///
/// ```
/// let tokens = stoker::tokenize(r#"item add "Iron Sword""#).unwrap();
/// assert_eq!(tokens, ["item", "add", "Iron Sword"]);
/// ```
///
/// # Errors
///
/// [`TokenizeError`] when quotes are unbalanced or the line ends in a lone
/// backslash.
pub fn tokenize(line: &str) -> Result<Vec<String>, TokenizeError> {
    shlex::split(line).ok_or_else(|| TokenizeError {
        line: line.to_string(),
    })
}

/// Split a line that is still being typed, for completion.
///
/// An unterminated quote in the last word is closed implicitly. A trailing
/// unescaped space starts a new, empty fragment, so the result always ends in
/// the fragment being completed.
pub fn tokenize_partial(line: &str) -> Vec<String> {
    if let Some(mut tokens) = shlex::split(line) {
        if tokens.is_empty() || ends_between_words(line, tokens.len()) {
            tokens.push(String::new());
        }
        return tokens;
    }
    for closing in ["\"", "'"] {
        if let Some(tokens) = shlex::split(&format!("{line}{closing}")) {
            return tokens;
        }
    }
    tracing::trace!(line, "partial line does not split");
    vec![String::new()]
}

/// Whether typing one more character after `line` would start a new word.
fn ends_between_words(line: &str, words: usize) -> bool {
    line.ends_with(char::is_whitespace)
        && shlex::split(&format!("{line}x")).is_some_and(|tokens| tokens.len() > words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_words_stay_together() {
        assert_eq!(
            tokenize("item  add 'Iron Sword'  ").unwrap(),
            vec!["item", "add", "Iron Sword"]
        );
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn unbalanced_quote_is_an_error() {
        let err = tokenize("item add \"Iron").unwrap_err();
        assert_eq!(err.line, "item add \"Iron");
    }

    #[test]
    fn partial_line_ends_in_fragment() {
        assert_eq!(tokenize_partial("item ad"), vec!["item", "ad"]);
        assert_eq!(tokenize_partial("item "), vec!["item", ""]);
        assert_eq!(tokenize_partial(""), vec![""]);
    }

    #[test]
    fn partial_line_closes_open_quote() {
        assert_eq!(tokenize_partial("item add \"Iron Sw"), vec!["item", "add", "Iron Sw"]);
        assert_eq!(tokenize_partial("item add 'Iron "), vec!["item", "add", "Iron "]);
    }

    #[test]
    fn escaped_trailing_space_stays_in_fragment() {
        assert_eq!(tokenize_partial("item add Iron\\ "), vec!["item", "add", "Iron "]);
        assert_eq!(tokenize_partial("item add Iron\\  "), vec!["item", "add", "Iron ", ""]);
    }
}
