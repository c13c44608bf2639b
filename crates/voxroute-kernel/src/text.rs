//! Utterance normalization.
//!
//! Both functions are total: any input, including the empty string, produces
//! a value.

/// Tokens of this many characters or fewer are dropped by [`tokenize`].
const MIN_TOKEN_CHARS: usize = 2;

/// Lower-case `text`, strip everything that is not a word character or
/// whitespace, collapse whitespace runs to a single space and trim.
///
/// ```rust
/// # use voxroute_kernel::text::normalize;
/// assert_eq!(normalize("  I have a  Craving!! "), "i have a craving");
/// assert_eq!(normalize("Don't   stop"), "dont stop");
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            pending_space = true;
        } else if is_word_char(ch) {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        }
    }

    out
}

/// Normalize `text` and split it into tokens longer than two characters.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_owned)
        .collect()
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_case() {
        assert_eq!(normalize("Weekly-Board, please!"), "weeklyboard please");
        assert_eq!(normalize("GLP_1 Hub?"), "glp_1 hub");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("\tfridge \n  rescue  "), "fridge rescue");
    }

    #[test]
    fn punctuation_between_spaces_leaves_single_space() {
        assert_eq!(normalize("go - back"), "go back");
    }

    #[test]
    fn empty_and_symbol_only_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!  ..."), "");
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "  Hello,   World ",
            "I'd like the DIABETIC hub!!",
            "émigré café — déjà vu",
            "a\u{00a0}b\tc\nd",
            "__init__ 42 x",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn tokenize_drops_short_tokens() {
        assert_eq!(tokenize("I want to go to my pantry"), vec!["want", "pantry"]);
        assert_eq!(tokenize("add an egg"), vec!["add", "egg"]);
    }
}
