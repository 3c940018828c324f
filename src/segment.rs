//! Splitting reference and input text into words.

/// Delimiter set used when the caller doesn't supply one.
pub const DEFAULT_DELIMITERS: &str = " \n";

/// Split `text` on any maximal run of characters from `delimiters`.
///
/// Empty tokens are dropped, so leading, trailing and consecutive
/// delimiters collapse to nothing. Stateless; identical input always
/// yields identical output.
pub fn split_by_delimiters(text: &str, delimiters: &str) -> Vec<String> {
    text.split(|c: char| delimiters.contains(c))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode backslash escapes in a delimiter set passed on the command line,
/// so `--delimiters ' \n\t'` works from a shell that hands us the literal
/// two-character sequences.
pub fn unescape_delimiters(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_default_delimiters() {
        assert_eq!(
            split_by_delimiters("the quick\nfox", DEFAULT_DELIMITERS),
            vec!["the", "quick", "fox"]
        );
    }

    #[test]
    fn collapses_delimiter_runs() {
        assert_eq!(
            split_by_delimiters("  a  b \n\n c  ", DEFAULT_DELIMITERS),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn empty_text_yields_no_words() {
        assert!(split_by_delimiters("", DEFAULT_DELIMITERS).is_empty());
        assert!(split_by_delimiters(" \n \n", DEFAULT_DELIMITERS).is_empty());
    }

    #[test]
    fn custom_delimiter_set() {
        assert_eq!(
            split_by_delimiters("a-b_c-d", "-_"),
            vec!["a", "b", "c", "d"]
        );
        // space is not a delimiter here
        assert_eq!(split_by_delimiters("a b-c", "-"), vec!["a b", "c"]);
    }

    #[test]
    fn split_is_deterministic() {
        let text = "one two  three\nfour";
        let first = split_by_delimiters(text, DEFAULT_DELIMITERS);
        let second = split_by_delimiters(text, DEFAULT_DELIMITERS);
        assert_eq!(first, second);
    }

    #[test]
    fn unescapes_common_sequences() {
        assert_eq!(unescape_delimiters(" \\n\\t"), " \n\t");
        assert_eq!(unescape_delimiters("\\\\"), "\\");
    }

    #[test]
    fn unknown_escapes_pass_through() {
        assert_eq!(unescape_delimiters("\\x"), "\\x");
        assert_eq!(unescape_delimiters("abc\\"), "abc\\");
    }
}
