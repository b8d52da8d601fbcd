//! Text cleanup applied to every piece of prose taken from the article.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_CITATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());

/// Literal marker MediaWiki appends to headings for the edit link.
const EDIT_MARKER: &str = "[edit]";

/// Remove inline citation markers such as `[1]` or `[23]`.
///
/// Everything else, including whitespace and other bracketed text like
/// `[citation needed]`, is left untouched.
pub fn clean_text(input: &str) -> String {
    RE_CITATION.replace_all(input, "").into_owned()
}

/// Display text of a heading: edit marker removed, whitespace trimmed.
pub fn clean_heading(input: &str) -> String {
    input.replace(EDIT_MARKER, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_numeric_markers() {
        assert_eq!(
            clean_text("Cats purr.[1] They sleep a lot.[23][4]"),
            "Cats purr. They sleep a lot."
        );
    }

    #[test]
    fn keeps_non_numeric_brackets() {
        assert_eq!(
            clean_text("Fact[citation needed] and [a1] and []"),
            "Fact[citation needed] and [a1] and []"
        );
    }

    #[test]
    fn no_marker_survives() {
        let inputs = [
            "[1]",
            "[[1]]",
            "a[12]b[3]c",
            "[1][2][3] text [45678]",
            "nested [[99]] brackets",
        ];
        for input in inputs {
            let out = clean_text(input);
            assert!(!RE_CITATION.is_match(&out), "{input:?} → {out:?}");
        }
    }

    #[test]
    fn preserves_whitespace_and_unicode() {
        assert_eq!(clean_text("  Über\n café[7]  "), "  Über\n café  ");
    }

    #[test]
    fn heading_drops_edit_marker() {
        assert_eq!(clean_heading("  History[edit] \n"), "History");
        assert_eq!(clean_heading("Diet"), "Diet");
    }
}
