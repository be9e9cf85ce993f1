//! Text canonicalization for card identity.
//!
//! Identifiers must survive re-imports and cosmetic edits of the deck file, so
//! identity is computed from a normalized form of the text rather than the raw
//! field. The full path applies NFKC, lowercasing, quote/bracket removal and
//! punctuation/symbol stripping; a reduced path (lowercase + quote/bracket
//! removal + whitespace collapse) stands in when the Unicode property classes
//! are unavailable. Callers never see the difference.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Straight and curly quotes plus parentheses and square brackets. These are
/// deleted outright rather than replaced with a space, so "(hello)" and
/// "hello" normalize identically.
const QUOTES_AND_BRACKETS: &[char] = &[
    '\'', '"', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '(', ')', '[', ']',
];

static RE_PUNCT_OR_SYMBOL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[\p{P}\p{S}]+").ok());

/// Canonicalize a text field for identity purposes. Pure and idempotent;
/// returns an empty string for empty input.
pub fn normalize(text: &str) -> String {
    match RE_PUNCT_OR_SYMBOL.as_ref() {
        Some(re) => normalize_full(text, re),
        None => normalize_reduced(text),
    }
}

fn normalize_full(text: &str, punct_or_symbol: &Regex) -> String {
    let lowered = text.to_lowercase();
    let composed: String = lowered.nfkc().collect();
    let stripped: String = composed
        .chars()
        .filter(|ch| !QUOTES_AND_BRACKETS.contains(ch))
        .collect();
    let spaced = punct_or_symbol.replace_all(&stripped, " ");
    collapse_whitespace(&spaced)
}

/// Fallback normalizer: lowercase, quote/bracket removal and whitespace
/// collapse only. No NFKC, no general punctuation stripping.
pub(crate) fn normalize_reduced(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|ch| !QUOTES_AND_BRACKETS.contains(ch))
        .collect();
    collapse_whitespace(&stripped)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Hello World  "), "hello world");
    }

    #[test]
    fn empty_input_is_well_defined() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize_reduced(""), "");
    }

    #[test]
    fn quotes_and_brackets_are_deleted_without_a_gap() {
        assert_eq!(normalize("(안녕)"), "안녕");
        assert_eq!(normalize("don't"), "dont");
        assert_eq!(normalize("\u{201C}hello\u{201D} [there]"), "hello there");
    }

    #[test]
    fn punctuation_runs_become_a_single_space() {
        assert_eq!(normalize("to go... quickly!"), "to go quickly");
        assert_eq!(normalize("one, two; three"), "one two three");
    }

    #[test]
    fn symbols_are_stripped_like_punctuation() {
        assert_eq!(normalize("cost = $5 + tax"), "cost 5 tax");
    }

    #[test]
    fn nfkc_folds_compatibility_forms() {
        // Fullwidth Latin decomposes under NFKC.
        assert_eq!(normalize("Ｈｅｌｌｏ"), "hello");
    }

    #[test]
    fn hangul_decomposed_and_precomposed_agree() {
        // U+D55C vs U+1112 U+1161 U+11AB compose to the same syllable.
        assert_eq!(normalize("\u{D55C}"), normalize("\u{1112}\u{1161}\u{11AB}"));
    }

    #[test]
    fn idempotent_on_both_paths() {
        for sample in [
            "  (Hello), WORLD!  ",
            "안녕하세요...",
            "don't \u{201C}stop\u{201D}",
            "",
        ] {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once);

            let reduced = normalize_reduced(sample);
            assert_eq!(normalize_reduced(&reduced), reduced);
        }
    }

    #[test]
    fn reduced_path_skips_general_punctuation() {
        // The fallback still strips quotes/brackets but leaves other
        // punctuation in place.
        assert_eq!(normalize_reduced("(Hello), world!"), "hello, world!");
    }
}
