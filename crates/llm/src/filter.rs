//! Texts that are returned as-is without asking the provider.

use regex::Regex;
use std::sync::LazyLock;

/// Digits, whitespace, punctuation and symbols only.
static SYMBOLS_ONLY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\p{P}\p{S}]+$").unwrap());

/// Whether `text` has to go to the provider.
///
/// Blank text, page numbers, bullets and stray single letters come back
/// unchanged. A single CJK ideograph is still a word and is translated.
pub fn needs_translation(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || SYMBOLS_ONLY_REGEX.is_match(text) {
        return false;
    }

    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => is_cjk_ideograph(c),
        _ => true,
    }
}

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}
