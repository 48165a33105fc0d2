// src/text/normalize.rs
//! Canonical text key used by every comparison in the assistant.
//!
//! Steps: lowercase → NFD → drop combining marks ("è" → "e") → every
//! non-alphanumeric char becomes a space → collapse whitespace → trim.
//! Apostrophes are treated as separators, so "l'ora" becomes "l ora".

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize free text into the canonical comparison key. Total and pure.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    for ch in folded.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Whitespace tokens of an already normalized string.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> + '_ {
    normalized.split(' ').filter(|t| !t.is_empty())
}

/// Tokens sorted alphabetically and joined back with single spaces.
pub fn sorted_tokens(normalized: &str) -> String {
    let mut v: Vec<&str> = tokens(normalized).collect();
    v.sort_unstable();
    v.join(" ")
}

/// True if `needle` (normalized, may span several tokens) occurs in `haystack`
/// on token boundaries.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let padded_hay = format!(" {haystack} ");
    let padded_needle = format!(" {needle} ");
    padded_hay.contains(&padded_needle)
}
