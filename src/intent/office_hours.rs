// src/intent/office_hours.rs
//! Opening-hours questions: a direct pattern, or at least two hours-related keywords.
//! Never fires on an utterance the greeting or activation detectors already own.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{activation::is_activation, greeting::detect_greeting};
use crate::text::tokens;

static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\borari\b",
        r"\borario (?:di )?(?:apertura|chiusura|ufficio|del negozio|della sede)\b",
        r"\bquando (?:siete|sono|e) apert[oie]\b",
        r"\bsiete apert[ie]\b",
        r"\ba che ora (?:aprite|chiudete|apre|chiude|aprono|chiudono)\b",
        r"\bgiorni di apertura\b",
        r"\bfino a che ora\b",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

const HOURS_KEYWORDS: &[&str] = &[
    "orario", "orari", "apertura", "aperti", "aperto", "aperta", "chiusura", "chiusi", "chiuso",
    "apre", "aprite", "aprono", "chiude", "chiudete", "chiudono", "ufficio", "uffici", "lunedi",
    "sabato", "domenica", "weekend", "festivi", "festivo",
];

pub fn is_office_hours_query(normalized: &str) -> bool {
    if normalized.is_empty() || detect_greeting(normalized).is_some() || is_activation(normalized) {
        return false;
    }
    if PATTERNS.iter().any(|re| re.is_match(normalized)) {
        return true;
    }
    tokens(normalized)
        .filter(|t| HOURS_KEYWORDS.contains(t))
        .count()
        >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_patterns_and_keyword_pairs() {
        assert!(is_office_hours_query("quali sono gli orari"));
        assert!(is_office_hours_query("a che ora chiudete"));
        assert!(is_office_hours_query("siete aperti il sabato"));
        assert!(is_office_hours_query("ufficio chiuso domenica"));
    }

    #[test]
    fn single_keyword_or_greeting_is_not_enough() {
        assert!(!is_office_hours_query("la farmacia e chiusa"));
        assert!(!is_office_hours_query("che ore sono"));
        assert!(!is_office_hours_query("ciao"));
        assert!(!is_office_hours_query("otobot"));
    }
}
