// src/intent/language.rs
//! Italian vs. other. The service answers only in Italian, so the detector
//! defaults to Italian and needs clear contrary evidence to say otherwise.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::text::{normalize, tokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Italian,
    Other,
}

const ITALIAN_SIGNALS: &[&str] = &[
    "ciao", "salve", "buongiorno", "buonasera", "grazie", "prego", "come", "puoi", "aiutarmi",
    "vorrei", "posso", "avete", "siete", "sono", "quanto", "quanti", "dove", "chi", "cosa",
    "quale", "perche", "quando", "orari", "prenotare", "appuntamento", "udito", "apparecchio",
    "farmacia", "azienda", "otofarma", "otobot", "oggi", "giorno", "informazioni",
];

const ENGLISH_STARTERS: &[&str] = &[
    "what", "who", "how", "when", "where", "why", "which", "can you", "could you", "would you",
    "do you", "are you", "is there", "please", "help", "tell me", "i need", "i want", "i would",
];

const ENGLISH_STOPWORDS: &[&str] = &[
    "the", "is", "are", "you", "your", "what", "how", "and", "of", "to", "for", "with", "does",
    "can", "my", "it", "this", "that", "have", "has", "where", "when", "please", "there", "which",
    "who", "why", "would", "could", "should", "will", "be", "an", "at", "on", "from", "about",
    "need", "want", "hours", "open", "we", "they", "our",
];

static ITALIAN_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| ITALIAN_SIGNALS.iter().copied().collect());
static ENGLISH_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| ENGLISH_STOPWORDS.iter().copied().collect());

const ENGLISH_RATIO: f32 = 0.35;

fn is_cyrillic_or_greek(c: char) -> bool {
    matches!(c, '\u{0370}'..='\u{03FF}' | '\u{1F00}'..='\u{1FFF}' | '\u{0400}'..='\u{052F}')
}

/// Classify raw user text.
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(is_cyrillic_or_greek) {
        return Language::Other;
    }
    let norm = normalize(text);
    let toks: Vec<&str> = tokens(&norm).collect();
    if toks.is_empty() {
        return Language::Italian;
    }
    if toks.iter().any(|t| ITALIAN_SET.contains(t)) {
        return Language::Italian;
    }

    let padded = format!("{norm} ");
    if ENGLISH_STARTERS
        .iter()
        .any(|s| padded.starts_with(&format!("{s} ")))
    {
        return Language::Other;
    }

    let english = toks.iter().filter(|t| ENGLISH_SET.contains(*t)).count();
    if toks.len() >= 3 && english as f32 / toks.len() as f32 >= ENGLISH_RATIO {
        return Language::Other;
    }
    Language::Italian
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_questions_are_rejected() {
        assert_eq!(detect_language("What are your hours?"), Language::Other);
        assert_eq!(detect_language("Can you help me"), Language::Other);
        assert_eq!(detect_language("I think the shop is open on monday"), Language::Other);
    }

    #[test]
    fn non_latin_scripts_are_other() {
        assert_eq!(detect_language("Привет, как дела?"), Language::Other);
        assert_eq!(detect_language("Καλημέρα"), Language::Other);
    }

    #[test]
    fn italian_and_ambiguous_default_to_italian() {
        assert_eq!(detect_language("Quanto costa un apparecchio?"), Language::Italian);
        assert_eq!(detect_language("Help, come posso prenotare?"), Language::Italian);
        assert_eq!(detect_language("telemedicina"), Language::Italian);
        assert_eq!(detect_language(""), Language::Italian);
    }
}
