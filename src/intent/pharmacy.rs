// src/intent/pharmacy.rs
//! Pharmacy-lookup questions, scored:
//! primary keyword ×3, location intent ×2, known place name ×2, contact intent ×1.
//! A score of at least 3 (or a direct voice-style phrasing) classifies the question.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{contains_phrase, normalize, tokens};

pub const PHARMACY_SCORE_THRESHOLD: u32 = 3;

const PRIMARY: &[&str] = &["farmacia", "farmacie", "farmacista", "parafarmacia", "punto otofarma"];
const LOCATION: &[&str] = &[
    "dove", "vicino", "vicina", "vicine", "zona", "trovare", "trovo", "trova", "cerco", "cercare",
    "indirizzo", "citta", "paese", "quartiere", "provincia",
];
const CONTACT: &[&str] = &["telefono", "numero", "email", "mail", "contatto", "contatti", "chiamare"];

static VOICE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:cerca|trova|trovami|mostrami|indicami) (?:una |la |le )?farmaci[ae]\b|(?:dove|dov e) (?:si trova|e|trovo|posso trovare) (?:una |la )?farmacia\b)",
    )
    .ok()
});

/// Scores utterances against the keyword lists and the known place names.
#[derive(Debug, Clone, Default)]
pub struct PharmacyQuestionDetector {
    places: Vec<String>,
}

impl PharmacyQuestionDetector {
    /// `places`: city/province names from the pharmacy dataset (any casing).
    pub fn new<I, S>(places: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut places: Vec<String> = places
            .into_iter()
            .map(|p| normalize(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        places.sort();
        places.dedup();
        Self { places }
    }

    pub fn score(&self, normalized: &str) -> u32 {
        let toks: Vec<&str> = tokens(normalized).collect();
        let any = |list: &[&str]| {
            list.iter().any(|k| {
                if k.contains(' ') {
                    contains_phrase(normalized, k)
                } else {
                    toks.contains(k)
                }
            })
        };
        let mut score = 0;
        if any(PRIMARY) {
            score += 3;
        }
        if any(LOCATION) {
            score += 2;
        }
        if self.places.iter().any(|p| contains_phrase(normalized, p)) {
            score += 2;
        }
        if any(CONTACT) {
            score += 1;
        }
        score
    }

    pub fn is_pharmacy_question(&self, normalized: &str) -> bool {
        VOICE.as_ref().is_some_and(|re| re.is_match(normalized))
            || self.score(normalized) >= PHARMACY_SCORE_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> PharmacyQuestionDetector {
        PharmacyQuestionDetector::new(["Napoli", "Torre del Greco", "Salerno"])
    }

    #[test]
    fn weights_add_up() {
        let d = detector();
        assert_eq!(d.score("farmacia"), 3);
        assert_eq!(d.score("dove a napoli"), 4);
        assert_eq!(d.score("numero farmacia torre del greco"), 6);
        assert_eq!(d.score("numero"), 1);
    }

    #[test]
    fn threshold_and_voice_pattern() {
        let d = detector();
        assert!(d.is_pharmacy_question("una farmacia a salerno"));
        assert!(d.is_pharmacy_question("dove si trova a napoli"));
        assert!(d.is_pharmacy_question("trovami una farmacia"));
        assert!(!d.is_pharmacy_question("qual e il vostro numero"));
    }
}
