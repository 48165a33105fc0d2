// src/intent/activation.rs
//! Wake word and "who are you" detection, plus stripping a wake word that
//! prefixes or suffixes a real request.

use once_cell::sync::Lazy;
use regex::Regex;

static ACTIVATION: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^(?:(?:hey|ehi|hei|ciao|ok|okay|salve) )?(?:otobot|oto bot)$",
        r"^(?:come ti chiami|chi sei|chi sei tu|tu chi sei|qual e il tuo nome|presentati)(?: otobot)?$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static LEADING_WAKE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(?:(?:hey|ehi|hei|ciao|ok|okay|salve) )?(?:otobot|oto bot) ").ok());
static TRAILING_WAKE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r" (?:otobot|oto bot)$").ok());

pub fn is_activation(normalized: &str) -> bool {
    ACTIVATION.iter().any(|re| re.is_match(normalized))
}

/// "otobot che ore sono" → "che ore sono". Returns the input unchanged when
/// nothing would remain.
pub fn strip_wake_word(normalized: &str) -> String {
    let mut out = normalized.to_string();
    if let Some(re) = LEADING_WAKE.as_ref() {
        out = re.replace(&out, "").into_owned();
    }
    if let Some(re) = TRAILING_WAKE.as_ref() {
        out = re.replace(&out, "").into_owned();
    }
    let out = out.trim().to_string();
    if out.is_empty() {
        normalized.to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wake_word_alone_or_with_greeting() {
        assert!(is_activation("otobot"));
        assert!(is_activation("hey otobot"));
        assert!(is_activation("oto bot"));
        assert!(is_activation("chi sei"));
        assert!(!is_activation("otobot che ore sono"));
        assert!(!is_activation("robot"));
    }

    #[test]
    fn strips_leading_and_trailing_wake_word() {
        assert_eq!(strip_wake_word("otobot che ore sono"), "che ore sono");
        assert_eq!(strip_wake_word("ehi otobot dove siete"), "dove siete");
        assert_eq!(strip_wake_word("che giorno e oggi otobot"), "che giorno e oggi");
        assert_eq!(strip_wake_word("otobot"), "otobot");
        assert_eq!(strip_wake_word("ciao"), "ciao");
    }
}
