// src/intent/greeting.rs
//! Small talk. Patterns are anchored on the whole normalized utterance, so a
//! greeting inside a longer question ("ciao, quanto costa…") does not match.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    Hello,
    HowAreYou,
    Thanks,
    Goodbye,
}

static RULES: Lazy<Vec<(Greeting, Regex)>> = Lazy::new(|| {
    [
        (
            Greeting::HowAreYou,
            r"^(?:(?:ciao|salve|ehi|hey) )?(?:come stai|come va|come state|come ti senti|tutto bene|tutto ok)(?: oggi)?$",
        ),
        (
            Greeting::Thanks,
            r"^(?:grazie(?: mille| tante| infinite| di tutto| davvero| ancora)?|ti ringrazio|vi ringrazio|molto gentile|gentilissim[oa])(?: ciao)?$",
        ),
        (
            Greeting::Goodbye,
            r"^(?:arrivederci|a presto|ciao ciao|buona giornata|buona serata|buonanotte|addio|alla prossima)$",
        ),
        (
            Greeting::Hello,
            r"^(?:ciao|salve|buongiorno|buonasera|buon pomeriggio|hey|ehi|hello|hi)(?: (?:a tutti|a te|a voi|di nuovo))?$",
        ),
    ]
    .into_iter()
    .filter_map(|(kind, pat)| Regex::new(pat).ok().map(|re| (kind, re)))
    .collect()
});

/// `normalized` must already be normalized (lowercase, no punctuation).
pub fn detect_greeting(normalized: &str) -> Option<Greeting> {
    RULES
        .iter()
        .find(|(_, re)| re.is_match(normalized))
        .map(|(kind, _)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_each_kind() {
        assert_eq!(detect_greeting("ciao"), Some(Greeting::Hello));
        assert_eq!(detect_greeting("buongiorno a tutti"), Some(Greeting::Hello));
        assert_eq!(detect_greeting("ciao come stai"), Some(Greeting::HowAreYou));
        assert_eq!(detect_greeting("grazie mille"), Some(Greeting::Thanks));
        assert_eq!(detect_greeting("ciao ciao"), Some(Greeting::Goodbye));
    }

    #[test]
    fn greetings_inside_questions_are_ignored() {
        assert_eq!(detect_greeting("ciao quanto costa un apparecchio"), None);
        assert_eq!(detect_greeting("grazie per le informazioni sugli orari"), None);
        assert_eq!(detect_greeting(""), None);
    }
}
