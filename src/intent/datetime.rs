// src/intent/datetime.rs
//! "Che ore sono?" / "Che giorno è oggi?" detection.
//!
//! The core phrase must make up the whole utterance, optionally wrapped in a
//! polite prefix or suffix. "oggi" inside an unrelated sentence never matches.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeQuery {
    Time,
    Date,
}

const PREFIX: &str = r"(?:(?:scusa|scusi|senti|ascolta|per favore|per cortesia|mi sai dire|sai dirmi|mi dici|dimmi|puoi dirmi|mi puoi dire|potresti dirmi|sapresti dirmi|vorrei sapere)\s+)*";
const SUFFIX: &str = r"(?:\s+(?:per favore|per cortesia|adesso|ora|in questo momento|grazie|oggi|di oggi|esattamente|di preciso))*";

const TIME_CORE: &str = r"(?:che ore sono|che ora e|che ore e|che ora sono|che ore son|che ore abbiamo|l ora|l orario|l orario attuale|orario attuale|orario corrente|ora attuale|ora esatta|quanto e tardi)";
const DATE_CORE: &str = r"(?:che giorno e|che giorno siamo|che giorno abbiamo|quale giorno e|in che giorno siamo|oggi che giorno e|che data e|qual e la data|la data|la data di oggi|data di oggi|data odierna|quanti ne abbiamo)";

static TIME_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(&format!("^{PREFIX}{TIME_CORE}{SUFFIX}$")).ok());
static DATE_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(&format!("^{PREFIX}{DATE_CORE}{SUFFIX}$")).ok());

/// `normalized` must be normalized and spelling-corrected.
pub fn detect_datetime(normalized: &str) -> Option<DateTimeQuery> {
    let hit = |re: &Lazy<Option<Regex>>| re.as_ref().is_some_and(|r| r.is_match(normalized));
    if hit(&TIME_RE) {
        Some(DateTimeQuery::Time)
    } else if hit(&DATE_RE) {
        Some(DateTimeQuery::Date)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_questions() {
        for q in ["che ore sono", "scusi che ore sono adesso", "mi dici l ora per favore", "che ora e"] {
            assert_eq!(detect_datetime(q), Some(DateTimeQuery::Time), "{q}");
        }
    }

    #[test]
    fn date_questions() {
        for q in ["che giorno e oggi", "oggi che giorno e", "qual e la data di oggi", "mi dici la data"] {
            assert_eq!(detect_datetime(q), Some(DateTimeQuery::Date), "{q}");
        }
    }

    #[test]
    fn embedded_words_do_not_fire() {
        assert_eq!(detect_datetime("la farmacia e aperta oggi"), None);
        assert_eq!(detect_datetime("che ore sono disponibili per un appuntamento"), None);
        assert_eq!(detect_datetime("orari di apertura"), None);
    }
}
