// src/intent/corporate.rs
//! Company-knowledge questions mapped to a topic key. First matching rule wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorporateTopic {
    ItLead,
    Ceo,
    Founder,
    Founded,
    Headquarters,
}

impl CorporateTopic {
    pub fn key(&self) -> &'static str {
        match self {
            CorporateTopic::ItLead => "it_lead",
            CorporateTopic::Ceo => "ceo",
            CorporateTopic::Founder => "founder",
            CorporateTopic::Founded => "founded",
            CorporateTopic::Headquarters => "headquarters",
        }
    }

    pub const ALL: [CorporateTopic; 5] = [
        CorporateTopic::ItLead,
        CorporateTopic::Ceo,
        CorporateTopic::Founder,
        CorporateTopic::Founded,
        CorporateTopic::Headquarters,
    ];
}

static RULES: Lazy<Vec<(CorporateTopic, Regex)>> = Lazy::new(|| {
    [
        (
            CorporateTopic::ItLead,
            r"\b(?:responsabile|direttore|capo|head|manager) (?:it|informatic[oa]|dell informatica|dei sistemi|sistemi informativi|tecnico)\b|\bchi (?:gestisce|si occupa di|segue) (?:l )?informatica\b",
        ),
        (
            CorporateTopic::Ceo,
            r"\b(?:ceo|amministratore delegato|direttore generale|presidente)\b|\bchi (?:dirige|guida|comanda|e a capo di)\b",
        ),
        (
            CorporateTopic::Founder,
            r"\b(?:fondatore|fondatrice|fondatori|ideatore)\b|\bchi ha (?:fondato|creato|ideato)\b",
        ),
        (
            CorporateTopic::Founded,
            r"\b(?:anno di fondazione|quando e stata (?:fondata|creata)|quando e nata|in che anno e (?:stata fondata|nata)|da quanto tempo esiste|da quanti anni esiste)\b",
        ),
        (
            CorporateTopic::Headquarters,
            r"\b(?:sede (?:centrale|legale|principale|operativa)|quartier generale)\b|\bdove (?:si trova|ha sede|e) (?:otofarma|l azienda|la societa|la vostra azienda)\b",
        ),
    ]
    .into_iter()
    .filter_map(|(t, p)| Regex::new(p).ok().map(|re| (t, re)))
    .collect()
});

pub fn detect_corporate_topic(normalized: &str) -> Option<CorporateTopic> {
    RULES
        .iter()
        .find(|(_, re)| re.is_match(normalized))
        .map(|(t, _)| *t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_questions_to_topics() {
        assert_eq!(detect_corporate_topic("chi e il fondatore di otofarma"), Some(CorporateTopic::Founder));
        assert_eq!(detect_corporate_topic("chi e l amministratore delegato"), Some(CorporateTopic::Ceo));
        assert_eq!(detect_corporate_topic("dove si trova la sede centrale"), Some(CorporateTopic::Headquarters));
        assert_eq!(detect_corporate_topic("quando e stata fondata otofarma"), Some(CorporateTopic::Founded));
        assert_eq!(detect_corporate_topic("chi e il responsabile it"), Some(CorporateTopic::ItLead));
    }

    #[test]
    fn it_lead_takes_precedence_over_generic_director() {
        assert_eq!(detect_corporate_topic("chi e il direttore dei sistemi"), Some(CorporateTopic::ItLead));
    }

    #[test]
    fn unrelated_questions() {
        assert_eq!(detect_corporate_topic("quanto costa un apparecchio"), None);
    }
}
