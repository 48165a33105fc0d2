// src/text/keywords.rs
//! Content-word extraction: stopword removal, short-token drop, optional POS filter.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;

use super::normalize::{normalize, tokens};

/// Upper bound on keywords kept per utterance.
pub const MAX_KEYWORDS: usize = 8;

/// Italian stopwords, already in normalized (accent-free) form.
pub const STOPWORDS: &[&str] = &[
    "il", "lo", "la", "i", "gli", "le", "un", "una", "uno", "che", "di", "a", "da", "in", "con",
    "su", "per", "tra", "fra", "mi", "ti", "si", "ci", "vi", "lui", "lei", "noi", "voi", "loro",
    "sono", "sei", "e", "siamo", "siete", "ho", "hai", "ha", "abbiamo", "avete", "hanno", "era",
    "eri", "fu", "fui", "eravamo", "eravate", "erano", "ma", "o", "ed", "anche", "come", "quando",
    "dove", "chi", "cosa", "perche", "quali", "qual", "quale", "questo", "questa", "quello",
    "quella", "questi", "queste", "quelli", "quelle", "al", "agli", "alle", "allo", "alla", "all",
    "del", "della", "dello", "degli", "delle", "dei", "sul", "sullo", "sulla", "sulle", "sui",
    "tu", "te", "io", "piu", "meno", "molto", "tanto", "tutta", "tutto", "tutti", "tutte", "ogni",
    "alcuni", "alcune", "vostro", "vostra", "vostri", "vostre", "mio", "mia", "miei", "mie",
    "suo", "sua", "nel", "nella", "nei", "nelle", "non", "posso", "puoi", "potete", "vorrei",
    "quanto", "quanti", "quanta", "quante", "essere", "fare", "avere", "c", "l", "po",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());

/// Product/service terms that earn a bonus in keyword-overlap scoring.
pub const IMPORTANT_KEYWORDS: &[&str] = &[
    "apparecchio", "apparecchi", "acustico", "acustici", "udito", "uditivo", "uditiva", "sordita",
    "ipoacusia", "protesi", "otoprotesi", "batterie", "batteria", "audiometrico", "audiometria",
    "esame", "controllo", "visita", "garanzia", "assistenza", "riparazione", "prezzo", "prezzi",
    "costo", "costi", "telemedicina", "farmacia", "farmacie", "otofarma", "appuntamento",
    "prenotazione", "acufene", "acufeni", "tappi", "ricaricabile", "ricaricabili",
];

static IMPORTANT_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| IMPORTANT_KEYWORDS.iter().copied().collect());

pub fn is_stopword(token: &str) -> bool {
    STOPWORD_SET.contains(token)
}

pub fn is_important(token: &str) -> bool {
    IMPORTANT_SET.contains(token)
}

/// Coarse part-of-speech classes a tagger may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosTag {
    Noun,
    Adjective,
    Foreign,
    Verb,
    Other,
}

/// Optional tagger plugged into the extractor; absent by default.
pub trait PosTagger: Send + Sync {
    fn tag(&self, token: &str) -> PosTag;
}

/// Reduces an utterance to its content words.
#[derive(Default)]
pub struct KeywordExtractor {
    tagger: Option<Box<dyn PosTagger>>,
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tagger(tagger: Box<dyn PosTagger>) -> Self {
        Self {
            tagger: Some(tagger),
        }
    }

    /// Content tokens in order of first appearance, deduplicated, uncapped.
    pub fn content_tokens(&self, text: &str) -> Vec<String> {
        let norm = normalize(text);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for tok in tokens(&norm) {
            if tok.chars().count() <= 2 || is_stopword(tok) {
                continue;
            }
            if let Some(tagger) = &self.tagger {
                if !matches!(
                    tagger.tag(tok),
                    PosTag::Noun | PosTag::Adjective | PosTag::Foreign
                ) {
                    continue;
                }
            }
            if seen.insert(tok) {
                out.push(tok.to_string());
            }
        }
        out
    }

    /// Keyword set (at most `MAX_KEYWORDS`). Empty means "strategy not applicable".
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        self.content_tokens(text)
            .into_iter()
            .take(MAX_KEYWORDS)
            .collect()
    }
}

/// Keyword set using the default (tagger-less) extractor.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    KeywordExtractor::default().extract(text)
}
