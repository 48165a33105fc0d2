// src/text/spelling.rs
//! Best-effort spelling correction for Italian utterances.
//!
//! Pipeline (on normalized text):
//! 1) split glued greeting tokens ("ciaociao" → "ciao ciao"),
//! 2) whole-word substitutions from a fixed misspelling table,
//! 3) per-token dictionary lookup; a suggestion is accepted only when its
//!    normalized Levenshtein similarity to the original clears `min_similarity`.
//!
//! Correcting twice is not guaranteed to equal correcting once.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::keywords::STOPWORDS;
use super::normalize::{normalize, tokens};

/// Words that may appear glued together without a space.
const GLUED_WORDS: &[&str] = &[
    "buongiorno", "buonasera", "arrivederci", "otobot", "grazie", "salve", "ciao", "hey", "ehi",
];

/// Misspelling → correction, both sides normalized.
const MISSPELLINGS: &[(&str, &str)] = &[
    ("apparechio", "apparecchio"),
    ("aparecchio", "apparecchio"),
    ("apparechi", "apparecchi"),
    ("acustichi", "acustici"),
    ("apuntamento", "appuntamento"),
    ("appuntameto", "appuntamento"),
    ("apputamento", "appuntamento"),
    ("prenotre", "prenotare"),
    ("farmaccia", "farmacia"),
    ("farmacja", "farmacia"),
    ("otobbot", "otobot"),
    ("otoboot", "otobot"),
    ("oto bot", "otobot"),
    ("orrari", "orari"),
    ("orarii", "orari"),
    ("ke", "che"),
    ("xke", "perche"),
    ("xche", "perche"),
    ("cm", "come"),
    ("nn", "non"),
    ("qnt", "quanto"),
    ("quato", "quanto"),
    ("cuanto", "quanto"),
    ("grz", "grazie"),
    ("grazzie", "grazie"),
    ("bongiorno", "buongiorno"),
    ("buongiono", "buongiorno"),
    ("telemedicna", "telemedicina"),
    ("sno", "sono"),
];

/// Vocabulary the classifiers depend on; always part of the dictionary.
pub const BUILTIN_WORDS: &[&str] = &[
    "ciao", "salve", "buongiorno", "buonasera", "buonanotte", "grazie", "mille", "arrivederci",
    "prego", "otobot", "ore", "ora", "giorno", "oggi", "data", "adesso", "orario", "orari",
    "attuale", "corrente", "dici", "dirmi", "settimana", "mese", "anno", "apertura", "aperti",
    "aperto", "chiusura", "chiusi", "chiude", "chiudete", "apre", "aprite", "ufficio", "sede",
    "negozio", "centro", "lunedi", "martedi", "mercoledi", "giovedi", "venerdi", "sabato",
    "domenica", "weekend", "festivi", "fondatore", "fondato", "fondata", "fondatrice",
    "fondazione", "amministratore", "delegato", "direttore", "generale", "responsabile",
    "informatico", "informatica", "sistemi", "azienda", "societa", "farmacia", "farmacie",
    "farmacista", "parafarmacia", "vicino", "vicina", "vicine", "vicini", "zona", "indirizzo",
    "trovare", "trova", "trovo", "citta", "telefono", "numero", "email", "contatto",
    "contattare", "chiamare", "appuntamento", "prenotare", "prenota", "prenotazione", "fissare",
    "verificare", "controllare", "confermare", "disdire", "annullare", "chiamo", "nome", "stai",
    "bene", "aiuto", "aiutarmi", "apparecchio", "apparecchi", "acustico", "acustici", "udito",
    "telemedicina", "quanto", "perche", "dintorni", "vicinanze", "posizione",
];

static MISSPELLING_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    MISSPELLINGS
        .iter()
        .filter_map(|(wrong, right)| {
            Regex::new(&format!(r"\b{}\b", regex::escape(wrong)))
                .ok()
                .map(|re| (re, *right))
        })
        .collect()
});

/// Word → frequency table, bucketed by length for candidate search.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    freq: HashMap<String, u64>,
    by_len: HashMap<usize, Vec<String>>,
}

impl Dictionary {
    /// Load a word list: one entry per line, `word [frequency]`. `#` starts a comment.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading dictionary {}", path.display()))?;
        Ok(Self::from_str_list(&content))
    }

    pub fn from_str_list(content: &str) -> Self {
        let mut dict = Self::default();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else { continue };
            let freq = match parts.next() {
                None => 1,
                Some(raw) => match raw.parse::<u64>() {
                    Ok(f) => f,
                    Err(_) => {
                        warn!(line = lineno + 1, "dictionary: bad frequency, entry skipped");
                        continue;
                    }
                },
            };
            dict.insert(&normalize(word), freq);
        }
        dict
    }

    /// Add words with frequency 1 unless already present.
    pub fn extend_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for w in words {
            let w = normalize(w.as_ref());
            for tok in tokens(&w) {
                if !self.freq.contains_key(tok) {
                    self.insert(tok, 1);
                }
            }
        }
    }

    fn insert(&mut self, word: &str, freq: u64) {
        if word.is_empty() || word.contains(' ') {
            return;
        }
        let prev = self.freq.insert(word.to_string(), freq);
        if prev.is_none() {
            self.by_len
                .entry(word.chars().count())
                .or_default()
                .push(word.to_string());
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.freq.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.freq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }

    /// Closest known word within `max_distance` edits; ties → higher frequency → lexical order.
    pub fn suggest(&self, word: &str, max_distance: usize) -> Option<&str> {
        let len = word.chars().count();
        let lo = len.saturating_sub(max_distance);
        let hi = len + max_distance;

        let mut best: Option<(usize, u64, &str)> = None;
        for l in lo..=hi {
            let Some(bucket) = self.by_len.get(&l) else { continue };
            for cand in bucket {
                let d = strsim::levenshtein(word, cand);
                if d > max_distance {
                    continue;
                }
                let f = self.freq.get(cand).copied().unwrap_or(0);
                let better = match best {
                    None => true,
                    Some((bd, bf, bw)) => {
                        d < bd || (d == bd && (f > bf || (f == bf && cand.as_str() < bw)))
                    }
                };
                if better {
                    best = Some((d, f, cand.as_str()));
                }
            }
        }
        best.map(|(_, _, w)| w)
    }
}

/// Spelling corrector; without a dictionary only steps 1–2 run.
#[derive(Debug, Clone)]
pub struct SpellingCorrector {
    dictionary: Option<Dictionary>,
    min_similarity: f64,
}

impl SpellingCorrector {
    pub fn new(dictionary: Option<Dictionary>, min_similarity: f64) -> Self {
        let dictionary = dictionary.map(|mut d| {
            d.extend_words(BUILTIN_WORDS);
            d.extend_words(STOPWORDS);
            d
        });
        Self {
            dictionary,
            min_similarity: min_similarity.clamp(0.0, 1.0),
        }
    }

    /// Corrector with no dictionary (table + glued-token split only).
    pub fn disabled() -> Self {
        Self::new(None, 1.0)
    }

    pub fn has_dictionary(&self) -> bool {
        self.dictionary.is_some()
    }

    /// Teach the dictionary extra domain words (corpus vocabulary, place names).
    pub fn learn<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(d) = self.dictionary.as_mut() {
            d.extend_words(words);
        }
    }

    pub fn correct(&self, text: &str) -> String {
        let norm = normalize(text);
        if norm.is_empty() {
            return norm;
        }

        let split = split_glued_tokens(&norm);
        let fixed = apply_misspellings(&split);

        let Some(dict) = &self.dictionary else {
            return fixed;
        };

        tokens(&fixed)
            .map(|tok| self.correct_token(dict, tok))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn correct_token(&self, dict: &Dictionary, tok: &str) -> String {
        if tok.chars().count() <= 3 || tok.chars().any(|c| c.is_ascii_digit()) || dict.contains(tok)
        {
            return tok.to_string();
        }
        match dict.suggest(tok, 2) {
            Some(cand) if strsim::normalized_levenshtein(tok, cand) >= self.min_similarity => {
                cand.to_string()
            }
            _ => tok.to_string(),
        }
    }
}

/// "ciaociao" → "ciao ciao", "ciaootobot" → "ciao otobot". Other tokens untouched.
pub fn split_glued_tokens(normalized: &str) -> String {
    tokens(normalized)
        .map(|tok| match split_glued(tok) {
            Some(parts) => parts.join(" "),
            None => tok.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_glued(token: &str) -> Option<Vec<&'static str>> {
    let mut rest = token;
    let mut parts = Vec::new();
    while !rest.is_empty() {
        let word = GLUED_WORDS.iter().find(|w| rest.starts_with(**w))?;
        parts.push(*word);
        rest = &rest[word.len()..];
    }
    (parts.len() >= 2).then_some(parts)
}

fn apply_misspellings(normalized: &str) -> String {
    let mut out = normalized.to_string();
    for (re, right) in MISSPELLING_RULES.iter() {
        if re.is_match(&out) {
            out = re.replace_all(&out, *right).into_owned();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrector() -> SpellingCorrector {
        let dict = Dictionary::from_str_list(
            "# word freq\nappuntamento 50\nappartamento 5\nsentire 10\ncostano 8\ncostare 3\n",
        );
        SpellingCorrector::new(Some(dict), 0.70)
    }

    #[test]
    fn glued_greetings_are_split() {
        assert_eq!(split_glued_tokens("ciaociao"), "ciao ciao");
        assert_eq!(split_glued_tokens("ciaootobot come va"), "ciao otobot come va");
        assert_eq!(split_glued_tokens("ciaone"), "ciaone");
        assert_eq!(split_glued_tokens("ciao"), "ciao");
    }

    #[test]
    fn misspelling_table_uses_whole_words() {
        let c = SpellingCorrector::disabled();
        assert_eq!(c.correct("Ke ore sno?"), "che ore sono");
        // "ke" inside a longer word must not be rewritten
        assert_eq!(c.correct("kebab"), "kebab");
    }

    #[test]
    fn dictionary_fixes_close_typos() {
        let c = corrector();
        assert_eq!(c.correct("vorrei un apuntamentto"), "vorrei un appuntamento");
        assert_eq!(c.correct("quanto costanno"), "quanto costano");
    }

    #[test]
    fn dissimilar_suggestions_are_rejected() {
        let dict = Dictionary::from_str_list("casa 100\n");
        let c = SpellingCorrector::new(Some(dict), 0.70);
        // "cosi" → "casa" is 2 edits on 4 chars: similarity 0.5, must be kept as-is
        assert_eq!(c.correct("cosi"), "cosi");
    }

    #[test]
    fn short_and_numeric_tokens_are_kept() {
        let c = corrector();
        assert_eq!(c.correct("ok 3331234567 ehm"), "ok 3331234567 ehm");
    }

    #[test]
    fn without_dictionary_input_passes_through() {
        let c = SpellingCorrector::disabled();
        assert!(!c.has_dictionary());
        assert_eq!(c.correct("parola sconosciutta"), "parola sconosciutta");
    }

    #[test]
    fn learned_words_are_not_corrected() {
        let mut c = corrector();
        c.learn(["audioprotesista"]);
        assert_eq!(c.correct("audioprotesista"), "audioprotesista");
    }

    #[test]
    fn bad_frequency_lines_are_skipped() {
        let d = Dictionary::from_str_list("uno 1\ndue xx\ntre\n");
        assert!(d.contains("uno"));
        assert!(!d.contains("due"));
        assert!(d.contains("tre"));
    }
}
