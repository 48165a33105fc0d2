// src/corporate.rs
//! Company facts answered by the corporate-knowledge stage.
//!
//! Loaded from `config/corporate.toml`:
//!
//! ```toml
//! [topics.founder]
//! variants = ["Otofarma è stata fondata da ...", "..."]
//! ```
//!
//! Unknown topic keys are ignored with a warning; topics missing from the file
//! keep the built-in answer.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};

use crate::intent::CorporateTopic;

#[derive(Debug, Default, Deserialize)]
struct FactsFile {
    #[serde(default)]
    topics: HashMap<String, TopicEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct TopicEntry {
    #[serde(default)]
    variants: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CorporateFacts {
    topics: HashMap<CorporateTopic, Vec<String>>,
}

impl Default for CorporateFacts {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CorporateFacts {
    /// Answers shipped with the binary.
    pub fn builtin() -> Self {
        let mut topics = HashMap::new();
        topics.insert(
            CorporateTopic::ItLead,
            vec![
                "Il reparto IT di Otofarma è guidato dal nostro responsabile dei sistemi informativi, che coordina anche lo sviluppo di questo assistente.".to_string(),
            ],
        );
        topics.insert(
            CorporateTopic::Ceo,
            vec![
                "L'amministratore delegato di Otofarma Spa guida l'azienda con l'obiettivo di rendere l'udito accessibile a tutti attraverso le farmacie.".to_string(),
            ],
        );
        topics.insert(
            CorporateTopic::Founder,
            vec![
                "Otofarma è nata dall'idea di portare i servizi per l'udito direttamente nelle farmacie italiane.".to_string(),
            ],
        );
        topics.insert(
            CorporateTopic::Founded,
            vec!["Otofarma Spa è stata fondata nel 2009.".to_string()],
        );
        topics.insert(
            CorporateTopic::Headquarters,
            vec!["La sede di Otofarma Spa si trova in Campania, in provincia di Napoli.".to_string()],
        );
        Self { topics }
    }

    /// Missing file ⇒ built-in facts. A file that does not parse is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => {
                warn!(path = %path.display(), "corporate facts not found, using built-in answers");
                return Ok(Self::builtin());
            }
        };
        let facts = Self::from_toml_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!(topics = facts.topics.len(), "corporate facts loaded");
        Ok(facts)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: FactsFile = toml::from_str(s)?;
        let mut facts = Self::builtin();
        for (key, entry) in file.topics {
            let Some(topic) = CorporateTopic::ALL.iter().find(|t| t.key() == key) else {
                warn!(topic = %key, "unknown corporate topic, ignored");
                continue;
            };
            let variants: Vec<String> = entry
                .variants
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
            if !variants.is_empty() {
                facts.topics.insert(*topic, variants);
            }
        }
        Ok(facts)
    }

    pub fn answer<R: Rng + ?Sized>(&self, topic: CorporateTopic, rng: &mut R) -> Option<String> {
        self.topics.get(&topic)?.choose(rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_topic_has_a_builtin_answer() {
        let facts = CorporateFacts::builtin();
        let mut rng = StdRng::seed_from_u64(1);
        for t in CorporateTopic::ALL {
            assert!(facts.answer(t, &mut rng).is_some(), "{t:?}");
        }
    }

    #[test]
    fn file_overrides_only_listed_topics() {
        let facts = CorporateFacts::from_toml_str(
            r#"
            [topics.founded]
            variants = ["Fondata nel 2010.", "  "]

            [topics.mascot]
            variants = ["nessuna"]
            "#,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            facts.answer(CorporateTopic::Founded, &mut rng).as_deref(),
            Some("Fondata nel 2010.")
        );
        assert_eq!(
            facts.answer(CorporateTopic::Headquarters, &mut rng),
            CorporateFacts::builtin().answer(CorporateTopic::Headquarters, &mut rng)
        );
    }

    #[test]
    fn missing_file_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let facts = CorporateFacts::load(dir.path().join("nope.toml")).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(facts.answer(CorporateTopic::Ceo, &mut rng).is_some());
    }

    #[test]
    fn broken_file_is_an_error() {
        assert!(CorporateFacts::from_toml_str("[topics.founded\nvariants =").is_err());
    }
}
