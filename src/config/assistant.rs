// src/config/assistant.rs
//! `config/assistant.toml` loader.
//!
//! Every section is `#[serde(default)]`, so a partial file (or none at all) is valid.
//! Thresholds are clamped on load; an unknown timezone falls back to `Europe/Rome`.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::llm::LlmConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/assistant.toml";
pub const ENV_CONFIG_PATH: &str = "OTOBOT_CONFIG_PATH";
pub const ENV_CORPUS_PATH: &str = "OTOBOT_CORPUS_PATH";
pub const ENV_FUZZY_THRESHOLD: &str = "OTOBOT_FUZZY_THRESHOLD";

const DEFAULT_TZ: Tz = chrono_tz::Europe::Rome;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub assistant: AssistantSection,
    pub data: DataSection,
    pub office_hours: OfficeHoursSection,
    pub matching: MatchingConfig,
    pub capabilities: CapabilitySwitches,
    pub fallback: FallbackSection,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSection {
    pub name: String,
    pub company: String,
    /// IANA name, e.g. "Europe/Rome".
    pub timezone: String,
    pub phone: String,
    pub email: String,
    pub website: String,
}

impl Default for AssistantSection {
    fn default() -> Self {
        Self {
            name: "OtoBot".into(),
            company: "Otofarma Spa".into(),
            timezone: "Europe/Rome".into(),
            phone: "+39 081 1234567".into(),
            email: "info@otofarmaspa.com".into(),
            website: "www.otofarmaspa.com".into(),
        }
    }
}

impl AssistantSection {
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(DEFAULT_TZ)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Directory scanned recursively for `.yml`/`.yaml`/`.json` corpus documents.
    pub corpus_dir: PathBuf,
    pub pharmacies: PathBuf,
    /// Word list for the spelling corrector; `None` disables dictionary correction.
    pub dictionary: Option<PathBuf>,
    pub corporate: PathBuf,
    pub appointments: PathBuf,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("corpus"),
            pharmacies: PathBuf::from("data/farmacie.csv"),
            dictionary: Some(PathBuf::from("data/it_words.txt")),
            corporate: PathBuf::from("config/corporate.toml"),
            appointments: PathBuf::from("data/appointments.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeHoursSection {
    pub summary: String,
}

impl Default for OfficeHoursSection {
    fn default() -> Self {
        Self {
            summary: "dal lunedì al venerdì, dalle 9:00 alle 13:00 e dalle 14:30 alle 18:30; \
                      il sabato e la domenica siamo chiusi"
                .into(),
        }
    }
}

/// Matcher thresholds. All values are tunable constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Both sides must be longer than this for a substring hit.
    pub min_substring_len: usize,
    pub keyword_threshold: f32,
    pub keyword_bonus: f32,
    pub keyword_bonus_cap: f32,
    pub keyword_min_overlap: usize,
    pub semantic_threshold: f32,
    /// 0..=100
    pub fuzzy_threshold: f32,
    pub spelling_similarity: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_substring_len: 15,
            keyword_threshold: 0.50,
            keyword_bonus: 0.10,
            keyword_bonus_cap: 0.30,
            keyword_min_overlap: 2,
            semantic_threshold: 0.35,
            fuzzy_threshold: 85.0,
            spelling_similarity: 0.70,
        }
    }
}

impl MatchingConfig {
    fn sanitize(&mut self) {
        let d = Self::default();
        self.keyword_threshold = clamp_unit(self.keyword_threshold, d.keyword_threshold);
        self.keyword_bonus = clamp_unit(self.keyword_bonus, d.keyword_bonus);
        self.keyword_bonus_cap = clamp_unit(self.keyword_bonus_cap, d.keyword_bonus_cap);
        self.semantic_threshold = clamp_unit(self.semantic_threshold, d.semantic_threshold);
        self.fuzzy_threshold = if self.fuzzy_threshold.is_finite() {
            self.fuzzy_threshold.clamp(0.0, 100.0)
        } else {
            d.fuzzy_threshold
        };
        self.spelling_similarity = if self.spelling_similarity.is_finite() {
            self.spelling_similarity.clamp(0.0, 1.0)
        } else {
            d.spelling_similarity
        };
        self.keyword_min_overlap = self.keyword_min_overlap.max(1);
    }
}

fn clamp_unit(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// Optional strategies; a disabled one is skipped by the matcher.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitySwitches {
    pub spelling: bool,
    pub semantic: bool,
    pub fuzzy: bool,
}

impl Default for CapabilitySwitches {
    fn default() -> Self {
        Self {
            spelling: true,
            semantic: true,
            fuzzy: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSection {
    pub memory: usize,
}

impl Default for FallbackSection {
    fn default() -> Self {
        Self { memory: 20 }
    }
}

impl AssistantConfig {
    /// Load from `$OTOBOT_CONFIG_PATH` or `config/assistant.toml`, then apply env overrides.
    ///
    /// An explicit path that cannot be read is an error; a missing default file is not.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);
        let path = explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?,
            Err(e) if explicit.is_some() => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
            Err(_) => {
                warn!(path = %path.display(), "config file not found, using built-in defaults");
                Self::default()
            }
        };

        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: Self = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    fn sanitize(&mut self) {
        self.matching.sanitize();
        if self.assistant.timezone.parse::<Tz>().is_err() {
            warn!(tz = %self.assistant.timezone, "unknown timezone, falling back to Europe/Rome");
            self.assistant.timezone = DEFAULT_TZ.name().to_string();
        }
        if self.fallback.memory == 0 {
            self.fallback.memory = FallbackSection::default().memory;
        }
        self.llm.sanitize();
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(ENV_CORPUS_PATH) {
            if !dir.trim().is_empty() {
                self.data.corpus_dir = PathBuf::from(dir.trim());
            }
        }
        if let Some(t) = parse_fuzzy_env(std::env::var(ENV_FUZZY_THRESHOLD).ok()) {
            self.matching.fuzzy_threshold = t;
        }
    }
}

// parse optional float env and clamp to <0.0..=100.0>
fn parse_fuzzy_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = AssistantConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.assistant.name, "OtoBot");
        assert_eq!(cfg.matching.min_substring_len, 15);
        assert_eq!(cfg.fallback.memory, 20);
        assert!(cfg.capabilities.semantic);
    }

    #[test]
    fn thresholds_are_clamped() {
        let cfg = AssistantConfig::from_toml_str(
            "[matching]\nkeyword_threshold = 3.0\nfuzzy_threshold = 140.0\nkeyword_min_overlap = 0\n",
        )
        .unwrap();
        assert_eq!(cfg.matching.keyword_threshold, 1.0);
        assert_eq!(cfg.matching.fuzzy_threshold, 100.0);
        assert_eq!(cfg.matching.keyword_min_overlap, 1);
    }

    #[test]
    fn bad_timezone_falls_back_to_rome() {
        let cfg = AssistantConfig::from_toml_str("[assistant]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        assert_eq!(cfg.assistant.tz(), chrono_tz::Europe::Rome);
    }

    #[test]
    fn fuzzy_env_parsing() {
        assert_eq!(parse_fuzzy_env(Some(" 90 ".into())), Some(90.0));
        assert_eq!(parse_fuzzy_env(Some("250".into())), Some(100.0));
        assert_eq!(parse_fuzzy_env(Some("abc".into())), None);
        assert_eq!(parse_fuzzy_env(None), None);
    }
}
