// src/matcher/mod.rs
//! Multi-strategy corpus matcher.
//!
//! Strategies run in fixed priority order: exact/substring → keyword overlap →
//! TF-IDF cosine → fuzzy token-sort. The first one whose best candidate clears
//! its own threshold answers; otherwise the matcher returns `None` and the
//! caller falls through. Within one strategy the first corpus entry wins ties.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::MatchingConfig;
use crate::corpus::CorpusIndex;
use crate::text::{extract_keywords, normalize, sorted_tokens};

pub mod exact;
pub mod fuzzy;
pub mod keyword;
pub mod semantic;

pub use crate::config::CapabilitySwitches as Capabilities;
pub use exact::ExactMatch;
pub use fuzzy::FuzzyMatch;
pub use keyword::KeywordOverlap;
pub use semantic::TfIdfMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Exact,
    Keyword,
    Semantic,
    Fuzzy,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Exact => "exact",
            StrategyKind::Keyword => "keyword",
            StrategyKind::Semantic => "semantic",
            StrategyKind::Fuzzy => "fuzzy",
        }
    }
}

/// Outcome of a successful match. Lives for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub answer: String,
    pub confidence: f32,
    pub strategy: StrategyKind,
    /// Position of the matched entry in the corpus.
    pub entry: usize,
}

/// Utterance prepared once for all strategies.
#[derive(Debug, Clone)]
pub struct Query {
    /// Normalized, before spelling correction.
    pub raw: String,
    /// Normalized and spelling-corrected.
    pub corrected: String,
    pub keywords: BTreeSet<String>,
    pub sorted_tokens: String,
}

impl Query {
    pub fn new(raw: &str, corrected: &str) -> Self {
        let raw = normalize(raw);
        let corrected = normalize(corrected);
        Self {
            keywords: extract_keywords(&corrected),
            sorted_tokens: sorted_tokens(&corrected),
            raw,
            corrected,
        }
    }

    /// Query without a correction pass.
    pub fn plain(text: &str) -> Self {
        Self::new(text, text)
    }

    /// Distinct surface forms worth comparing (corrected first).
    pub fn forms(&self) -> impl Iterator<Item = &str> + '_ {
        let raw = (self.raw != self.corrected).then_some(self.raw.as_str());
        std::iter::once(self.corrected.as_str()).chain(raw)
    }

    pub fn is_empty(&self) -> bool {
        self.corrected.is_empty() && self.raw.is_empty()
    }
}

/// One matching strategy. Implementations must be pure with respect to the corpus.
pub trait MatchStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;
    fn find(&self, query: &Query, corpus: &CorpusIndex) -> Option<MatchResult>;
}

pub struct Matcher {
    corpus: Arc<CorpusIndex>,
    strategies: Vec<Box<dyn MatchStrategy>>,
}

impl Matcher {
    /// Assemble the strategy chain. Disabled capabilities are left out (logged once here).
    pub fn new(corpus: Arc<CorpusIndex>, cfg: &MatchingConfig, caps: Capabilities) -> Self {
        let mut strategies: Vec<Box<dyn MatchStrategy>> = vec![
            Box::new(ExactMatch::new(cfg.min_substring_len)),
            Box::new(KeywordOverlap::from_config(cfg)),
        ];
        if caps.semantic {
            strategies.push(Box::new(TfIdfMatch::build(&corpus, cfg.semantic_threshold)));
        } else {
            info!("semantic matching disabled");
        }
        if caps.fuzzy {
            strategies.push(Box::new(FuzzyMatch::new(cfg.fuzzy_threshold)));
        } else {
            info!("fuzzy matching disabled");
        }
        Self { corpus, strategies }
    }

    /// Custom chain, mostly for tests.
    pub fn with_strategies(corpus: Arc<CorpusIndex>, strategies: Vec<Box<dyn MatchStrategy>>) -> Self {
        Self { corpus, strategies }
    }

    pub fn corpus(&self) -> &CorpusIndex {
        &self.corpus
    }

    pub fn strategies(&self) -> impl Iterator<Item = StrategyKind> + '_ {
        self.strategies.iter().map(|s| s.kind())
    }

    pub fn find(&self, query: &Query) -> Option<MatchResult> {
        if query.is_empty() || self.corpus.is_empty() {
            return None;
        }
        for s in &self.strategies {
            if let Some(hit) = s.find(query, &self.corpus) {
                debug!(
                    target: "matcher",
                    strategy = hit.strategy.as_str(),
                    confidence = hit.confidence,
                    entry = hit.entry,
                    "corpus match"
                );
                return Some(hit);
            }
        }
        None
    }

    pub fn find_text(&self, text: &str) -> Option<MatchResult> {
        self.find(&Query::plain(text))
    }
}

/// Keep the strictly better candidate so earlier entries win ties.
pub(crate) fn keep_best(best: &mut Option<(usize, f32)>, idx: usize, score: f32) {
    match best {
        Some((_, s)) if score <= *s => {}
        _ => *best = Some((idx, score)),
    }
}

pub(crate) fn result_for(
    corpus: &CorpusIndex,
    idx: usize,
    confidence: f32,
    strategy: StrategyKind,
) -> Option<MatchResult> {
    corpus.entry(idx).map(|e| MatchResult {
        answer: e.answer.clone(),
        confidence,
        strategy,
        entry: idx,
    })
}
