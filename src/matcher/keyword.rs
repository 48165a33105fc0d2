// src/matcher/keyword.rs
//! Keyword-overlap scoring: Jaccard on keyword sets plus a capped bonus for
//! shared product/service terms.

use std::collections::BTreeSet;

use super::{keep_best, result_for, MatchResult, MatchStrategy, Query, StrategyKind};
use crate::config::MatchingConfig;
use crate::corpus::CorpusIndex;
use crate::text::keywords::is_important;

#[derive(Debug, Clone)]
pub struct KeywordOverlap {
    threshold: f32,
    bonus: f32,
    bonus_cap: f32,
    min_overlap: usize,
}

impl KeywordOverlap {
    pub fn from_config(cfg: &MatchingConfig) -> Self {
        Self {
            threshold: cfg.keyword_threshold,
            bonus: cfg.keyword_bonus,
            bonus_cap: cfg.keyword_bonus_cap,
            min_overlap: cfg.keyword_min_overlap,
        }
    }

    /// Overlap required for this utterance: a lone important keyword is enough on its own.
    fn required_overlap(&self, utterance: &BTreeSet<String>) -> usize {
        match utterance.iter().next() {
            Some(only) if utterance.len() == 1 && is_important(only) => 1,
            _ => self.min_overlap,
        }
    }

    /// Score in `0.0..=1.0`; `None` when the sets cannot be compared or overlap is too small.
    pub fn score(&self, utterance: &BTreeSet<String>, question: &BTreeSet<String>) -> Option<f32> {
        if utterance.is_empty() || question.is_empty() {
            return None;
        }
        let shared: Vec<&String> = utterance.intersection(question).collect();
        if shared.len() < self.required_overlap(utterance) {
            return None;
        }
        let union = utterance.union(question).count() as f32;
        let jaccard = shared.len() as f32 / union;
        let important = shared.iter().filter(|k| is_important(k)).count() as f32;
        let bonus = (important * self.bonus).min(self.bonus_cap);
        Some((jaccard + bonus).min(1.0))
    }
}

impl MatchStrategy for KeywordOverlap {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Keyword
    }

    fn find(&self, query: &Query, corpus: &CorpusIndex) -> Option<MatchResult> {
        let mut best = None;
        for (idx, _, k) in corpus.iter() {
            if let Some(s) = self.score(&query.keywords, &k.keywords) {
                keep_best(&mut best, idx, s);
            }
        }
        match best {
            Some((idx, s)) if s >= self.threshold => {
                result_for(corpus, idx, s, StrategyKind::Keyword)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::QaEntry;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn strategy() -> KeywordOverlap {
        KeywordOverlap::from_config(&MatchingConfig::default())
    }

    #[test]
    fn more_shared_keywords_never_lower_the_score() {
        let s = strategy();
        let q = set(&["alfa", "bravo", "charlie", "delta"]);
        let mut last = 0.0;
        for u in [
            set(&["alfa", "bravo", "xray", "yankee"]),
            set(&["alfa", "bravo", "charlie", "yankee"]),
            set(&["alfa", "bravo", "charlie", "delta"]),
        ] {
            let score = s.score(&u, &q).unwrap();
            assert!(score >= last, "{score} < {last}");
            last = score;
        }
    }

    #[test]
    fn important_terms_earn_capped_bonus() {
        let s = strategy();
        let plain = s.score(&set(&["alfa", "bravo"]), &set(&["alfa", "bravo", "zulu"])).unwrap();
        let boosted = s
            .score(&set(&["udito", "protesi"]), &set(&["udito", "protesi", "zulu"]))
            .unwrap();
        assert!((boosted - plain - 0.2).abs() < 1e-6);
        let capped = s
            .score(
                &set(&["udito", "protesi", "batterie", "garanzia"]),
                &set(&["udito", "protesi", "batterie", "garanzia", "a", "b", "c", "d"]),
            )
            .unwrap();
        assert!((capped - (0.5 + 0.3)).abs() < 1e-6);
    }

    #[test]
    fn single_overlap_needs_lone_important_keyword() {
        let s = strategy();
        assert!(s.score(&set(&["alfa"]), &set(&["alfa", "bravo"])).is_none());
        assert!(s.score(&set(&["udito"]), &set(&["udito", "bravo"])).is_some());
        assert!(s.score(&set(&[]), &set(&["udito"])).is_none());
    }

    #[test]
    fn finds_paraphrase_above_threshold() {
        let corpus = CorpusIndex::new(vec![
            QaEntry::new("Vendete batterie per apparecchi acustici?", "Sì."),
            QaEntry::new("Quanto costa la visita?", "È gratuita."),
        ]);
        let q = Query::plain("batterie apparecchi acustici disponibili");
        let hit = strategy().find(&q, &corpus).unwrap();
        assert_eq!(hit.entry, 0);
        assert_eq!(hit.strategy, StrategyKind::Keyword);
    }
}
