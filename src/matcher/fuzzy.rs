// src/matcher/fuzzy.rs
//! Token-sort ratio (0–100): normalized Levenshtein on alphabetically sorted tokens,
//! so word order does not matter.

use super::{keep_best, result_for, MatchResult, MatchStrategy, Query, StrategyKind};
use crate::corpus::CorpusIndex;

pub struct FuzzyMatch {
    threshold: f32,
}

impl FuzzyMatch {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

pub fn token_sort_ratio(sorted_a: &str, sorted_b: &str) -> f32 {
    if sorted_a.is_empty() || sorted_b.is_empty() {
        return 0.0;
    }
    (strsim::normalized_levenshtein(sorted_a, sorted_b) * 100.0) as f32
}

impl MatchStrategy for FuzzyMatch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fuzzy
    }

    fn find(&self, query: &Query, corpus: &CorpusIndex) -> Option<MatchResult> {
        let mut best = None;
        for (idx, _, k) in corpus.iter() {
            let r = token_sort_ratio(&query.sorted_tokens, &k.sorted_tokens);
            if r > 0.0 {
                keep_best(&mut best, idx, r);
            }
        }
        match best {
            Some((idx, r)) if r >= self.threshold => {
                result_for(corpus, idx, r / 100.0, StrategyKind::Fuzzy)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::QaEntry;
    use crate::text::sorted_tokens;

    #[test]
    fn word_order_is_ignored() {
        let a = sorted_tokens("sono aperte le farmacie");
        let b = sorted_tokens("le farmacie sono aperte");
        assert_eq!(token_sort_ratio(&a, &b), 100.0);
        assert_eq!(token_sort_ratio("", &b), 0.0);
    }

    #[test]
    fn tolerates_small_typos_only() {
        let corpus = CorpusIndex::new(vec![QaEntry::new(
            "Come si puliscono gli apparecchi acustici?",
            "Con un panno asciutto.",
        )]);
        let m = FuzzyMatch::new(85.0);
        let hit = m
            .find(&Query::plain("come si puliscono gli aparecchi acustici"), &corpus)
            .unwrap();
        assert_eq!(hit.strategy, StrategyKind::Fuzzy);
        assert!(hit.confidence >= 0.85);
        assert!(m.find(&Query::plain("come si prenota una visita"), &corpus).is_none());
    }
}
