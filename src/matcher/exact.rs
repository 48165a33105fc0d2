// src/matcher/exact.rs
//! Equality and token-aligned containment on normalized text.

use super::{keep_best, result_for, MatchResult, MatchStrategy, Query, StrategyKind};
use crate::corpus::CorpusIndex;
use crate::text::contains_phrase;

pub const CONF_EQUAL: f32 = 1.0;
pub const CONF_UTTERANCE_CONTAINS: f32 = 0.95;
pub const CONF_QUESTION_CONTAINS: f32 = 0.90;

pub struct ExactMatch {
    min_len: usize,
}

impl ExactMatch {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }
}

impl MatchStrategy for ExactMatch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Exact
    }

    fn find(&self, query: &Query, corpus: &CorpusIndex) -> Option<MatchResult> {
        // equality over the whole corpus first, so a later equal entry beats an earlier substring
        for form in query.forms() {
            if let Some((idx, _, _)) = corpus.iter().find(|(_, _, k)| k.normalized == form) {
                return result_for(corpus, idx, CONF_EQUAL, StrategyKind::Exact);
            }
        }

        let mut best = None;
        for form in query.forms() {
            if form.chars().count() < self.min_len {
                continue;
            }
            for (idx, _, k) in corpus.iter() {
                let q = k.normalized.as_str();
                if q.chars().count() < self.min_len {
                    continue;
                }
                if contains_phrase(form, q) {
                    keep_best(&mut best, idx, CONF_UTTERANCE_CONTAINS);
                } else if contains_phrase(q, form) {
                    keep_best(&mut best, idx, CONF_QUESTION_CONTAINS);
                }
            }
        }
        best.and_then(|(idx, conf)| result_for(corpus, idx, conf, StrategyKind::Exact))
    }
}
