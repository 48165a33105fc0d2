// src/matcher/semantic.rs
//! TF-IDF cosine similarity over corpus questions.
//!
//! Terms are content tokens (stopwords and ≤2-char tokens removed) plus bigrams
//! of adjacent content tokens. IDF is smoothed: `ln((1 + n) / (1 + df)) + 1`.
//! Vectors are sparse and L2-normalized, so cosine is a plain dot product.

use std::collections::HashMap;

use super::{keep_best, result_for, MatchResult, MatchStrategy, Query, StrategyKind};
use crate::corpus::CorpusIndex;
use crate::text::KeywordExtractor;

type SparseVec = HashMap<u32, f32>;

pub struct TfIdfMatch {
    threshold: f32,
    vocab: HashMap<String, u32>,
    idf: Vec<f32>,
    docs: Vec<SparseVec>,
    extractor: KeywordExtractor,
}

impl TfIdfMatch {
    pub fn build(corpus: &CorpusIndex, threshold: f32) -> Self {
        let extractor = KeywordExtractor::default();
        let mut vocab: HashMap<String, u32> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();

        let term_lists: Vec<Vec<String>> = corpus
            .iter()
            .map(|(_, _, k)| terms(&extractor, &k.normalized))
            .collect();

        for list in &term_lists {
            let mut seen = std::collections::HashSet::new();
            for t in list {
                let next = vocab.len() as u32;
                let id = *vocab.entry(t.clone()).or_insert(next);
                if id as usize == df.len() {
                    df.push(0);
                }
                if seen.insert(id) {
                    df[id as usize] += 1;
                }
            }
        }

        let n = term_lists.len() as f32;
        let idf: Vec<f32> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
            .collect();

        let mut me = Self {
            threshold,
            vocab,
            idf,
            docs: Vec::new(),
            extractor,
        };
        let docs = term_lists.iter().map(|l| me.vectorize(l)).collect();
        me.docs = docs;
        me
    }

    fn vectorize(&self, terms: &[String]) -> SparseVec {
        let mut v: SparseVec = HashMap::new();
        for t in terms {
            if let Some(&id) = self.vocab.get(t) {
                *v.entry(id).or_insert(0.0) += 1.0;
            }
        }
        for (id, w) in v.iter_mut() {
            *w *= self.idf[*id as usize];
        }
        l2_normalize(&mut v);
        v
    }

    /// Cosine similarity between `text` and every corpus question, in corpus order.
    pub fn similarities(&self, text: &str) -> Vec<f32> {
        let q = self.vectorize(&terms(&self.extractor, text));
        self.docs.iter().map(|d| dot(&q, d)).collect()
    }
}

impl MatchStrategy for TfIdfMatch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Semantic
    }

    fn find(&self, query: &Query, corpus: &CorpusIndex) -> Option<MatchResult> {
        if self.docs.len() != corpus.len() {
            return None;
        }
        let mut best = None;
        for (idx, s) in self.similarities(&query.corrected).into_iter().enumerate() {
            if s > 0.0 {
                keep_best(&mut best, idx, s);
            }
        }
        match best {
            Some((idx, s)) if s >= self.threshold => {
                result_for(corpus, idx, s.min(1.0), StrategyKind::Semantic)
            }
            _ => None,
        }
    }
}

fn terms(extractor: &KeywordExtractor, normalized: &str) -> Vec<String> {
    let uni = extractor.content_tokens(normalized);
    let mut out = Vec::with_capacity(uni.len() * 2);
    for w in uni.windows(2) {
        out.push(format!("{} {}", w[0], w[1]));
    }
    out.extend(uni);
    out
}

fn l2_normalize(v: &mut SparseVec) {
    let norm = v.values().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.values_mut() {
            *x /= norm;
        }
    }
}

fn dot(a: &SparseVec, b: &SparseVec) -> f32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(k, x)| large.get(k).map(|y| x * y))
        .sum()
}
