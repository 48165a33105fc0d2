// src/text/mod.rs
//! Text preprocessing shared by the matcher and the intent classifiers.

pub mod keywords;
pub mod normalize;
pub mod spelling;

pub use keywords::{extract_keywords, KeywordExtractor, PosTag, PosTagger, MAX_KEYWORDS};
pub use normalize::{contains_phrase, normalize, sorted_tokens, tokens};
pub use spelling::{Dictionary, SpellingCorrector};
