// src/reply/mod.rs
//! Reply formatting: template fill with randomized phrasing, and the rotating fallback pool.

pub mod fallback;
pub mod templates;

pub use fallback::FallbackMemory;
