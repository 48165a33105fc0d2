// src/reply/fallback.rs
//! Bounded memory of recently used fallback messages.
//!
//! Best-effort under concurrency: a lock guards the ring, but two requests may
//! still pick the same message. A poisoned lock is recovered, never propagated.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use rand::seq::IndexedRandom;
use rand::Rng;

#[derive(Debug)]
pub struct FallbackMemory {
    recent: Mutex<VecDeque<String>>,
    cap: usize,
}

impl FallbackMemory {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 1_000);
        Self {
            recent: Mutex::new(VecDeque::with_capacity(cap)),
            cap,
        }
    }

    /// Pick a message not used recently; once every message has been used the memory resets,
    /// never repeating the last message across the reset.
    /// Returns `None` only for an empty pool.
    pub fn pick<R: Rng + ?Sized>(&self, pool: &[String], rng: &mut R) -> Option<String> {
        let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
        let fresh: Vec<&String> = pool.iter().filter(|m| !recent.contains(m)).collect();
        let chosen = if fresh.is_empty() {
            // new round: anything but the message sent last
            let last = recent.back().cloned();
            recent.clear();
            let rest: Vec<&String> = pool.iter().filter(|m| Some(*m) != last.as_ref()).collect();
            match rest.choose(rng) {
                Some(m) => (*m).clone(),
                None => pool.choose(rng)?.clone(),
            }
        } else {
            (*fresh.choose(rng)?).clone()
        };
        recent.push_back(chosen.clone());
        while recent.len() > self.cap {
            recent.pop_front();
        }
        Some(chosen)
    }

    pub fn len(&self) -> usize {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
