// src/debug.rs
//! Dev-only logging gate, anonymous request ids and a small in-process stats
//! snapshot served at `/stats`. Raw user text never leaves this module unhashed.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use axum::{routing::get, Json, Router};
use once_cell::sync::Lazy;
use serde::Serialize;

const LAT_CAP: usize = 200;

/// Dev logging needs `OTOBOT_DEV_LOG=1` AND a dev environment
/// (debug build, or `SHUTTLE_ENV` in local/development/dev).
pub fn dev_logging_enabled() -> bool {
    let on = std::env::var("OTOBOT_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// First 6 bytes of SHA-256, hex. Stable id for correlating logs without the text.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Default, Clone, Serialize)]
pub struct Stats {
    pub total_requests: u64,
    pub by_stage: BTreeMap<String, u64>,
    pub rolling_avg_ms: Option<f64>,
}

static STATS: Lazy<Mutex<Stats>> = Lazy::new(|| Mutex::new(Stats::default()));
static LAT_MS: Lazy<Mutex<VecDeque<u128>>> =
    Lazy::new(|| Mutex::new(VecDeque::with_capacity(LAT_CAP)));

pub fn record_reply(stage: &str, lat_ms: u128) {
    let avg = {
        let mut q = LAT_MS.lock().unwrap_or_else(PoisonError::into_inner);
        if q.len() >= LAT_CAP {
            q.pop_front();
        }
        q.push_back(lat_ms);
        let sum: u128 = q.iter().copied().sum();
        sum as f64 / q.len() as f64
    };

    let mut s = STATS.lock().unwrap_or_else(PoisonError::into_inner);
    s.total_requests += 1;
    *s.by_stage.entry(stage.to_string()).or_insert(0) += 1;
    s.rolling_avg_ms = Some(avg);
}

pub fn snapshot() -> Stats {
    STATS.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

pub fn router() -> Router {
    Router::new().route("/stats", get(stats))
}

async fn stats() -> Json<Stats> {
    Json(snapshot())
}
