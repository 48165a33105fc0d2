// tests/fallback_rotation.rs
//
// The canned fallback never repeats within its memory window.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use otobot::config::AssistantConfig;
use otobot::reply::FallbackMemory;
use otobot::{EngineBuilder, Stage};

#[test]
fn n_picks_from_pool_of_n_are_distinct() {
    let pool: Vec<String> = (0..6).map(|i| format!("messaggio {i}")).collect();
    let mem = FallbackMemory::with_capacity(20);
    let mut rng = StdRng::seed_from_u64(17);

    let picked: HashSet<String> = (0..pool.len())
        .map(|_| mem.pick(&pool, &mut rng).expect("non-empty pool"))
        .collect();
    assert_eq!(picked.len(), pool.len());

    // exhausted: memory resets and picking goes on
    assert!(mem.pick(&pool, &mut rng).is_some());
    assert!(mem.len() <= pool.len());
}

#[test]
fn empty_pool_gives_none() {
    let mem = FallbackMemory::with_capacity(5);
    let mut rng = StdRng::seed_from_u64(1);
    assert!(mem.pick(&[], &mut rng).is_none());
}

#[tokio::test]
async fn engine_fallbacks_do_not_repeat() {
    let engine = EngineBuilder::new(AssistantConfig::default()).seed(23).build();
    let mut seen = HashSet::new();
    for _ in 0..7 {
        let r = engine
            .reply(&otobot::ChatRequest::text("mi piace molto il mare d'inverno"))
            .await;
        assert_eq!(r.stage, Stage::Fallback);
        assert!(seen.insert(r.text), "fallback repeated");
    }
}
