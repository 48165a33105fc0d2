//! OtoBot service entrypoint.
//! Boots the Axum HTTP server with the reply engine, metrics and dev stats.
//!
//! See `README.md` for configuration and data files.

use std::sync::Arc;

use otobot::config::AssistantConfig;
use otobot::metrics::Metrics;
use otobot::Engine;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs in development only: needs a dev environment
/// (debug build or SHUTTLE_ENV in {local, development, dev}) AND OTOBOT_DEV_LOG=1.
fn enable_dev_tracing() {
    if !otobot::debug::dev_logging_enabled() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("otobot=debug,dispatch=debug,matcher=debug,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // .env is optional
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = AssistantConfig::load()?;
    let engine = Arc::new(Engine::from_config(cfg));

    let metrics = Metrics::init(engine.corpus().len())?;
    let router = otobot::router(engine).merge(metrics.router());

    Ok(router.into())
}
