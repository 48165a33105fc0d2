// src/metrics.rs
use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and publish the corpus size.
    pub fn init(corpus_entries: usize) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        gauge!("otobot_corpus_entries").set(corpus_entries as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// No-ops until a recorder is installed (tests, REPL).
pub fn record_reply(stage: &'static str) {
    counter!("otobot_replies_total", "stage" => stage).increment(1);
}

pub fn record_stage_error(stage: &'static str) {
    counter!("otobot_stage_errors_total", "stage" => stage).increment(1);
}
