// src/lib.rs
// Library surface shared by the service binary, the `ask` REPL and integration tests.

pub mod api;
pub mod appointments;
pub mod config;
pub mod corporate;
pub mod corpus;
pub mod debug;
pub mod dispatch;
pub mod engine;
pub mod intent;
pub mod llm;
pub mod matcher;
pub mod metrics;
pub mod notify;
pub mod pharmacy;
pub mod reply;
pub mod speech;
pub mod text;

pub use crate::api::router;
pub use crate::dispatch::{ChatRequest, Reply, Stage};
pub use crate::engine::{Engine, EngineBuilder};
