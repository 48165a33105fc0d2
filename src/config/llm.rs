// src/config/llm.rs
use serde::{Deserialize, Serialize};
use std::env;

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_api_key() -> String {
    "ENV".into()
}
fn default_daily_limit() -> u32 {
    50
}
fn default_max_reply_chars() -> usize {
    400
}

/// `[llm]` section: conversational fallback consulted after every deterministic stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub enabled: bool,
    /// "openai" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from OPENAI_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: default_model(),
            api_key: default_api_key(),
            daily_limit: default_daily_limit(),
            max_reply_chars: default_max_reply_chars(),
        }
    }
}

impl LlmConfig {
    pub(crate) fn sanitize(&mut self) {
        self.provider = self.provider.trim().to_lowercase();
        if self.model.trim().is_empty() {
            self.model = default_model();
        }
        if self.max_reply_chars < 40 {
            self.max_reply_chars = default_max_reply_chars();
        }
    }

    /// Resolved key, or `None` when missing. "ENV" reads `OPENAI_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        let raw = self.api_key.trim();
        let key = if raw.eq_ignore_ascii_case("env") {
            env::var("OPENAI_API_KEY").ok()?
        } else {
            raw.to_string()
        };
        let key = key.trim().to_string();
        (!key.is_empty()).then_some(key)
    }
}
