// src/llm.rs
//! Conversational fallback: provider abstraction + in-memory cache + daily limit.
//!
//! Consulted only after every deterministic stage has passed. Replies are
//! sanitized: self-introductions stripped, unhelpful answers dropped, length
//! capped at a sentence boundary.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::text::normalize;

const CACHE_CAP: usize = 512;

/// Trait object used by the engine.
pub trait ConversationalFallback: Send + Sync {
    fn converse<'a>(
        &'a self,
        utterance: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynFallback = Arc<dyn ConversationalFallback>;

/// Low-level provider: does the remote call. The limiting wrapper is shared by
/// production and tests.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        utterance: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

/// Factory: build the fallback according to config and environment.
pub fn build_fallback(cfg: &LlmConfig) -> DynFallback {
    if !cfg.enabled {
        info!("llm fallback disabled");
        return Arc::new(DisabledClient);
    }
    match cfg.provider.as_str() {
        "mock" => Arc::new(LimitedClient::new(
            MockProvider {
                fixed: "Posso aiutarti con informazioni su apparecchi acustici e servizi Otofarma.".into(),
            },
            cfg.daily_limit,
            cfg.max_reply_chars,
        )),
        "openai" => {
            let Some(key) = cfg.resolve_api_key() else {
                warn!("llm fallback enabled but no API key, disabled");
                return Arc::new(DisabledClient);
            };
            match OpenAiProvider::new(key, &cfg.model) {
                Ok(p) => Arc::new(LimitedClient::new(p, cfg.daily_limit, cfg.max_reply_chars)),
                Err(e) => {
                    warn!(error = %e, "llm http client unavailable, disabled");
                    Arc::new(DisabledClient)
                }
            }
        }
        other => {
            warn!(provider = other, "unsupported llm provider, disabled");
            Arc::new(DisabledClient)
        }
    }
}

/// OpenAI Chat Completions.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("otobot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(12))
            .build()?;
        Ok(Self {
            http,
            api_key,
            model: model.to_string(),
        })
    }
}

const SYSTEM_PROMPT: &str = "Sei l'assistente clienti di Otofarma Spa, rete di farmacie specializzata \
in apparecchi acustici e salute dell'udito. Rispondi sempre in italiano, in modo cortese e breve \
(massimo tre frasi). Non presentarti. Se non conosci la risposta, invita a contattare il servizio clienti.";

impl Provider for OpenAiProvider {
    fn fetch<'a>(
        &'a self,
        utterance: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    Msg {
                        role: "user",
                        content: utterance,
                    },
                ],
                temperature: 0.3,
                max_tokens: 220,
            };

            let resp = self
                .http
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
                .ok()?;
            if !resp.status().is_success() {
                warn!(status = %resp.status(), "llm provider returned an error");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            body.choices.into_iter().next().map(|c| c.message.content)
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Always `None`; used when the fallback is disabled.
pub struct DisabledClient;

impl ConversationalFallback for DisabledClient {
    fn converse<'a>(
        &'a self,
        _utterance: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed reply, for tests and local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        _utterance: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

#[derive(Debug, Default)]
struct DailyCounter {
    day: Option<NaiveDate>,
    used: u32,
}

/// Cache + per-day call budget around a provider. Cached answers do not
/// consume the budget.
pub struct LimitedClient<P: Provider> {
    inner: P,
    daily_limit: u32,
    max_chars: usize,
    counter: Mutex<DailyCounter>,
    cache: Mutex<HashMap<String, String>>,
}

impl<P: Provider> LimitedClient<P> {
    pub fn new(inner: P, daily_limit: u32, max_chars: usize) -> Self {
        Self {
            inner,
            daily_limit,
            max_chars,
            counter: Mutex::new(DailyCounter::default()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn try_consume(&self) -> bool {
        let today = Utc::now().date_naive();
        let mut c = self.counter.lock().unwrap_or_else(PoisonError::into_inner);
        if c.day != Some(today) {
            c.day = Some(today);
            c.used = 0;
        }
        if c.used >= self.daily_limit {
            return false;
        }
        c.used += 1;
        true
    }
}

impl<P: Provider> ConversationalFallback for LimitedClient<P> {
    fn converse<'a>(
        &'a self,
        utterance: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            let key = normalize(utterance);
            if key.is_empty() {
                return None;
            }
            let cached = self
                .cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&key)
                .cloned();
            if let Some(hit) = cached {
                return Some(hit);
            }
            if !self.try_consume() {
                warn!(provider = self.inner.name(), "llm daily limit reached");
                return None;
            }

            let raw = self.inner.fetch(utterance).await?;
            let reply = sanitize_reply(&raw, self.max_chars)?;

            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if cache.len() >= CACHE_CAP {
                cache.clear();
            }
            cache.insert(key, reply.clone());
            Some(reply)
        })
    }

    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

static SELF_INTRO: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^\s*(?:ciao|salve|buongiorno)?[!,.]?\s*(?:io\s+)?sono\s+(?:un[ao']?\s*|l'\s*)?(?:assistente|intelligenza artificiale|ia|chatbot|modello|otobot)[^.!?]*[.!?]\s*",
        r"(?i)^\s*come\s+(?:un[ao']?\s*)?(?:assistente|intelligenza artificiale|ia|modello linguistico)[^,.]*[,.]\s*",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

const UNHELPFUL: &[&str] = &[
    "non lo so",
    "non so rispondere",
    "non posso aiutarti",
    "non posso rispondere",
    "non ho informazioni",
    "non sono in grado",
    "i don t know",
    "as an ai",
];

/// Clean a provider reply. `None` when nothing useful is left.
pub fn sanitize_reply(raw: &str, max_chars: usize) -> Option<String> {
    let mut text = raw.trim().replace(['\n', '\r'], " ");
    for re in SELF_INTRO.iter() {
        text = re.replace(&text, "").into_owned();
    }
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return None;
    }
    let norm = normalize(&text);
    if UNHELPFUL.iter().any(|u| norm.contains(u)) {
        return None;
    }
    Some(cap_at_sentence(&text, max_chars))
}

fn cap_at_sentence(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    match head.rfind(['.', '!', '?']) {
        Some(end) if end > 0 => head[..=end].to_string(),
        _ => {
            let cut = head.rfind(' ').unwrap_or(head.len());
            format!("{}…", head[..cut].trim_end())
        }
    }
}
