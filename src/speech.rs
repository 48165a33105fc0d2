// src/speech.rs
//! Speech collaborators and text preparation for synthesis.
//!
//! Phone numbers are spelled digit by digit, e-mail and web addresses are read
//! out ("chiocciola", "punto"). Synthesis/transcription failures are never fatal.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

#[async_trait::async_trait]
pub trait Synthesizer: Send + Sync {
    /// MP3 bytes for `text`.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String>;
}

const DIGITS: [&str; 10] = [
    "zero", "uno", "due", "tre", "quattro", "cinque", "sei", "sette", "otto", "nove",
];

static EMAIL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"[\w.+\-]+@[\w\-]+(?:\.[\w\-]+)+").ok());
static WEB: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\bwww\.[\w\-]+(?:\.[\w\-]+)+").ok());
static PHONE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\+?\d[\d\s.]{5,}\d").ok());

fn spell_address(s: &str) -> String {
    s.replace('@', " chiocciola ").replace('.', " punto ")
}

fn spell_phone(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '+' => Some("più"),
            d if d.is_ascii_digit() => Some(DIGITS[(d as u8 - b'0') as usize]),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rewrite a reply so a speech engine reads contacts intelligibly.
pub fn prepare_for_speech(text: &str) -> String {
    let mut out = text.to_string();
    if let Some(re) = EMAIL.as_ref() {
        out = re.replace_all(&out, |c: &regex::Captures| spell_address(&c[0])).into_owned();
    }
    if let Some(re) = WEB.as_ref() {
        out = re.replace_all(&out, |c: &regex::Captures| spell_address(&c[0])).into_owned();
    }
    if let Some(re) = PHONE.as_ref() {
        out = re
            .replace_all(&out, |c: &regex::Captures| {
                let digits = c[0].chars().filter(|ch| ch.is_ascii_digit()).count();
                if digits >= 7 {
                    spell_phone(&c[0])
                } else {
                    c[0].to_string()
                }
            })
            .into_owned();
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// OpenAI audio endpoints (`tts-1`, `whisper-1`).
pub struct OpenAiSpeech {
    http: reqwest::Client,
    api_key: String,
    voice: String,
}

impl OpenAiSpeech {
    pub fn new(api_key: String, voice: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("otobot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            api_key,
            voice: voice.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Synthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let body = serde_json::json!({
            "model": "tts-1",
            "voice": self.voice,
            "input": text,
            "response_format": "mp3",
        });
        let bytes = self
            .http
            .post("https://api.openai.com/v1/audio/speech")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("tts request")?
            .error_for_status()
            .context("tts non-2xx")?
            .bytes()
            .await
            .context("tts body")?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl Transcriber for OpenAiSpeech {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct Resp {
            text: String,
        }
        let part = reqwest::multipart::Part::bytes(audio).file_name("audio.webm");
        let form = reqwest::multipart::Form::new()
            .text("model", "whisper-1")
            .text("language", "it")
            .part("file", part);
        let resp: Resp = self
            .http
            .post("https://api.openai.com/v1/audio/transcriptions")
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("stt request")?
            .error_for_status()
            .context("stt non-2xx")?
            .json()
            .await
            .context("stt body")?;
        Ok(resp.text.trim().to_string())
    }
}

/// Speech is enabled with `OTOBOT_SPEECH=openai` and an `OPENAI_API_KEY`.
pub fn from_env() -> (Option<Arc<dyn Synthesizer>>, Option<Arc<dyn Transcriber>>) {
    let wanted = std::env::var("OTOBOT_SPEECH").unwrap_or_default();
    if !wanted.eq_ignore_ascii_case("openai") {
        info!("speech services disabled");
        return (None, None);
    }
    let Some(key) = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()) else {
        warn!("OTOBOT_SPEECH=openai but OPENAI_API_KEY is missing, speech disabled");
        return (None, None);
    };
    let voice = std::env::var("OTOBOT_TTS_VOICE").unwrap_or_else(|_| "nova".into());
    match OpenAiSpeech::new(key, &voice) {
        Ok(s) => {
            let s = Arc::new(s);
            (Some(s.clone()), Some(s))
        }
        Err(e) => {
            warn!(error = %e, "speech client unavailable");
            (None, None)
        }
    }
}
