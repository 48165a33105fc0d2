// src/api.rs
//! HTTP surface: chat, speech and health. Chat traffic never gets a 5xx; the
//! speech endpoints answer 503 when no speech service is configured.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::debug;
use crate::dispatch::{ChatRequest, Stage};
use crate::engine::Engine;
use crate::speech::prepare_for_speech;

const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

pub fn router(engine: Arc<Engine>) -> Router {
    let state = AppState { engine };

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/chat", post(chat))
        .route("/speak", post(speak))
        .route(
            "/transcribe",
            post(transcribe).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES)),
        )
        .layer(CorsLayer::very_permissive())
        .with_state(state)
        .merge(debug::router())
}

#[derive(Deserialize)]
struct ChatReq {
    #[serde(default)]
    message: String,
    #[serde(default)]
    voice: bool,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

#[derive(Serialize)]
struct ChatResp {
    reply: String,
    voice: bool,
    stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech: Option<String>,
}

async fn chat(State(state): State<AppState>, Json(body): Json<ChatReq>) -> Json<ChatResp> {
    let req = ChatRequest {
        message: body.message,
        lat: body.lat,
        lon: body.lon,
    };
    let r = state.engine.reply(&req).await;
    let speech = body.voice.then(|| prepare_for_speech(&r.text));
    Json(ChatResp {
        reply: r.text,
        voice: body.voice,
        stage: r.stage,
        speech,
    })
}

#[derive(Deserialize)]
struct SpeakReq {
    text: String,
}

#[derive(Serialize)]
struct ErrorResp {
    error: &'static str,
}

fn unavailable(what: &'static str) -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResp { error: what })).into_response()
}

async fn speak(State(state): State<AppState>, Json(body): Json<SpeakReq>) -> Response {
    let Some(tts) = state.engine.synthesizer() else {
        return unavailable("speech synthesis not configured");
    };
    match tts.synthesize(&prepare_for_speech(&body.text)).await {
        Ok(audio) => ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response(),
        Err(e) => {
            warn!(target: "api", error = %e, "speech synthesis failed");
            unavailable("speech synthesis failed")
        }
    }
}

#[derive(Serialize)]
struct TranscribeResp {
    text: String,
    reply: String,
    stage: Stage,
}

async fn transcribe(State(state): State<AppState>, audio: Bytes) -> Response {
    let Some(stt) = state.engine.transcriber() else {
        return unavailable("speech recognition not configured");
    };
    let text = match stt.transcribe(audio.to_vec()).await {
        Ok(t) => t,
        Err(e) => {
            warn!(target: "api", error = %e, "transcription failed");
            return unavailable("speech recognition failed");
        }
    };
    let r = state.engine.reply(&ChatRequest::text(text.clone())).await;
    Json(TranscribeResp {
        text,
        reply: r.text,
        stage: r.stage,
    })
    .into_response()
}
