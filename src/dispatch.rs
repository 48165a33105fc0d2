// src/dispatch.rs
//! # Reply pipeline
//! Ordered rule list, first match wins. Every request runs the same stages:
//!
//! 1. appointment check / booking
//! 2. assistant activation
//! 3. greeting and small talk
//! 4. "near me" pharmacy query
//! 5. language gate (non-Italian gets an apology)
//! 6. office hours
//! 7. time / date
//! 8. company knowledge
//! 9. corpus matcher
//! 10. pharmacy lookup
//! 11. conversational fallback (LLM, optional)
//! 12. rotating canned fallback
//!
//! A stage that fails is logged and skipped, unless it has a degraded reply of
//! its own (appointments: "store unavailable"). The caller always gets a reply.

use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::appointments::Appointment;
use crate::debug::{self as devlog, anon_hash};
use crate::engine::Engine;
use crate::intent::appointment::{extract_details, AppointmentDetails};
use crate::intent::{
    detect_appointment_with, detect_corporate_topic, detect_datetime, detect_greeting,
    detect_language, is_activation, is_near_me_query, is_office_hours_query, strip_wake_word,
    AppointmentIntent, DateTimeQuery, Language,
};
use crate::matcher::Query;
use crate::metrics;
use crate::notify;
use crate::reply::templates;
use crate::text::{extract_keywords, normalize, tokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Empty,
    Appointment,
    Activation,
    Greeting,
    NearMe,
    LanguageGate,
    OfficeHours,
    DateTime,
    Corporate,
    Corpus,
    Pharmacy,
    Llm,
    Fallback,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Empty => "empty",
            Stage::Appointment => "appointment",
            Stage::Activation => "activation",
            Stage::Greeting => "greeting",
            Stage::NearMe => "near_me",
            Stage::LanguageGate => "language_gate",
            Stage::OfficeHours => "office_hours",
            Stage::DateTime => "date_time",
            Stage::Corporate => "corporate",
            Stage::Corpus => "corpus",
            Stage::Pharmacy => "pharmacy",
            Stage::Llm => "llm",
            Stage::Fallback => "fallback",
        }
    }
}

const PIPELINE: [Stage; 11] = [
    Stage::Appointment,
    Stage::Activation,
    Stage::Greeting,
    Stage::NearMe,
    Stage::LanguageGate,
    Stage::OfficeHours,
    Stage::DateTime,
    Stage::Corporate,
    Stage::Corpus,
    Stage::Pharmacy,
    Stage::Llm,
];

const NEAREST_COUNT: usize = 3;

// Words that carry no place information in a pharmacy question.
const PHARMACY_FILLER: &[&str] = &[
    "farmacia", "farmacie", "otofarma", "convenzionata", "convenzionate", "dove", "trovo",
    "trovare", "trova", "trovami", "cerco", "cercare", "cerca", "vicina", "vicino", "zona",
    "indirizzo", "telefono", "numero", "citta",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl ChatRequest {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    pub stage: Stage,
}

/// One request, prepared once for every stage.
struct Turn<'a> {
    raw: &'a str,
    /// Normalized and spelling-corrected.
    corrected: String,
    /// `corrected` without a leading/trailing wake word.
    text: String,
    /// Normalized but not corrected, wake word stripped.
    plain: String,
    position: Option<(f64, f64)>,
}

impl Engine {
    pub async fn reply(&self, req: &ChatRequest) -> Reply {
        let started = Instant::now();
        let id = anon_hash(&req.message);
        let reply = self.run_pipeline(req, &id).await;

        metrics::record_reply(reply.stage.as_str());
        devlog::record_reply(reply.stage.as_str(), started.elapsed().as_millis());
        debug!(target: "dispatch", id = %id, stage = reply.stage.as_str(), "reply");
        reply
    }

    /// Text-only convenience around [`Engine::reply`].
    pub async fn reply_text(&self, message: &str) -> String {
        self.reply(&ChatRequest::text(message)).await.text
    }

    async fn run_pipeline(&self, req: &ChatRequest, id: &str) -> Reply {
        let raw = req.message.trim();
        let corrected = self.corrector.correct(raw);
        if raw.is_empty() || corrected.is_empty() {
            return Reply {
                text: templates::EMPTY_MESSAGE_REPLY.to_string(),
                stage: Stage::Empty,
            };
        }

        let text = strip_wake_word(&corrected);
        let plain = strip_wake_word(&normalize(raw));
        let turn = Turn {
            raw,
            corrected,
            text,
            plain,
            position: req.lat.zip(req.lon),
        };

        for stage in PIPELINE {
            match self.run_stage(stage, &turn).await {
                Ok(Some(text)) => return Reply { text, stage },
                Ok(None) => {}
                Err(e) => {
                    warn!(target: "dispatch", id = %id, stage = stage.as_str(), error = %e, "stage failed");
                    metrics::record_stage_error(stage.as_str());
                    if let Some(text) = self.degraded_reply(stage) {
                        return Reply { text, stage };
                    }
                }
            }
        }

        Reply {
            text: self.fallback_reply(),
            stage: Stage::Fallback,
        }
    }

    async fn run_stage(&self, stage: Stage, turn: &Turn<'_>) -> Result<Option<String>> {
        let a = &self.cfg.assistant;
        let t = turn.text.as_str();
        let reply = match stage {
            Stage::Appointment => {
                let details = extract_details(turn.raw, self.now().date_naive());
                match detect_appointment_with(&turn.corrected, &details) {
                    Some(intent) => Some(self.appointment(intent, details)?),
                    None => None,
                }
            }
            Stage::Activation => (is_activation(&turn.corrected) || is_activation(t))
                .then(|| self.with_rng(|rng| templates::introduction(a, rng))),
            Stage::Greeting => detect_greeting(t)
                .or_else(|| detect_greeting(&turn.plain))
                .map(|kind| self.with_rng(|rng| templates::greeting(kind, a, rng))),
            Stage::NearMe => is_near_me_query(t).then(|| self.nearest(turn.position)),
            Stage::LanguageGate => (detect_language(turn.raw) == Language::Other)
                .then(|| self.with_rng(|rng| templates::language_apology(a, rng))),
            Stage::OfficeHours => is_office_hours_query(t).then(|| {
                self.with_rng(|rng| templates::office_hours(a, &self.cfg.office_hours.summary, rng))
            }),
            Stage::DateTime => detect_datetime(t).map(|q| {
                let now = self.now();
                self.with_rng(|rng| match q {
                    DateTimeQuery::Time => templates::time_reply(now, rng),
                    DateTimeQuery::Date => templates::date_reply(now, rng),
                })
            }),
            Stage::Corporate => match detect_corporate_topic(t) {
                Some(topic) => self.with_rng(|rng| self.corporate.answer(topic, rng)),
                None => None,
            },
            Stage::Corpus => {
                let query = if t == turn.corrected {
                    Query::new(turn.raw, &turn.corrected)
                } else {
                    Query::plain(t)
                };
                self.matcher.find(&query).map(|hit| hit.answer)
            }
            Stage::Pharmacy => self
                .pharmacy_detector
                .is_pharmacy_question(t)
                .then(|| self.pharmacy(t)),
            Stage::Llm => self.llm.converse(turn.raw).await,
            Stage::Empty | Stage::Fallback => None,
        };
        Ok(reply)
    }

    fn degraded_reply(&self, stage: Stage) -> Option<String> {
        match stage {
            Stage::Appointment => Some(templates::appointment_store_unavailable(&self.cfg.assistant)),
            _ => None,
        }
    }

    fn nearest(&self, position: Option<(f64, f64)>) -> String {
        let Some((lat, lon)) = position else {
            return templates::ask_for_position();
        };
        let found = self.pharmacies.nearest(lat, lon, NEAREST_COUNT);
        if found.is_empty() {
            return templates::pharmacy_not_found(&self.cfg.assistant);
        }
        templates::nearest_pharmacies(&found)
    }

    fn pharmacy(&self, text: &str) -> String {
        if let Some(city) = self.pharmacies.city_in(text) {
            let found = self.pharmacies.in_city(city);
            return self.with_rng(|rng| templates::pharmacy_list(city, &found, rng));
        }

        let terms: Vec<&str> = tokens(text)
            .filter(|t| !PHARMACY_FILLER.contains(t))
            .collect();
        let terms = terms.join(" ");
        let found = self.pharmacies.search(&terms);
        if let Some(first) = found.first() {
            let place = first.city.clone();
            return self.with_rng(|rng| templates::pharmacy_list(&place, &found, rng));
        }
        if extract_keywords(&terms).is_empty() {
            templates::ask_for_city()
        } else {
            templates::pharmacy_not_found(&self.cfg.assistant)
        }
    }

    fn appointment(&self, intent: AppointmentIntent, details: AppointmentDetails) -> Result<String> {
        let today = self.now().date_naive();

        let mut missing = Vec::new();
        if details.name.is_none() {
            missing.push("il nome");
        }
        if details.phone.is_none() {
            missing.push("il numero di telefono");
        }
        if intent == AppointmentIntent::Book && details.date.is_none() {
            missing.push("la data");
        }
        if !missing.is_empty() {
            return Ok(templates::appointment_missing(&missing));
        }
        let (Some(name), Some(phone)) = (details.name, details.phone) else {
            return Ok(templates::appointment_missing(&missing));
        };

        match intent {
            AppointmentIntent::Check => {
                let found = self
                    .store
                    .find(Some(&name), Some(&phone))
                    .context("appointment lookup")?;
                Ok(match found {
                    Some(appt) => templates::appointment_found(&appt),
                    None => templates::appointment_not_found(&self.cfg.assistant),
                })
            }
            AppointmentIntent::Book => {
                let Some(date) = details.date else {
                    return Ok(templates::appointment_missing(&["la data"]));
                };
                if date < today {
                    return Ok(templates::appointment_past_date(date));
                }
                let appt = Appointment::new(&name, &phone, date, details.time);
                self.store.save(appt.clone()).context("saving appointment")?;
                let reply = self.with_rng(|rng| templates::appointment_confirmed(&appt, rng));
                notify::dispatch(self.notifier.clone(), appt);
                Ok(reply)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssistantConfig;
    use crate::corpus::{CorpusIndex, QaEntry};
    use crate::engine::EngineBuilder;

    fn engine() -> Engine {
        let corpus = CorpusIndex::new(vec![
            QaEntry::new(
                "Quanto costa un apparecchio acustico?",
                "Il prezzo dipende dal modello, chiedi in farmacia.",
            ),
            QaEntry::new("Dove si trova la sede di Otofarma?", "Siamo in Campania."),
        ]);
        EngineBuilder::new(AssistantConfig::default())
            .corpus(corpus)
            .seed(42)
            .build()
    }

    #[tokio::test]
    async fn empty_message_gets_prompt() {
        let r = engine().reply(&ChatRequest::text("   ")).await;
        assert_eq!(r.stage, Stage::Empty);
        assert_eq!(r.text, templates::EMPTY_MESSAGE_REPLY);
    }

    #[tokio::test]
    async fn wake_word_is_stripped_before_later_stages() {
        let r = engine().reply(&ChatRequest::text("OtoBot, che ore sono?")).await;
        assert_eq!(r.stage, Stage::DateTime);
    }

    #[tokio::test]
    async fn wake_word_alone_introduces() {
        let r = engine().reply(&ChatRequest::text("Hey OtoBot")).await;
        assert_eq!(r.stage, Stage::Activation);
        assert!(r.text.contains("OtoBot"));
    }

    #[tokio::test]
    async fn corpus_answer_beats_fallback() {
        let r = engine()
            .reply(&ChatRequest::text("quanto costa un apparecchio acustico"))
            .await;
        assert_eq!(r.stage, Stage::Corpus);
        assert!(r.text.starts_with("Il prezzo"));
    }

    #[tokio::test]
    async fn near_me_without_position_asks_for_it() {
        let r = engine()
            .reply(&ChatRequest::text("farmacia più vicina a me"))
            .await;
        assert_eq!(r.stage, Stage::NearMe);
        assert_eq!(r.text, templates::ask_for_position());
    }

    #[tokio::test]
    async fn unknown_question_falls_back() {
        let r = engine()
            .reply(&ChatRequest::text("qual è il senso della vita nell'universo"))
            .await;
        assert_eq!(r.stage, Stage::Fallback);
        assert!(!r.text.is_empty());
    }

    #[tokio::test]
    async fn booking_asks_for_missing_details() {
        let r = engine()
            .reply(&ChatRequest::text("vorrei prenotare un appuntamento"))
            .await;
        assert_eq!(r.stage, Stage::Appointment);
        assert!(r.text.contains("il nome"));
        assert!(r.text.contains("la data"));
    }
}
