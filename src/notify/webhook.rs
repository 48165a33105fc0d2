// src/notify/webhook.rs
use anyhow::{Context, Result};
use reqwest::Client;

use super::Notifier;
use crate::appointments::Appointment;

/// Posts `{"text": …}` to a chat webhook (Slack-compatible).
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn from_env() -> Option<Self> {
        std::env::var("NOTIFY_WEBHOOK_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .map(Self::new)
    }

    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, appt: &Appointment) -> Result<()> {
        let time = appt
            .time
            .map(|t| t.format(" alle %H:%M").to_string())
            .unwrap_or_default();
        let text = format!(
            "*Nuovo appuntamento* {}{}\n{} ({})",
            appt.date.format("%d/%m/%Y"),
            time,
            appt.name,
            appt.phone
        );
        let body = serde_json::json!({ "text": text });

        self.client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .context("webhook post")?
            .error_for_status()
            .context("webhook non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
