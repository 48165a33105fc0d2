// src/notify/mod.rs
//! Appointment notifications. Delivery is fire-and-forget: failures are
//! logged and never reach the user-facing reply.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::appointments::Appointment;
use crate::debug::anon_hash;

pub mod email;
pub mod webhook;

pub use email::EmailNotifier;
pub use webhook::WebhookNotifier;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, appt: &Appointment) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Writes a log line instead of delivering anywhere.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, appt: &Appointment) -> Result<()> {
        info!(
            target: "notify",
            id = %anon_hash(&format!("{}|{}", appt.name, appt.phone)),
            date = %appt.date,
            "appointment booked"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// E-mail when SMTP is configured, else a webhook when `NOTIFY_WEBHOOK_URL` is set, else the log.
pub fn notifier_from_env() -> Arc<dyn Notifier> {
    if let Some(mail) = EmailNotifier::from_env() {
        return Arc::new(mail);
    }
    if let Some(hook) = WebhookNotifier::from_env() {
        return Arc::new(hook);
    }
    Arc::new(LogNotifier)
}

/// Spawn delivery on the current runtime; without one, deliver nothing and log.
pub fn dispatch(notifier: Arc<dyn Notifier>, appt: Appointment) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(e) = notifier.send(&appt).await {
                    warn!(target: "notify", notifier = notifier.name(), error = %e, "notification failed");
                }
            });
        }
        Err(_) => warn!(target: "notify", "no async runtime, notification dropped"),
    }
}
