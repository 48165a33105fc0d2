// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::warn;

use super::Notifier;
use crate::appointments::Appointment;

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// Needs SMTP_HOST, SMTP_USER, SMTP_PASS, NOTIFY_EMAIL_FROM, NOTIFY_EMAIL_TO.
    /// Returns `None` when any of them is missing or invalid.
    pub fn from_env() -> Option<Self> {
        let var = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        let host = var("SMTP_HOST")?;
        let user = var("SMTP_USER")?;
        let pass = var("SMTP_PASS")?;
        let from_addr = var("NOTIFY_EMAIL_FROM")?;
        let to_addr = var("NOTIFY_EMAIL_TO")?;

        let mailer = match AsyncSmtpTransport::<Tokio1Executor>::relay(&host) {
            Ok(b) => b.credentials(Credentials::new(user, pass)).build(),
            Err(e) => {
                warn!(error = %e, "invalid SMTP_HOST, e-mail notifications disabled");
                return None;
            }
        };
        let (Ok(from), Ok(to)) = (from_addr.parse::<Mailbox>(), to_addr.parse::<Mailbox>()) else {
            warn!("invalid NOTIFY_EMAIL_FROM/TO, e-mail notifications disabled");
            return None;
        };

        Some(Self { mailer, from, to })
    }
}

pub(crate) fn render_body(appt: &Appointment) -> String {
    let time = appt
        .time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "da concordare".into());
    format!(
        "Nuovo appuntamento\nNome: {}\nTelefono: {}\nData: {}\nOra: {}\nRegistrato: {}\n",
        appt.name,
        appt.phone,
        appt.date.format("%d/%m/%Y"),
        time,
        appt.created_at.to_rfc3339()
    )
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, appt: &Appointment) -> Result<()> {
        let subject = format!("Nuovo appuntamento: {}", appt.date.format("%d/%m/%Y"));
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(render_body(appt))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
