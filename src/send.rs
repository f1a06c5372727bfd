// src/send.rs
//! Delivery of the rendered digest over an authenticated STARTTLS relay.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::info;

use crate::config::Settings;

const PLAIN_FALLBACK: &str = "Your email client does not support HTML. \
Please view this email in a client that supports HTML.";

pub struct Mailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl Mailer {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let creds = Credentials::new(settings.smtp_user.clone(), settings.smtp_pass.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
            .with_context(|| format!("invalid SMTP host {}", settings.smtp_host))?
            .credentials(creds)
            .build();

        let from = format!("Daily News Digest <{}>", settings.smtp_user)
            .parse()
            .context("invalid sender address")?;
        let to = settings
            .recipient_email
            .parse()
            .context("invalid recipient address")?;

        Ok(Self { mailer, from, to })
    }

    /// Send the digest. One message per run, HTML with a plain-text fallback.
    pub async fn send_digest(&self, html_body: String, date: DateTime<Utc>) -> Result<()> {
        let subject = format!("Daily News Digest - {}", date.format("%A, %d %B %Y"));

        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                PLAIN_FALLBACK.to_string(),
                html_body,
            ))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        info!(to = %self.to, "digest email sent");
        Ok(())
    }
}
