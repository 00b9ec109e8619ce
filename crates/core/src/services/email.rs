//! Outbound email.
//!
//! Verification codes are the only mail the platform sends. Delivery goes
//! through the [`Mailer`] trait so tests and unconfigured deployments can
//! swap the SMTP transport out.

use std::sync::Arc;

use async_trait::async_trait;
use inkpost_common::{AppError, AppResult, config::EmailConfig};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Something that can deliver an [`EmailMessage`].
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message. Failures are reported, never retried.
    async fn send(&self, message: EmailMessage) -> AppResult<()>;
}

/// SMTP delivery via lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a transport from the `email` config section.
    pub fn from_config(config: &EmailConfig) -> AppResult<Self> {
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        }
        .map_err(|e| AppError::Config(format!("Invalid SMTP host: {e}")))?
        .port(config.smtp_port);

        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(user), Some(pass)) => {
                builder.credentials(Credentials::new(user.clone(), pass.clone()))
            }
            _ => builder,
        };

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Config(format!("Invalid sender address: {e}")))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Validation(format!("Invalid recipient address: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to send email: {e}")))?;

        tracing::debug!(to = %message.to, "Email sent via SMTP");
        Ok(())
    }
}

/// Mailer used when SMTP is not configured: logs instead of sending.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "SMTP not configured, email logged instead of sent"
        );
        Ok(())
    }
}

/// Pick the mailer for a deployment.
pub fn mailer_from_config(config: Option<&EmailConfig>) -> AppResult<Arc<dyn Mailer>> {
    match config {
        Some(email) => Ok(Arc::new(SmtpMailer::from_config(email)?)),
        None => {
            tracing::warn!("No [email] section configured, verification codes will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}
