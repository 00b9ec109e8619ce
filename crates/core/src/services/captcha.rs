//! Email verification codes.

use std::sync::Arc;

use chrono::{Duration, Utc};
use inkpost_common::{AppError, AppResult, Config, IdGenerator};
use inkpost_db::{entities::captcha, repositories::CaptchaRepository};
use rand::seq::SliceRandom;
use serde::Deserialize;
use validator::Validate;

use super::email::{EmailMessage, Mailer};

/// Characters a code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Subject line of verification mails.
pub const CAPTCHA_SUBJECT: &str = "Your Inkpost verification code";

/// Generate a code of [`captcha::CODE_LEN`] distinct characters.
#[must_use]
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    CODE_ALPHABET
        .choose_multiple(&mut rng, captcha::CODE_LEN)
        .map(|&b| char::from(b))
        .collect()
}

/// Input for requesting a code.
#[derive(Debug, Deserialize, Validate)]
pub struct IssueCaptchaInput {
    #[validate(email(message = "please enter a valid email address"))]
    pub email: String,
}

/// Captcha service.
#[derive(Clone)]
pub struct CaptchaService {
    captcha_repo: CaptchaRepository,
    mailer: Arc<dyn Mailer>,
    id_gen: IdGenerator,
    ttl: Duration,
}

impl CaptchaService {
    /// Create a new captcha service.
    #[must_use]
    pub fn new(captcha_repo: CaptchaRepository, mailer: Arc<dyn Mailer>, config: &Config) -> Self {
        Self {
            captcha_repo,
            mailer,
            id_gen: IdGenerator::new(),
            ttl: Duration::minutes(config.auth.captcha_ttl_minutes),
        }
    }

    /// Issue a fresh code for an email and mail it.
    ///
    /// The code is stored before sending, so a delivery failure leaves it in
    /// place for a retry with the same address.
    pub async fn issue(&self, input: IssueCaptchaInput) -> AppResult<()> {
        input.validate()?;
        let email = input.email.trim();

        let code = generate_code();
        self.captcha_repo
            .upsert(&self.id_gen.generate(), email, &code, Utc::now())
            .await?;

        let message = EmailMessage {
            to: email.to_string(),
            subject: CAPTCHA_SUBJECT.to_string(),
            body: format!("Your verification code is: {code}"),
        };

        if let Err(e) = self.mailer.send(message).await {
            tracing::error!(email = %email, error = %e, "Failed to send verification code");
            return Err(match e {
                AppError::ExternalService(_) => e,
                other => AppError::ExternalService(other.to_string()),
            });
        }

        tracing::info!(email = %email, "Verification code issued");
        Ok(())
    }

    /// Check `code` against the stored code for `email` and delete it.
    pub async fn consume(&self, email: &str, code: &str) -> AppResult<()> {
        let stored = self
            .captcha_repo
            .find_by_email(email)
            .await?
            .filter(|c| c.code.eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| {
                AppError::Validation("verification code is incorrect, please try again".to_string())
            })?;

        let age = Utc::now().signed_duration_since(stored.created_at);
        if age > self.ttl {
            self.captcha_repo.delete(&stored.id).await?;
            return Err(AppError::Validation(
                "verification code has expired, please request a new one".to_string(),
            ));
        }

        // A concurrent consume may have claimed the same row first
        if self.captcha_repo.delete(&stored.id).await? == 0 {
            tracing::debug!(email = %email, "Verification code already consumed");
            return Err(AppError::Validation(
                "verification code is incorrect, please try again".to_string(),
            ));
        }
        tracing::debug!(email = %email, "Verification code consumed");
        Ok(())
    }
}
