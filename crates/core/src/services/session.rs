//! Login sessions backing the session cookie.

use chrono::{DateTime, Duration, Utc};
use inkpost_common::{AppResult, Config, IdGenerator};
use inkpost_db::{
    entities::{session, user},
    repositories::{SessionRepository, UserRepository},
};
use sea_orm::Set;

/// How long a "remember me" login lasts.
pub const REMEMBER_DAYS: i64 = 7;

/// A freshly started session.
#[derive(Debug, Clone)]
pub struct StartedSession {
    /// Token to put in the cookie
    pub token: String,
    /// Server-side expiry
    pub expires_at: DateTime<Utc>,
    /// Cookie `Max-Age`; `None` means a browser-session cookie
    pub max_age: Option<Duration>,
}

/// Session service.
#[derive(Clone)]
pub struct SessionService {
    session_repo: SessionRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
    browser_session_ttl: Duration,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub fn new(session_repo: SessionRepository, user_repo: UserRepository, config: &Config) -> Self {
        Self {
            session_repo,
            user_repo,
            id_gen: IdGenerator::new(),
            browser_session_ttl: Duration::hours(config.auth.session_ttl_hours),
        }
    }

    /// Start a session for a user.
    pub async fn start(&self, user_id: &str, remember: bool) -> AppResult<StartedSession> {
        let now = Utc::now();
        let (expires_at, max_age) = if remember {
            let ttl = Duration::days(REMEMBER_DAYS);
            (now + ttl, Some(ttl))
        } else {
            (now + self.browser_session_ttl, None)
        };

        let token = self.id_gen.generate_token();
        self.session_repo
            .create(session::ActiveModel {
                id: Set(token.clone()),
                user_id: Set(user_id.to_string()),
                remember: Set(remember),
                expires_at: Set(expires_at.into()),
                created_at: Set(now.into()),
            })
            .await?;

        tracing::info!(user_id = %user_id, remember, "Session started");
        Ok(StartedSession {
            token,
            expires_at,
            max_age,
        })
    }

    /// Resolve a token to its user. Expired sessions are deleted on sight.
    pub async fn resolve(&self, token: &str) -> AppResult<Option<user::Model>> {
        let Some(session) = self.session_repo.find_by_id(token).await? else {
            return Ok(None);
        };

        if session.expires_at <= Utc::now() {
            self.session_repo.delete(&session.id).await?;
            tracing::debug!(user_id = %session.user_id, "Expired session removed");
            return Ok(None);
        }

        self.user_repo.find_by_id(&session.user_id).await
    }

    /// End a session (logout).
    pub async fn end(&self, token: &str) -> AppResult<()> {
        self.session_repo.delete(token).await
    }

    /// Revoke every other session of a user, keeping `current_token`.
    pub async fn revoke_others(&self, user_id: &str, current_token: &str) -> AppResult<u64> {
        let removed = self
            .session_repo
            .delete_for_user_except(user_id, current_token)
            .await?;
        if removed > 0 {
            tracing::info!(user_id = %user_id, removed, "Other sessions revoked");
        }
        Ok(removed)
    }

    /// Delete all expired sessions.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        self.session_repo.delete_expired(Utc::now()).await
    }
}
