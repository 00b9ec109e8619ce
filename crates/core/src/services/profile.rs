//! Profile and account settings.

use chrono::{DateTime, FixedOffset, Utc};
use inkpost_common::{AppError, AppResult};
use inkpost_db::{
    entities::{user, user_profile},
    repositories::{UserProfileRepository, UserRepository},
};
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::media::{MediaService, Upload};
use super::session::SessionService;
use super::user::{hash_password, verify_password};

const USERNAME_MIN: usize = 2;
const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 128;

/// What the settings page shows.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub avatar_url: String,
    pub date_joined: DateTime<FixedOffset>,
}

/// Partial settings update. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

/// Result of a settings update.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsChange {
    /// Names of the fields that were written
    pub changed: Vec<&'static str>,
    pub settings: SettingsView,
}

/// Input for changing the password.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Check the strength rules for a new password.
pub fn validate_new_password(new_password: &str, confirm_password: &str) -> AppResult<()> {
    if new_password != confirm_password {
        return Err(AppError::Validation(
            "the two new passwords do not match".to_string(),
        ));
    }

    let len = new_password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(AppError::Validation(format!(
            "password must be {PASSWORD_MIN} to {PASSWORD_MAX} characters"
        )));
    }

    let has_letter = new_password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = new_password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err(AppError::Validation(
            "password must contain at least one letter and one digit".to_string(),
        ));
    }

    Ok(())
}

fn normalize_bio(bio: &str) -> AppResult<String> {
    let bio = bio.trim();
    if bio.chars().count() > user_profile::MAX_BIO_LEN {
        return Err(AppError::Validation(format!(
            "bio must not exceed {} characters",
            user_profile::MAX_BIO_LEN
        )));
    }
    Ok(bio.to_string())
}

/// Profile service.
#[derive(Clone)]
pub struct ProfileService {
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    sessions: SessionService,
    media: MediaService,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        profile_repo: UserProfileRepository,
        sessions: SessionService,
        media: MediaService,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            sessions,
            media,
        }
    }

    fn view(&self, user: &user::Model, profile: &user_profile::Model) -> SettingsView {
        SettingsView {
            user_id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            bio: profile.bio.clone(),
            avatar_url: self.media.public_url(&profile.avatar),
            date_joined: user.created_at,
        }
    }

    /// Current settings of a user.
    pub async fn settings(&self, user: &user::Model) -> AppResult<SettingsView> {
        let profile = self.profile_repo.get_or_create(&user.id).await?;
        Ok(self.view(user, &profile))
    }

    /// Apply a field-by-field diff.
    ///
    /// Only fields that are present and differ from the stored value are
    /// validated and written. Sending the current values is a successful
    /// no-op.
    pub async fn update_settings(
        &self,
        user: &user::Model,
        input: SettingsUpdate,
    ) -> AppResult<SettingsChange> {
        let profile = self.profile_repo.get_or_create(&user.id).await?;
        let mut changed = Vec::new();

        let username = input
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| *u != user.username);
        if let Some(username) = &username {
            let len = username.chars().count();
            if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
                return Err(AppError::Validation(format!(
                    "username must be {USERNAME_MIN} to {USERNAME_MAX} characters"
                )));
            }
            if self.user_repo.username_taken(username, Some(&user.id)).await? {
                return Err(AppError::Conflict("username already taken".to_string()));
            }
            changed.push("username");
        }

        let email = input
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| *e != user.email);
        if let Some(email) = &email {
            if !email.validate_email() {
                return Err(AppError::Validation(
                    "please enter a valid email address".to_string(),
                ));
            }
            if self.user_repo.email_taken(email, Some(&user.id)).await? {
                return Err(AppError::Conflict(
                    "this email is already in use".to_string(),
                ));
            }
            changed.push("email");
        }

        let bio = match input.bio {
            Some(bio) => Some(normalize_bio(&bio)?).filter(|b| *b != profile.bio),
            None => None,
        };
        if bio.is_some() {
            changed.push("bio");
        }

        let now = Utc::now().into();

        let user = if username.is_some() || email.is_some() {
            let mut active = user.clone().into_active_model();
            if let Some(username) = username {
                active.username = Set(username);
            }
            if let Some(email) = email {
                active.email = Set(email);
            }
            active.updated_at = Set(Some(now));
            self.user_repo.update(active).await?
        } else {
            user.clone()
        };

        let profile = if let Some(bio) = bio {
            let mut active = profile.into_active_model();
            active.bio = Set(bio);
            active.updated_at = Set(Some(now));
            self.profile_repo.update(active).await?
        } else {
            profile
        };

        if !changed.is_empty() {
            tracing::info!(user_id = %user.id, changed = ?changed, "Settings updated");
        }

        Ok(SettingsChange {
            changed,
            settings: self.view(&user, &profile),
        })
    }

    /// Replace the avatar. Returns the new public URL.
    ///
    /// The new file is written and the profile saved before the old file is
    /// removed, so a failure never leaves the profile pointing at nothing.
    pub async fn upload_avatar(&self, user: &user::Model, upload: &Upload) -> AppResult<String> {
        let stored = self.media.store_avatar(upload).await?;
        let profile = self.profile_repo.get_or_create(&user.id).await?;
        let old = (!profile.has_default_avatar()).then(|| profile.avatar.clone());

        let mut active = profile.into_active_model();
        active.avatar = Set(stored.key.clone());
        active.updated_at = Set(Some(Utc::now().into()));

        if let Err(e) = self.profile_repo.update(active).await {
            if let Err(cleanup) = self.media.delete(&stored.key).await {
                tracing::warn!(key = %stored.key, error = %cleanup, "Failed to remove unused avatar");
            }
            return Err(e);
        }

        if let Some(old) = old {
            if let Err(e) = self.media.delete(&old).await {
                tracing::warn!(key = %old, error = %e, "Failed to delete old avatar");
            }
        }

        tracing::info!(user_id = %user.id, key = %stored.key, "Avatar updated");
        Ok(stored.url)
    }

    /// Replace the bio. Returns the stored value.
    pub async fn update_bio(&self, user: &user::Model, bio: &str) -> AppResult<String> {
        let bio = normalize_bio(bio)?;
        let profile = self.profile_repo.get_or_create(&user.id).await?;

        let mut active = profile.into_active_model();
        active.bio = Set(bio);
        active.updated_at = Set(Some(Utc::now().into()));
        let profile = self.profile_repo.update(active).await?;

        Ok(profile.bio)
    }

    /// Change the password, keeping only the current session alive.
    pub async fn change_password(
        &self,
        user: &user::Model,
        current_session: &str,
        input: &ChangePasswordInput,
    ) -> AppResult<()> {
        if !verify_password(&input.current_password, &user.password)? {
            return Err(AppError::Validation(
                "current password is incorrect".to_string(),
            ));
        }

        validate_new_password(&input.new_password, &input.confirm_password)?;

        let mut active = user.clone().into_active_model();
        active.password = Set(hash_password(&input.new_password)?);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        self.sessions.revoke_others(&user.id, current_session).await?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }
}
