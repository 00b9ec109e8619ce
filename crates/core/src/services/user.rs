//! Account service: registration and credential checks.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use inkpost_common::{AppError, AppResult, IdGenerator};
use inkpost_db::{
    entities::{user, user_profile},
    repositories::{UserProfileRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::captcha::CaptchaService;

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 2, max = 20, message = "username must be 2 to 20 characters"))]
    pub username: String,

    #[validate(length(min = 2, max = 20, message = "password must be 2 to 20 characters"))]
    pub password: String,

    #[validate(email(message = "please enter a valid email address"))]
    pub email: String,

    #[validate(length(equal = 6, message = "verification code must be 6 characters"))]
    pub captcha: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email(message = "please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 2, max = 20, message = "password must be 2 to 20 characters"))]
    pub password: String,

    #[serde(default)]
    pub remember: bool,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    captcha: CaptchaService,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        profile_repo: UserProfileRepository,
        captcha: CaptchaService,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            captcha,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account, consuming the emailed verification code.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        let input = RegisterInput {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
            ..input
        };
        input.validate()?;
        let email = input.email.as_str();
        let username = input.username.as_str();

        if self.user_repo.email_taken(email, None).await? {
            return Err(AppError::Conflict(
                "this email is already registered, please log in".to_string(),
            ));
        }

        if self.user_repo.username_taken(username, None).await? {
            return Err(AppError::Conflict("username already taken".to_string()));
        }

        self.captcha.consume(email, &input.captcha).await?;

        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();
        let now = Utc::now().into();

        let user = self
            .user_repo
            .create(user::ActiveModel {
                id: Set(user_id.clone()),
                username: Set(username.to_string()),
                email: Set(email.to_string()),
                password: Set(password_hash),
                created_at: Set(now),
                updated_at: Set(None),
            })
            .await?;

        self.profile_repo
            .create(user_profile::ActiveModel {
                user_id: Set(user_id),
                avatar: Set(user_profile::DEFAULT_AVATAR.to_string()),
                bio: Set(String::new()),
                created_at: Set(now),
                updated_at: Set(None),
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check email and password.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, input: &LoginInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(input.email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }
}

/// Hash a password with Argon2.
pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
