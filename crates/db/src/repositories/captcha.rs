//! Captcha repository.

use std::sync::Arc;

use crate::entities::{Captcha, captcha};
use chrono::{DateTime, Utc};
use inkpost_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};

/// Captcha repository for database operations.
#[derive(Clone)]
pub struct CaptchaRepository {
    db: Arc<DatabaseConnection>,
}

impl CaptchaRepository {
    /// Create a new captcha repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the pending code for an email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<captcha::Model>> {
        Captcha::find()
            .filter(captcha::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a code for an email, replacing any previous one.
    ///
    /// `new_id` is only used when no row exists yet. The creation time is
    /// reset either way.
    pub async fn upsert(
        &self,
        new_id: &str,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<captcha::Model> {
        let result = match self.find_by_email(email).await? {
            Some(existing) => {
                let mut active = existing.into_active_model();
                active.code = Set(code.to_string());
                active.created_at = Set(now.into());
                active.update(self.db.as_ref()).await
            }
            None => {
                captcha::ActiveModel {
                    id: Set(new_id.to_string()),
                    email: Set(email.to_string()),
                    code: Set(code.to_string()),
                    created_at: Set(now.into()),
                }
                .insert(self.db.as_ref())
                .await
            }
        };

        result.map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a captcha row, returning how many rows went away.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = Captcha::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
