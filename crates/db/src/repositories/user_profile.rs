//! User profile repository.

use std::sync::Arc;

use crate::entities::{UserProfile, user_profile};
use chrono::Utc;
use inkpost_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// User profile repository for database operations.
#[derive(Clone)]
pub struct UserProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl UserProfileRepository {
    /// Create a new user profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user profile by user ID.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<user_profile::Model>> {
        UserProfile::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user profile.
    pub async fn create(&self, model: user_profile::ActiveModel) -> AppResult<user_profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Return the profile for a user, creating an empty one when missing.
    pub async fn get_or_create(&self, user_id: &str) -> AppResult<user_profile::Model> {
        if let Some(profile) = self.find_by_user_id(user_id).await? {
            return Ok(profile);
        }

        self.create(user_profile::ActiveModel {
            user_id: Set(user_id.to_string()),
            avatar: Set(user_profile::DEFAULT_AVATAR.to_string()),
            bio: Set(String::new()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        })
        .await
    }

    /// Update a user profile.
    pub async fn update(&self, model: user_profile::ActiveModel) -> AppResult<user_profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_profile(user_id: &str) -> user_profile::Model {
        user_profile::Model {
            user_id: user_id.to_string(),
            avatar: user_profile::DEFAULT_AVATAR.to_string(),
            bio: String::new(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_or_create_existing() {
        let profile = create_test_profile("u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let result = repo.get_or_create("u1").await.unwrap();

        assert_eq!(result, profile);
    }

    #[tokio::test]
    async fn test_get_or_create_missing_inserts_default() {
        let profile = create_test_profile("u2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_profile::Model>::new()])
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let result = repo.get_or_create("u2").await.unwrap();

        assert!(result.has_default_avatar());
        assert_eq!(result.bio, "");
    }
}
