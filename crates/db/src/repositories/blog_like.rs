//! Blog like repository.

use std::sync::Arc;

use crate::entities::{BlogLike, blog_like};
use crate::map_insert_err;
use inkpost_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// Repository over the (user, blog) like join table.
#[derive(Clone)]
pub struct BlogLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl BlogLikeRepository {
    /// Create a new blog like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the like a user left on a blog.
    pub async fn find_by_user_and_target(
        &self,
        user_id: &str,
        blog_id: &str,
    ) -> AppResult<Option<blog_like::Model>> {
        BlogLike::find()
            .filter(blog_like::Column::UserId.eq(user_id))
            .filter(blog_like::Column::BlogId.eq(blog_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a like.
    pub async fn create(&self, model: blog_like::ActiveModel) -> AppResult<blog_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_insert_err(e, "like"))
    }

    /// Delete a like by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        BlogLike::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count likes on a blog.
    pub async fn count_by_target(&self, blog_id: &str) -> AppResult<u64> {
        BlogLike::find()
            .filter(blog_like::Column::BlogId.eq(blog_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a user likes a blog.
    pub async fn has_liked(&self, user_id: &str, blog_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_target(user_id, blog_id)
            .await?
            .is_some())
    }
}
