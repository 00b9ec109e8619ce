//! Blog comment repository.

use std::sync::Arc;

use crate::entities::{BlogComment, blog_comment};
use inkpost_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

/// Blog comment repository for database operations.
#[derive(Clone)]
pub struct BlogCommentRepository {
    db: Arc<DatabaseConnection>,
}

impl BlogCommentRepository {
    /// Create a new blog comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<blog_comment::Model>> {
        BlogComment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<blog_comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {id}")))
    }

    /// Create a new comment. Reply flags are derived on save.
    pub async fn create(&self, model: blog_comment::ActiveModel) -> AppResult<blog_comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every comment on a blog, newest first. Replies included.
    pub async fn find_by_blog(&self, blog_id: &str) -> AppResult<Vec<blog_comment::Model>> {
        BlogComment::find()
            .filter(blog_comment::Column::BlogId.eq(blog_id))
            .order_by_desc(blog_comment::Column::CreatedAt)
            .order_by_desc(blog_comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite the like counter with a freshly counted value.
    pub async fn set_likes_count(&self, comment_id: &str, likes_count: i32) -> AppResult<()> {
        BlogComment::update_many()
            .col_expr(blog_comment::Column::LikesCount, Expr::value(likes_count))
            .filter(blog_comment::Column::Id.eq(comment_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
