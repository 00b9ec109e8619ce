//! Blog category repository.

use std::sync::Arc;

use crate::entities::{BlogCategory, blog_category};
use crate::map_insert_err;
use inkpost_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Blog category repository for database operations.
#[derive(Clone)]
pub struct BlogCategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl BlogCategoryRepository {
    /// Create a new blog category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<blog_category::Model>> {
        BlogCategory::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<blog_category::Model>> {
        BlogCategory::find()
            .filter(blog_category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all categories ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<blog_category::Model>> {
        BlogCategory::find()
            .order_by_asc(blog_category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find categories by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<blog_category::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        BlogCategory::find()
            .filter(blog_category::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a category unless one with the same name exists.
    ///
    /// Returns the stored category and whether it was created.
    pub async fn ensure(&self, id: &str, name: &str) -> AppResult<(blog_category::Model, bool)> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok((existing, false));
        }

        let created = blog_category::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| map_insert_err(e, "category"))?;

        Ok((created, true))
    }
}
