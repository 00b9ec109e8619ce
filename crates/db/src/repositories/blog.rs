//! Blog repository.

use std::sync::Arc;

use crate::entities::{Blog, blog};
use inkpost_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
    sea_query::{Expr, Func},
};

/// Blog repository for database operations.
#[derive(Clone)]
pub struct BlogRepository {
    db: Arc<DatabaseConnection>,
}

/// Build a `LIKE` pattern matching `keyword` anywhere, lowercased, with
/// wildcard characters escaped.
#[must_use]
pub fn contains_pattern(keyword: &str) -> String {
    let escaped = keyword
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn search_query(keyword: &str) -> Select<Blog> {
    let mut query = Blog::find();

    if !keyword.is_empty() {
        let pattern = contains_pattern(keyword);
        query = query.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(blog::Column::Title))).like(&pattern))
                .add(Expr::expr(Func::lower(Expr::col(blog::Column::Content))).like(&pattern)),
        );
    }

    query
        .order_by_desc(blog::Column::CreatedAt)
        .order_by_desc(blog::Column::Id)
}

impl BlogRepository {
    /// Create a new blog repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a blog by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<blog::Model>> {
        Blog::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a blog by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<blog::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("blog {id}")))
    }

    /// Create a new blog.
    pub async fn create(&self, model: blog::ActiveModel) -> AppResult<blog::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List blogs, newest first.
    pub async fn find_newest(&self, limit: u64, offset: u64) -> AppResult<Vec<blog::Model>> {
        Blog::find()
            .order_by_desc(blog::Column::CreatedAt)
            .order_by_desc(blog::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Case-insensitive substring search over title and content, newest first.
    ///
    /// An empty keyword matches every blog.
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<blog::Model>> {
        search_query(keyword)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the view counter atomically (single UPDATE query, no fetch).
    pub async fn increment_views_count(&self, blog_id: &str) -> AppResult<()> {
        Blog::update_many()
            .col_expr(
                blog::Column::ViewsCount,
                Expr::col(blog::Column::ViewsCount).add(1),
            )
            .filter(blog::Column::Id.eq(blog_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Overwrite the like counter with a freshly counted value.
    pub async fn set_likes_count(&self, blog_id: &str, likes_count: i32) -> AppResult<()> {
        Blog::update_many()
            .col_expr(blog::Column::LikesCount, Expr::value(likes_count))
            .filter(blog::Column::Id.eq(blog_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};

    fn create_test_blog(id: &str, title: &str) -> blog::Model {
        blog::Model {
            id: id.to_string(),
            title: title.to_string(),
            content: "<p>body</p>".to_string(),
            category_id: "cat1".to_string(),
            author_id: "u1".to_string(),
            views_count: 0,
            likes_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Rust"), "%rust%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<blog::Model>::new()])
                .into_connection(),
        );

        let repo = BlogRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_search_query_matches_title_or_content_lowercased() {
        let sql = search_query("RUST").build(DatabaseBackend::Postgres).to_string();

        assert!(sql.contains(r#"LOWER("title")"#));
        assert!(sql.contains(r#"LOWER("content")"#));
        assert!(sql.contains("LIKE '%rust%'"));
        assert!(sql.contains(" OR "));
        assert!(sql.contains(r#"ORDER BY "blog"."created_at" DESC"#));
    }

    #[test]
    fn test_search_query_empty_keyword_has_no_filter() {
        let sql = search_query("").build(DatabaseBackend::Postgres).to_string();

        assert!(!sql.contains("WHERE"));
        assert!(sql.contains(r#"ORDER BY "blog"."created_at" DESC"#));
    }

    #[tokio::test]
    async fn test_search_returns_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_blog("b2", "Newer"),
                    create_test_blog("b1", "Older"),
                ]])
                .into_connection(),
        );

        let repo = BlogRepository::new(db);
        let found = repo.search("").await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "b2");
    }

    #[tokio::test]
    async fn test_increment_views_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = BlogRepository::new(db);
        assert!(repo.increment_views_count("b1").await.is_ok());
    }
}
