//! Like toggling for blogs and comments.

use chrono::Utc;
use inkpost_common::{AppResult, IdGenerator};
use inkpost_db::{
    entities::{blog_like, comment_like, user},
    repositories::{BlogCommentRepository, BlogLikeRepository, BlogRepository, CommentLikeRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Like state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: i32,
}

/// Like service.
#[derive(Clone)]
pub struct LikeService {
    blog_repo: BlogRepository,
    comment_repo: BlogCommentRepository,
    blog_like_repo: BlogLikeRepository,
    comment_like_repo: CommentLikeRepository,
    id_gen: IdGenerator,
}

fn to_count(count: u64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        blog_repo: BlogRepository,
        comment_repo: BlogCommentRepository,
        blog_like_repo: BlogLikeRepository,
        comment_like_repo: CommentLikeRepository,
    ) -> Self {
        Self {
            blog_repo,
            comment_repo,
            blog_like_repo,
            comment_like_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a blog, or take the like back if it is already there.
    pub async fn toggle_blog_like(&self, user: &user::Model, blog_id: &str) -> AppResult<LikeToggle> {
        let blog = self.blog_repo.get_by_id(blog_id).await?;

        let liked = match self
            .blog_like_repo
            .find_by_user_and_target(&user.id, &blog.id)
            .await?
        {
            Some(existing) => {
                self.blog_like_repo.delete(&existing.id).await?;
                false
            }
            None => {
                self.blog_like_repo
                    .create(blog_like::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        user_id: Set(user.id.clone()),
                        blog_id: Set(blog.id.clone()),
                        created_at: Set(Utc::now().into()),
                    })
                    .await?;
                true
            }
        };

        let likes_count = to_count(self.blog_like_repo.count_by_target(&blog.id).await?);
        self.blog_repo.set_likes_count(&blog.id, likes_count).await?;

        tracing::debug!(blog_id = %blog.id, user_id = %user.id, liked, likes_count, "Blog like toggled");
        Ok(LikeToggle { liked, likes_count })
    }

    /// Like a comment, or take the like back if it is already there.
    pub async fn toggle_comment_like(
        &self,
        user: &user::Model,
        comment_id: &str,
    ) -> AppResult<LikeToggle> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        let liked = match self
            .comment_like_repo
            .find_by_user_and_target(&user.id, &comment.id)
            .await?
        {
            Some(existing) => {
                self.comment_like_repo.delete(&existing.id).await?;
                false
            }
            None => {
                self.comment_like_repo
                    .create(comment_like::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        user_id: Set(user.id.clone()),
                        comment_id: Set(comment.id.clone()),
                        created_at: Set(Utc::now().into()),
                    })
                    .await?;
                true
            }
        };

        let likes_count = to_count(self.comment_like_repo.count_by_target(&comment.id).await?);
        self.comment_repo
            .set_likes_count(&comment.id, likes_count)
            .await?;

        tracing::debug!(comment_id = %comment.id, user_id = %user.id, liked, likes_count, "Comment like toggled");
        Ok(LikeToggle { liked, likes_count })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inkpost_common::AppError;
    use inkpost_db::entities::{blog, blog_comment};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user() -> user::Model {
        user::Model {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hash".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_blog() -> blog::Model {
        blog::Model {
            id: "b1".to_string(),
            title: "Title".to_string(),
            content: "body".to_string(),
            category_id: "cat1".to_string(),
            author_id: "u2".to_string(),
            views_count: 0,
            likes_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_comment() -> blog_comment::Model {
        blog_comment::Model {
            id: "c1".to_string(),
            content: "hi".to_string(),
            blog_id: "b1".to_string(),
            author_id: "u2".to_string(),
            parent_comment_id: None,
            is_reply: false,
            reply_id: None,
            likes_count: 1,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn blog_like() -> blog_like::Model {
        blog_like::Model {
            id: "l1".to_string(),
            user_id: "u1".to_string(),
            blog_id: "b1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn service(
        blog: MockDatabase,
        comment: MockDatabase,
        blog_like: MockDatabase,
        comment_like: MockDatabase,
    ) -> LikeService {
        LikeService::new(
            BlogRepository::new(Arc::new(blog.into_connection())),
            BlogCommentRepository::new(Arc::new(comment.into_connection())),
            BlogLikeRepository::new(Arc::new(blog_like.into_connection())),
            CommentLikeRepository::new(Arc::new(comment_like.into_connection())),
        )
    }

    fn empty() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    #[tokio::test]
    async fn test_toggle_blog_like_adds() {
        let blog = empty()
            .append_query_results([[create_test_blog()]])
            .append_exec_results([exec_ok()]);
        let likes = empty()
            .append_query_results([Vec::<blog_like::Model>::new()])
            .append_query_results([[blog_like()]])
            .append_query_results([[count_row(1)]]);

        let svc = service(blog, empty(), likes, empty());
        let state = svc.toggle_blog_like(&create_test_user(), "b1").await.unwrap();

        assert_eq!(
            state,
            LikeToggle {
                liked: true,
                likes_count: 1
            }
        );
    }

    #[tokio::test]
    async fn test_toggle_blog_like_twice_restores_state() {
        let blog = empty()
            .append_query_results([[create_test_blog()], [create_test_blog()]])
            .append_exec_results([exec_ok(), exec_ok()]);
        let likes = empty()
            .append_query_results([Vec::<blog_like::Model>::new()])
            .append_query_results([[blog_like()]])
            .append_query_results([[count_row(1)]])
            .append_query_results([[blog_like()]])
            .append_exec_results([exec_ok()])
            .append_query_results([[count_row(0)]]);

        let svc = service(blog, empty(), likes, empty());
        let user = create_test_user();

        let first = svc.toggle_blog_like(&user, "b1").await.unwrap();
        let second = svc.toggle_blog_like(&user, "b1").await.unwrap();

        assert_eq!(
            first,
            LikeToggle {
                liked: true,
                likes_count: 1
            }
        );
        assert_eq!(
            second,
            LikeToggle {
                liked: false,
                likes_count: 0
            }
        );
    }

    #[tokio::test]
    async fn test_toggle_blog_like_removes() {
        let blog = empty()
            .append_query_results([[create_test_blog()]])
            .append_exec_results([exec_ok()]);
        let likes = empty()
            .append_query_results([[blog_like()]])
            .append_exec_results([exec_ok()])
            .append_query_results([[count_row(0)]]);

        let svc = service(blog, empty(), likes, empty());
        let state = svc.toggle_blog_like(&create_test_user(), "b1").await.unwrap();

        assert!(!state.liked);
        assert_eq!(state.likes_count, 0);
    }

    #[tokio::test]
    async fn test_toggle_blog_like_missing_blog() {
        let blog = empty().append_query_results([Vec::<blog::Model>::new()]);

        let svc = service(blog, empty(), empty(), empty());
        let result = svc.toggle_blog_like(&create_test_user(), "nope").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_comment_like_counts_other_users() {
        let comment = empty()
            .append_query_results([[create_test_comment()]])
            .append_exec_results([exec_ok()]);
        let likes = empty()
            .append_query_results([Vec::<comment_like::Model>::new()])
            .append_query_results([[comment_like::Model {
                id: "l2".to_string(),
                user_id: "u1".to_string(),
                comment_id: "c1".to_string(),
                created_at: Utc::now().into(),
            }]])
            .append_query_results([[count_row(2)]]);

        let svc = service(empty(), comment, empty(), likes);
        let state = svc
            .toggle_comment_like(&create_test_user(), "c1")
            .await
            .unwrap();

        assert!(state.liked);
        assert_eq!(state.likes_count, 2);
    }

    #[test]
    fn test_to_count_saturates() {
        assert_eq!(to_count(3), 3);
        assert_eq!(to_count(u64::MAX), i32::MAX);
    }
}
