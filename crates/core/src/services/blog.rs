//! Blog publishing, listing and search.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use inkpost_common::{AppError, AppResult, IdGenerator};
use inkpost_db::{
    entities::{blog, blog_category, user},
    repositories::{BlogCategoryRepository, BlogLikeRepository, BlogRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default page size of the index.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Largest page the index serves.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Input for publishing a blog.
#[derive(Debug, Deserialize, Validate)]
pub struct PublishInput {
    #[validate(length(min = 1, max = 100, message = "title must be 1 to 100 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,

    #[validate(length(min = 1, message = "please choose a category"))]
    pub category_id: String,
}

/// Author shown next to a blog or comment.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorRef {
    pub id: String,
    pub username: String,
}

/// Category shown next to a blog.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

/// A blog with its author and category resolved.
#[derive(Debug, Clone, Serialize)]
pub struct BlogSummary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Option<CategoryRef>,
    pub author: Option<AuthorRef>,
    pub views_count: i32,
    pub likes_count: i32,
    pub created_at: DateTime<FixedOffset>,
}

/// A blog as shown on its own page.
#[derive(Debug, Clone, Serialize)]
pub struct BlogDetail {
    #[serde(flatten)]
    pub blog: BlogSummary,
    /// Whether the viewer likes this blog (false for anonymous viewers)
    pub liked: bool,
}

/// Blog service.
#[derive(Clone)]
pub struct BlogService {
    blog_repo: BlogRepository,
    category_repo: BlogCategoryRepository,
    user_repo: UserRepository,
    like_repo: BlogLikeRepository,
    id_gen: IdGenerator,
}

impl BlogService {
    /// Create a new blog service.
    #[must_use]
    pub const fn new(
        blog_repo: BlogRepository,
        category_repo: BlogCategoryRepository,
        user_repo: UserRepository,
        like_repo: BlogLikeRepository,
    ) -> Self {
        Self {
            blog_repo,
            category_repo,
            user_repo,
            like_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve authors and categories for a batch of blogs, keeping order.
    async fn decorate(&self, blogs: Vec<blog::Model>) -> AppResult<Vec<BlogSummary>> {
        let mut author_ids: Vec<String> = blogs.iter().map(|b| b.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();
        let mut category_ids: Vec<String> = blogs.iter().map(|b| b.category_id.clone()).collect();
        category_ids.sort();
        category_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        let categories: HashMap<String, blog_category::Model> = self
            .category_repo
            .find_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        Ok(blogs
            .into_iter()
            .map(|b| BlogSummary {
                category: categories.get(&b.category_id).map(|c| CategoryRef {
                    id: c.id.clone(),
                    name: c.name.clone(),
                }),
                author: authors.get(&b.author_id).map(|u| AuthorRef {
                    id: u.id.clone(),
                    username: u.username.clone(),
                }),
                id: b.id,
                title: b.title,
                content: b.content,
                views_count: b.views_count,
                likes_count: b.likes_count,
                created_at: b.created_at,
            })
            .collect())
    }

    /// All blogs, newest first.
    pub async fn index(&self, limit: Option<u64>, offset: Option<u64>) -> AppResult<Vec<BlogSummary>> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let blogs = self
            .blog_repo
            .find_newest(limit, offset.unwrap_or(0))
            .await?;
        self.decorate(blogs).await
    }

    /// A single blog. Counts as one view.
    pub async fn detail(&self, blog_id: &str, viewer: Option<&user::Model>) -> AppResult<BlogDetail> {
        let mut blog = self.blog_repo.get_by_id(blog_id).await?;

        self.blog_repo.increment_views_count(&blog.id).await?;
        blog.views_count += 1;

        let liked = match viewer {
            Some(viewer) => self.like_repo.has_liked(&viewer.id, &blog.id).await?,
            None => false,
        };

        let summary = self
            .decorate(vec![blog])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("blog vanished while loading".to_string()))?;

        Ok(BlogDetail {
            blog: summary,
            liked,
        })
    }

    /// Publish a new blog.
    pub async fn publish(&self, author: &user::Model, input: PublishInput) -> AppResult<blog::Model> {
        let input = PublishInput {
            title: input.title.trim().to_string(),
            content: input.content.trim().to_string(),
            category_id: input.category_id.trim().to_string(),
        };
        input.validate()?;

        if self
            .category_repo
            .find_by_id(&input.category_id)
            .await?
            .is_none()
        {
            return Err(AppError::Validation("category does not exist".to_string()));
        }

        let blog = self
            .blog_repo
            .create(blog::ActiveModel {
                id: Set(self.id_gen.generate()),
                title: Set(input.title),
                content: Set(input.content),
                category_id: Set(input.category_id),
                author_id: Set(author.id.clone()),
                views_count: Set(0),
                likes_count: Set(0),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            })
            .await?;

        tracing::info!(blog_id = %blog.id, author_id = %author.id, "Blog published");
        Ok(blog)
    }

    /// All categories by name.
    pub async fn categories(&self) -> AppResult<Vec<blog_category::Model>> {
        self.category_repo.find_all().await
    }

    /// Insert any missing categories. Returns how many were created.
    pub async fn seed_categories(&self, names: &[String]) -> AppResult<usize> {
        let mut created = 0;
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let (_, inserted) = self
                .category_repo
                .ensure(&self.id_gen.generate(), name)
                .await?;
            if inserted {
                tracing::info!(category = %name, "Category created");
                created += 1;
            }
        }
        Ok(created)
    }

    /// Case-insensitive search over title and content, newest first.
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<BlogSummary>> {
        let blogs = self.blog_repo.search(keyword.trim()).await?;
        self.decorate(blogs).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inkpost_db::entities::blog_like;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_blog(id: &str, title: &str) -> blog::Model {
        blog::Model {
            id: id.to_string(),
            title: title.to_string(),
            content: "<p>body</p>".to_string(),
            category_id: "cat1".to_string(),
            author_id: "u1".to_string(),
            views_count: 3,
            likes_count: 1,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

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

    fn category() -> blog_category::Model {
        blog_category::Model {
            id: "cat1".to_string(),
            name: "Rust".to_string(),
        }
    }

    struct Mocks {
        blog: MockDatabase,
        category: MockDatabase,
        user: MockDatabase,
        like: MockDatabase,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                blog: MockDatabase::new(DatabaseBackend::Postgres),
                category: MockDatabase::new(DatabaseBackend::Postgres),
                user: MockDatabase::new(DatabaseBackend::Postgres),
                like: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn build(self) -> BlogService {
            BlogService::new(
                BlogRepository::new(Arc::new(self.blog.into_connection())),
                BlogCategoryRepository::new(Arc::new(self.category.into_connection())),
                UserRepository::new(Arc::new(self.user.into_connection())),
                BlogLikeRepository::new(Arc::new(self.like.into_connection())),
            )
        }
    }

    #[tokio::test]
    async fn test_index_resolves_author_and_category() {
        let mut mocks = Mocks::new();
        mocks.blog = mocks.blog.append_query_results([[
            create_test_blog("b2", "Second"),
            create_test_blog("b1", "First"),
        ]]);
        mocks.user = mocks.user.append_query_results([[create_test_user()]]);
        mocks.category = mocks.category.append_query_results([[category()]]);

        let svc = mocks.build();
        let blogs = svc.index(None, None).await.unwrap();

        assert_eq!(blogs.len(), 2);
        assert_eq!(blogs[0].id, "b2");
        assert_eq!(blogs[0].author.as_ref().unwrap().username, "alice");
        assert_eq!(blogs[1].category.as_ref().unwrap().name, "Rust");
    }

    #[tokio::test]
    async fn test_detail_counts_view_and_like_state() {
        let mut mocks = Mocks::new();
        mocks.blog = mocks
            .blog
            .append_query_results([[create_test_blog("b1", "First")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        mocks.like = mocks.like.append_query_results([[blog_like::Model {
            id: "l1".to_string(),
            user_id: "u1".to_string(),
            blog_id: "b1".to_string(),
            created_at: Utc::now().into(),
        }]]);
        mocks.user = mocks.user.append_query_results([[create_test_user()]]);
        mocks.category = mocks.category.append_query_results([[category()]]);

        let svc = mocks.build();
        let detail = svc.detail("b1", Some(&create_test_user())).await.unwrap();

        assert_eq!(detail.blog.views_count, 4);
        assert!(detail.liked);
    }

    #[tokio::test]
    async fn test_detail_not_found() {
        let mut mocks = Mocks::new();
        mocks.blog = mocks
            .blog
            .append_query_results([Vec::<blog::Model>::new()]);

        let svc = mocks.build();
        let result = svc.detail("missing", None).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_publish_requires_existing_category() {
        let mut mocks = Mocks::new();
        mocks.category = mocks
            .category
            .append_query_results([Vec::<blog_category::Model>::new()]);

        let svc = mocks.build();
        let result = svc
            .publish(
                &create_test_user(),
                PublishInput {
                    title: "Hello".to_string(),
                    content: "<p>world</p>".to_string(),
                    category_id: "nope".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_publish_validates_title() {
        let svc = Mocks::new().build();

        let result = svc
            .publish(
                &create_test_user(),
                PublishInput {
                    title: "x".repeat(101),
                    content: "body".to_string(),
                    category_id: "cat1".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = svc
            .publish(
                &create_test_user(),
                PublishInput {
                    title: "   ".to_string(),
                    content: "body".to_string(),
                    category_id: "cat1".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_publish() {
        let mut mocks = Mocks::new();
        mocks.category = mocks.category.append_query_results([[category()]]);
        mocks.blog = mocks
            .blog
            .append_query_results([[create_test_blog("b9", "Hello")]]);

        let svc = mocks.build();
        let blog = svc
            .publish(
                &create_test_user(),
                PublishInput {
                    title: " Hello ".to_string(),
                    content: "<p>world</p>".to_string(),
                    category_id: "cat1".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(blog.id, "b9");
    }

    #[tokio::test]
    async fn test_seed_categories_skips_existing() {
        let mut mocks = Mocks::new();
        mocks.category = mocks
            .category
            .append_query_results([[category()]])
            .append_query_results([Vec::<blog_category::Model>::new()])
            .append_query_results([[blog_category::Model {
                id: "cat2".to_string(),
                name: "Web".to_string(),
            }]]);

        let svc = mocks.build();
        let created = svc
            .seed_categories(&["Rust".to_string(), "Web".to_string(), " ".to_string()])
            .await
            .unwrap();

        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_search_empty_result_skips_lookups() {
        let mut mocks = Mocks::new();
        mocks.blog = mocks
            .blog
            .append_query_results([Vec::<blog::Model>::new()]);

        let svc = mocks.build();
        let hits = svc.search("  nothing  ").await.unwrap();

        assert!(hits.is_empty());
    }
}
