//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p inkpost-db --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `inkpost_test`)
//!   `TEST_DB_PASSWORD` (default: `inkpost_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use inkpost_common::AppError;
use inkpost_db::entities::{blog_comment, blog_like};
use inkpost_db::repositories::{
    BlogCommentRepository, BlogLikeRepository, BlogRepository, CaptchaRepository,
};
use inkpost_db::test_utils::TestDatabase;
use sea_orm::Set;

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_search_is_case_insensitive_and_newest_first() {
    let db = TestDatabase::create_unique().await.unwrap();
    db.insert_user("u1", "alice").await.unwrap();
    db.insert_category("cat1", "Rust").await.unwrap();
    db.insert_blog("b1", "u1", "cat1", "Ownership", "About RUST borrows")
        .await
        .unwrap();
    db.insert_blog("b2", "u1", "cat1", "rusty tools", "cargo")
        .await
        .unwrap();
    db.insert_blog("b3", "u1", "cat1", "Gardening", "tomatoes")
        .await
        .unwrap();

    let repo = BlogRepository::new(Arc::new(db.connection().clone()));

    let hits = repo.search("Rust").await.unwrap();
    let ids: Vec<_> = hits.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["b2", "b1"]);

    assert_eq!(repo.search("").await.unwrap().len(), 3);
    assert!(repo.search("50%").await.unwrap().is_empty());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_like_is_conflict() {
    let db = TestDatabase::create_unique().await.unwrap();
    db.insert_user("u1", "alice").await.unwrap();
    db.insert_category("cat1", "Rust").await.unwrap();
    db.insert_blog("b1", "u1", "cat1", "t", "c").await.unwrap();

    let repo = BlogLikeRepository::new(Arc::new(db.connection().clone()));
    let like = |id: &str| blog_like::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set("u1".to_string()),
        blog_id: Set("b1".to_string()),
        created_at: Set(Utc::now().into()),
    };

    repo.create(like("l1")).await.unwrap();
    let second = repo.create(like("l2")).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert_eq!(repo.count_by_target("b1").await.unwrap(), 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_reply_flags_persist() {
    let db = TestDatabase::create_unique().await.unwrap();
    db.insert_user("u1", "alice").await.unwrap();
    db.insert_category("cat1", "Rust").await.unwrap();
    db.insert_blog("b1", "u1", "cat1", "t", "c").await.unwrap();

    let repo = BlogCommentRepository::new(Arc::new(db.connection().clone()));
    let comment = |id: &str, parent: Option<&str>| blog_comment::ActiveModel {
        id: Set(id.to_string()),
        content: Set("hi".to_string()),
        blog_id: Set("b1".to_string()),
        author_id: Set("u1".to_string()),
        parent_comment_id: Set(parent.map(ToString::to_string)),
        likes_count: Set(0),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
        ..Default::default()
    };

    let root = repo.create(comment("c1", None)).await.unwrap();
    let reply = repo.create(comment("c2", Some("c1"))).await.unwrap();

    assert!(!root.is_reply);
    assert_eq!(root.reply_id, None);
    assert!(reply.is_reply);
    assert_eq!(reply.reply_id.as_deref(), Some("c1"));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_captcha_upsert_keeps_one_row_per_email() {
    let db = TestDatabase::create_unique().await.unwrap();
    let repo = CaptchaRepository::new(Arc::new(db.connection().clone()));

    repo.upsert("k1", "a@example.com", "AAAAAA", Utc::now())
        .await
        .unwrap();
    let second = repo
        .upsert("k2", "a@example.com", "BBBBBB", Utc::now())
        .await
        .unwrap();

    assert_eq!(second.id, "k1");
    let stored = repo.find_by_email("a@example.com").await.unwrap().unwrap();
    assert_eq!(stored.code, "BBBBBB");

    db.drop_database().await.unwrap();
}
