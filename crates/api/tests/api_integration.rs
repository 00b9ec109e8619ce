//! API integration tests.
//!
//! These drive the full router, session middleware included, over a mock
//! database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::{Duration, Utc};
use inkpost_api::{AppState, app};
use inkpost_core::{
    LogMailer,
    services::testing::{MemoryStorage, TINY_PNG, test_config},
};
use inkpost_db::entities::{blog, blog_category, session, user};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "inkpost-test-boundary";

fn create_test_router(db: MockDatabase) -> Router {
    let db = Arc::new(db.into_connection());
    let state = AppState::build(
        &db,
        &test_config(),
        Arc::new(LogMailer),
        Arc::new(MemoryStorage::default()),
    );
    app(state)
}

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn test_user() -> user::Model {
    user::Model {
        id: "u1".to_string(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        password: "hash".to_string(),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn test_session() -> session::Model {
    session::Model {
        id: "tok".to_string(),
        user_id: "u1".to_string(),
        remember: false,
        expires_at: (Utc::now() + Duration::hours(1)).into(),
        created_at: Utc::now().into(),
    }
}

/// Mock rows consumed by the session middleware for a valid token.
fn logged_in_db() -> MockDatabase {
    empty_db()
        .append_query_results([[test_session()]])
        .append_query_results([[test_user()]])
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_requires_login() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(Request::builder().uri("/settings").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], 401);
    assert_eq!(body["msg"], "Unauthorized");
}

#[tokio::test]
async fn test_like_requires_login() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(json_request("POST", "/blogs/like", r#"{"blog_id":"b1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_email_captcha_rejects_bad_email() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/email-captcha",
            r#"{"email":"not-an-email"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_login_with_unknown_email() {
    let db = empty_db().append_query_results([Vec::<user::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            r#"{"email":"nobody@example.com","password":"secret1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = json_body(response).await;
    assert_eq!(body["msg"], "wrong email or password");
}

#[tokio::test]
async fn test_search_accepts_uppercase_alias() {
    let db = empty_db()
        .append_query_results([[blog::Model {
            id: "b1".to_string(),
            title: "Learning Rust".to_string(),
            content: "<p>ownership</p>".to_string(),
            category_id: "cat1".to_string(),
            author_id: "u1".to_string(),
            views_count: 0,
            likes_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }]])
        .append_query_results([[test_user()]])
        .append_query_results([[blog_category::Model {
            id: "cat1".to_string(),
            name: "Rust".to_string(),
        }]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(Request::builder().uri("/search?Q=rust").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"][0]["title"], "Learning Rust");
    assert_eq!(body["data"][0]["author"]["username"], "alice");
    assert_eq!(body["data"][0]["category"]["name"], "Rust");
}

#[tokio::test]
async fn test_search_with_both_keyword_spellings() {
    let db = empty_db().append_query_results([Vec::<blog::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/search?q=rust&Q=rust")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_search_bad_query_uses_envelope() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/search?q=a&q=b")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], 400);
    assert!(body["msg"].is_string());
}

#[tokio::test]
async fn test_blog_detail_not_found() {
    let db = empty_db().append_query_results([Vec::<blog::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(Request::builder().uri("/blogs/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_categories_listed() {
    let db = empty_db().append_query_results([[
        blog_category::Model {
            id: "cat1".to_string(),
            name: "Rust".to_string(),
        },
        blog_category::Model {
            id: "cat2".to_string(),
            name: "Web".to_string(),
        },
    ]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/blogs/categories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_image_with_bearer_token() {
    let app = create_test_router(logged_in_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/blogs/upload-image")
                .method("POST")
                .header(header::AUTHORIZATION, "Bearer tok")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(
                    "image",
                    "pic.png",
                    "image/png",
                    TINY_PNG,
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["errno"], 0);
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.starts_with("/media/uploads/images/"));
    assert!(url.ends_with(".png"));
    assert_eq!(body["data"]["alt"], "pic.png");
    assert_eq!(body["data"]["href"], url);
}

#[tokio::test]
async fn test_upload_image_rejects_unknown_extension() {
    let app = create_test_router(logged_in_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/blogs/upload-image")
                .method("POST")
                .header(header::AUTHORIZATION, "Bearer tok")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(
                    "image",
                    "notes.txt",
                    "text/plain",
                    b"hello",
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let db = logged_in_db().append_exec_results([MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }]);
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/logout")
                .method("POST")
                .header(header::COOKIE, "inkpost_session=tok")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("removal cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("inkpost_session="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_expired_session_is_anonymous() {
    let expired = session::Model {
        expires_at: (Utc::now() - Duration::minutes(1)).into(),
        ..test_session()
    };
    let db = empty_db()
        .append_query_results([[expired]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }]);
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/settings")
                .header(header::AUTHORIZATION, "Bearer tok")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
