//! Application state and session middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use inkpost_common::{Config, StorageBackend};
use inkpost_core::{
    BlogService, CaptchaService, CommentService, LikeService, Mailer, MediaService,
    ProfileService, SessionService, UserService,
};
use inkpost_db::repositories::{
    BlogCategoryRepository, BlogCommentRepository, BlogLikeRepository, BlogRepository,
    CaptchaRepository, CommentLikeRepository, SessionRepository, UserProfileRepository,
    UserRepository,
};
use sea_orm::DatabaseConnection;

use crate::extractors::SessionToken;

/// Name of the login cookie.
pub const SESSION_COOKIE: &str = "inkpost_session";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub captcha_service: CaptchaService,
    pub session_service: SessionService,
    pub profile_service: ProfileService,
    pub blog_service: BlogService,
    pub comment_service: CommentService,
    pub like_service: LikeService,
    pub media_service: MediaService,
    pub cookie_secure: bool,
}

impl AppState {
    /// Wire every repository and service over one connection pool.
    #[must_use]
    pub fn build(
        db: &Arc<DatabaseConnection>,
        config: &Config,
        mailer: Arc<dyn Mailer>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(db));
        let profile_repo = UserProfileRepository::new(Arc::clone(db));
        let captcha_repo = CaptchaRepository::new(Arc::clone(db));
        let session_repo = SessionRepository::new(Arc::clone(db));
        let category_repo = BlogCategoryRepository::new(Arc::clone(db));
        let blog_repo = BlogRepository::new(Arc::clone(db));
        let comment_repo = BlogCommentRepository::new(Arc::clone(db));
        let blog_like_repo = BlogLikeRepository::new(Arc::clone(db));
        let comment_like_repo = CommentLikeRepository::new(Arc::clone(db));

        let captcha_service = CaptchaService::new(captcha_repo, mailer, config);
        let session_service = SessionService::new(session_repo, user_repo.clone(), config);
        let media_service = MediaService::new(storage);
        let user_service = UserService::new(
            user_repo.clone(),
            profile_repo.clone(),
            captcha_service.clone(),
        );
        let profile_service = ProfileService::new(
            user_repo.clone(),
            profile_repo,
            session_service.clone(),
            media_service.clone(),
        );
        let blog_service = BlogService::new(
            blog_repo.clone(),
            category_repo,
            user_repo.clone(),
            blog_like_repo.clone(),
        );
        let comment_service = CommentService::new(
            comment_repo.clone(),
            blog_repo.clone(),
            user_repo,
            comment_like_repo.clone(),
        );
        let like_service =
            LikeService::new(blog_repo, comment_repo, blog_like_repo, comment_like_repo);

        Self {
            user_service,
            captcha_service,
            session_service,
            profile_service,
            blog_service,
            comment_service,
            like_service,
            media_service,
            cookie_secure: config.auth.cookie_secure,
        }
    }
}

/// Pull the session token from the cookie, falling back to a bearer header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = CookieJar::from_headers(headers).get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Session middleware.
///
/// Resolves the session token and stores the user and token in the request
/// extensions. Requests without a valid session pass through anonymously.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = session_token(req.headers()) {
        match state.session_service.resolve(&token).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
                req.extensions_mut().insert(SessionToken(token));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to resolve session"),
        }
    }

    next.run(req).await
}
