//! Registration and login endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use inkpost_common::{AppError, AppResult};
use inkpost_core::{IssueCaptchaInput, LoginInput, RegisterInput, StartedSession};
use serde::Serialize;

use crate::{
    extractors::{AuthUser, SessionToken},
    middleware::{AppState, SESSION_COOKIE},
    response::ApiResponse,
};

/// Registered account.
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
}

/// Login response. The token is also set as the session cookie.
#[derive(Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub username: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn session_cookie(session: &StartedSession, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);

    // No Max-Age: the cookie dies with the browser session
    if let Some(max_age) = session.max_age {
        cookie = cookie.max_age(time::Duration::seconds(max_age.num_seconds()));
    }

    cookie.build()
}

/// Mail a verification code.
async fn email_captcha(
    State(state): State<AppState>,
    Json(input): Json<IssueCaptchaInput>,
) -> AppResult<ApiResponse<()>> {
    state.captcha_service.issue(input).await?;
    Ok(ApiResponse::message("verification code sent"))
}

/// Create an account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let user = state.user_service.register(input).await?;

    Ok(ApiResponse::ok_with_msg(
        "registration successful",
        RegisterResponse {
            id: user.id,
            username: user.username,
        },
    ))
}

/// Log in and set the session cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> AppResult<Response> {
    let user = match state.user_service.authenticate(&input).await {
        Ok(user) => user,
        Err(AppError::Unauthorized) => {
            return Ok(
                ApiResponse::failure(StatusCode::UNAUTHORIZED, "wrong email or password")
                    .into_response(),
            );
        }
        Err(e) => return Err(e),
    };

    let session = state.session_service.start(&user.id, input.remember).await?;
    let jar = jar.add(session_cookie(&session, state.cookie_secure));

    Ok((
        jar,
        ApiResponse::ok_with_msg(
            "login successful",
            LoginResponse {
                id: user.id,
                username: user.username,
                token: session.token,
                expires_at: session.expires_at,
            },
        ),
    )
        .into_response())
}

/// End the current session and clear the cookie.
async fn logout(
    AuthUser(user): AuthUser,
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<()>)> {
    state.session_service.end(&token).await?;
    tracing::info!(user_id = %user.id, "Logged out");

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, ApiResponse::message("logged out")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/email-captcha", post(email_captcha))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}
