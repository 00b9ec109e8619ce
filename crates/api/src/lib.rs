//! HTTP API layer for inkpost.
//!
//! - **Endpoints**: auth, settings, blogs, search
//! - **Extractors**: authenticated user, session token
//! - **Middleware**: session resolution from cookie or bearer token
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::{AppState, SESSION_COOKIE, session_middleware};

/// The API router with session resolution applied and state attached.
pub fn app(state: AppState) -> Router {
    router()
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .with_state(state)
}
