//! API endpoints.

mod auth;
mod blogs;
mod search;
mod settings;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart},
    http::StatusCode,
};
use inkpost_common::{AppError, AppResult};
use inkpost_core::Upload;

use crate::middleware::AppState;

/// Largest request body the multipart endpoints accept.
pub const MAX_BODY_SIZE: usize = 6 * 1024 * 1024;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(settings::router())
        .merge(blogs::router())
        .merge(search::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
}

/// Read the named file field from a multipart form.
pub(crate) async fn read_upload(multipart: &mut Multipart, field_name: &str) -> AppResult<Upload> {
    let multipart_err = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::BadRequest(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        if field.name() != Some(field_name) {
            continue;
        }

        let file_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field.bytes().await.map_err(multipart_err)?;

        return Ok(Upload {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    Err(AppError::BadRequest(format!("missing file field `{field_name}`")))
}
