//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use inkpost_core::EditorImage;
use serde::Serialize;

/// Standard API response envelope: `{code, msg, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    status: StatusCode,
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response carrying data.
    pub fn ok(data: T) -> Self {
        Self::ok_with_msg("success", data)
    }

    /// Create a success response with a custom message.
    pub fn ok_with_msg(msg: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            code: StatusCode::OK.as_u16(),
            msg: msg.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Create a success response without data.
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            code: StatusCode::OK.as_u16(),
            msg: msg.into(),
            data: None,
        }
    }

    /// Create an error response with an explicit status.
    pub fn failure(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            code: status.as_u16(),
            msg: msg.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Body the rich-text editor expects after an image upload.
#[derive(Debug, Serialize)]
pub struct EditorUploadResponse {
    pub errno: u8,
    pub data: EditorImage,
}

impl EditorUploadResponse {
    /// Successful upload.
    #[must_use]
    pub const fn ok(data: EditorImage) -> Self {
        Self { errno: 0, data }
    }
}

impl IntoResponse for EditorUploadResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
