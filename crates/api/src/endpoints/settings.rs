//! Account settings endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{get, post},
};
use inkpost_common::AppResult;
use inkpost_core::{ChangePasswordInput, SettingsChange, SettingsUpdate, SettingsView};
use serde::{Deserialize, Serialize};

use super::read_upload;
use crate::{
    extractors::{AuthUser, SessionToken},
    middleware::AppState,
    response::ApiResponse,
};

#[derive(Deserialize)]
pub struct BioRequest {
    pub bio: String,
}

#[derive(Serialize)]
pub struct BioResponse {
    pub bio: String,
}

#[derive(Serialize)]
pub struct AvatarResponse {
    pub avatar_url: String,
}

async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SettingsView>> {
    let settings = state.profile_service.settings(&user).await?;
    Ok(ApiResponse::ok(settings))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SettingsUpdate>,
) -> AppResult<ApiResponse<SettingsChange>> {
    let change = state.profile_service.update_settings(&user, input).await?;
    let msg = if change.changed.is_empty() {
        "nothing changed"
    } else {
        "settings updated"
    };
    Ok(ApiResponse::ok_with_msg(msg, change))
}

async fn upload_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<AvatarResponse>> {
    let upload = read_upload(&mut multipart, "avatar").await?;
    let avatar_url = state.profile_service.upload_avatar(&user, &upload).await?;
    Ok(ApiResponse::ok_with_msg(
        "avatar updated",
        AvatarResponse { avatar_url },
    ))
}

async fn update_bio(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BioRequest>,
) -> AppResult<ApiResponse<BioResponse>> {
    let bio = state.profile_service.update_bio(&user, &req.bio).await?;
    Ok(ApiResponse::ok_with_msg("bio updated", BioResponse { bio }))
}

async fn change_password(
    AuthUser(user): AuthUser,
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<ApiResponse<()>> {
    state
        .profile_service
        .change_password(&user, &token, &input)
        .await?;
    Ok(ApiResponse::message("password changed"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(show).post(update))
        .route("/settings/avatar", post(upload_avatar))
        .route("/settings/bio", post(update_bio))
        .route("/settings/password", post(change_password))
}
