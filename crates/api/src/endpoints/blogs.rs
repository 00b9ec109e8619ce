//! Blog, comment and like endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
};
use inkpost_common::AppResult;
use inkpost_core::{BlogDetail, BlogSummary, CommentNode, CreateCommentInput, LikeToggle, PublishInput};
use inkpost_db::entities::{blog_category, blog_comment};
use serde::{Deserialize, Serialize};

use super::read_upload;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, EditorUploadResponse},
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// A blog page: the blog and its comment threads.
#[derive(Serialize)]
pub struct BlogPage {
    pub blog: BlogDetail,
    pub comments: Vec<CommentNode>,
}

#[derive(Serialize)]
pub struct PublishResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub blog_id: String,
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlogLikeRequest {
    pub blog_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentLikeRequest {
    pub comment_id: String,
}

async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<BlogSummary>>> {
    let blogs = state.blog_service.index(query.limit, query.offset).await?;
    Ok(ApiResponse::ok(blogs))
}

async fn categories(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<blog_category::Model>>> {
    let categories = state.blog_service.categories().await?;
    Ok(ApiResponse::ok(categories))
}

async fn detail(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
) -> AppResult<ApiResponse<BlogPage>> {
    let blog = state.blog_service.detail(&blog_id, viewer.as_ref()).await?;
    let comments = state
        .comment_service
        .list_for_blog(&blog.blog.id, viewer.as_ref())
        .await?;

    Ok(ApiResponse::ok(BlogPage { blog, comments }))
}

async fn publish(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<PublishInput>,
) -> AppResult<ApiResponse<PublishResponse>> {
    let blog = state.blog_service.publish(&user, input).await?;
    Ok(ApiResponse::ok_with_msg(
        "blog published",
        PublishResponse { id: blog.id },
    ))
}

async fn upload_image(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<EditorUploadResponse> {
    let upload = read_upload(&mut multipart, "image").await?;
    let image = state.media_service.store_editor_image(&upload).await?;
    tracing::debug!(user_id = %user.id, url = %image.url, "Editor image uploaded");
    Ok(EditorUploadResponse::ok(image))
}

async fn comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentRequest>,
) -> AppResult<ApiResponse<blog_comment::Model>> {
    let comment = state
        .comment_service
        .create(
            &user,
            &req.blog_id,
            CreateCommentInput {
                content: req.content,
                parent_comment_id: req.parent_comment_id,
            },
        )
        .await?;
    Ok(ApiResponse::ok_with_msg("comment posted", comment))
}

async fn like_blog(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BlogLikeRequest>,
) -> AppResult<ApiResponse<LikeToggle>> {
    let toggle = state.like_service.toggle_blog_like(&user, &req.blog_id).await?;
    Ok(ApiResponse::ok(toggle))
}

async fn like_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentLikeRequest>,
) -> AppResult<ApiResponse<LikeToggle>> {
    let toggle = state
        .like_service
        .toggle_comment_like(&user, &req.comment_id)
        .await?;
    Ok(ApiResponse::ok(toggle))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(index).post(publish))
        .route("/blogs/categories", get(categories))
        .route("/blogs/upload-image", post(upload_image))
        .route("/blogs/comment", post(comment))
        .route("/blogs/like", post(like_blog))
        .route("/blogs/comments/like", post(like_comment))
        .route("/blogs/{id}", get(detail))
}
