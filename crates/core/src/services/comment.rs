//! Threaded blog comments.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset, Utc};
use inkpost_common::{AppError, AppResult, IdGenerator};
use inkpost_db::{
    entities::{blog_comment, user},
    repositories::{BlogCommentRepository, BlogRepository, CommentLikeRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::blog::AuthorRef;

/// Input for posting a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 2000, message = "comment must be 1 to 2000 characters"))]
    pub content: String,

    /// Comment being replied to, if any
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

/// A comment and its replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    pub id: String,
    pub content: String,
    pub author: Option<AuthorRef>,
    pub parent_comment_id: Option<String>,
    pub is_reply: bool,
    pub reply_id: Option<String>,
    pub likes_count: i32,
    pub liked: bool,
    pub created_at: DateTime<FixedOffset>,
    pub replies: Vec<CommentNode>,
}

/// Comment service.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: BlogCommentRepository,
    blog_repo: BlogRepository,
    user_repo: UserRepository,
    like_repo: CommentLikeRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: BlogCommentRepository,
        blog_repo: BlogRepository,
        user_repo: UserRepository,
        like_repo: CommentLikeRepository,
    ) -> Self {
        Self {
            comment_repo,
            blog_repo,
            user_repo,
            like_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a comment on a blog, optionally as a reply.
    pub async fn create(
        &self,
        author: &user::Model,
        blog_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<blog_comment::Model> {
        let input = CreateCommentInput {
            content: input.content.trim().to_string(),
            parent_comment_id: input
                .parent_comment_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
        };
        input.validate()?;

        let blog = self.blog_repo.get_by_id(blog_id).await?;

        if let Some(parent_id) = &input.parent_comment_id {
            let parent = self
                .comment_repo
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::Validation("parent comment does not exist".to_string()))?;
            if parent.blog_id != blog.id {
                return Err(AppError::Validation(
                    "parent comment belongs to another blog".to_string(),
                ));
            }
            if parent.is_reply {
                return Err(AppError::Validation(
                    "replies can only be made to top-level comments".to_string(),
                ));
            }
        }

        let comment = self
            .comment_repo
            .create(blog_comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                content: Set(input.content),
                blog_id: Set(blog.id),
                author_id: Set(author.id.clone()),
                parent_comment_id: Set(input.parent_comment_id),
                likes_count: Set(0),
                created_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .await?;

        tracing::debug!(comment_id = %comment.id, blog_id = %comment.blog_id, "Comment posted");
        Ok(comment)
    }

    /// The comments of a blog as top-level threads with their direct replies.
    /// Siblings are newest first.
    pub async fn list_for_blog(
        &self,
        blog_id: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<Vec<CommentNode>> {
        let comments = self.comment_repo.find_by_blog(blog_id).await?;
        if comments.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();
        let liked = match viewer {
            Some(viewer) => self.like_repo.liked_comment_ids(&viewer.id, &ids).await?,
            None => HashSet::new(),
        };

        let mut author_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();
        let authors: HashMap<String, AuthorRef> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id.clone(),
                    AuthorRef {
                        id: u.id,
                        username: u.username,
                    },
                )
            })
            .collect();

        Ok(build_tree(comments, &authors, &liked))
    }
}

/// Arrange a flat, newest-first comment list into two-level threads.
///
/// A comment is nested under its parent only when the parent is a present
/// top-level comment. Everything else is shown top-level, which covers
/// orphans and replies to replies stored before those were rejected.
fn build_tree(
    comments: Vec<blog_comment::Model>,
    authors: &HashMap<String, AuthorRef>,
    liked: &HashSet<String>,
) -> Vec<CommentNode> {
    let present: HashSet<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    let top_level: HashSet<String> = comments
        .iter()
        .filter(|c| {
            c.parent_comment_id
                .as_deref()
                .is_none_or(|parent| !present.contains(parent))
        })
        .map(|c| c.id.clone())
        .collect();

    let mut replies: HashMap<String, Vec<CommentNode>> = HashMap::new();
    let mut roots = Vec::new();

    for comment in comments {
        match comment.parent_comment_id.clone() {
            Some(parent) if top_level.contains(&parent) => {
                replies
                    .entry(parent)
                    .or_default()
                    .push(to_node(comment, authors, liked));
            }
            _ => roots.push(to_node(comment, authors, liked)),
        }
    }

    for root in &mut roots {
        root.replies = replies.remove(&root.id).unwrap_or_default();
    }
    roots
}

fn to_node(
    comment: blog_comment::Model,
    authors: &HashMap<String, AuthorRef>,
    liked: &HashSet<String>,
) -> CommentNode {
    CommentNode {
        author: authors.get(&comment.author_id).cloned(),
        liked: liked.contains(&comment.id),
        id: comment.id,
        content: comment.content,
        parent_comment_id: comment.parent_comment_id,
        is_reply: comment.is_reply,
        reply_id: comment.reply_id,
        likes_count: comment.likes_count,
        created_at: comment.created_at,
        replies: Vec::new(),
    }
}
