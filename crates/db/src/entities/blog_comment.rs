//! Blog comment entity.
//!
//! A comment either sits at the top of a blog's thread or replies to another
//! comment through `parent_comment_id`. `is_reply` and `reply_id` are derived
//! from the parent in [`ActiveModelBehavior::before_save`], so every write
//! path keeps them consistent.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(indexed)]
    pub blog_id: String,

    #[sea_orm(indexed)]
    pub author_id: String,

    /// Comment being replied to
    #[sea_orm(nullable, indexed)]
    pub parent_comment_id: Option<String>,

    /// Derived: `parent_comment_id.is_some()`
    #[sea_orm(default_value = false)]
    pub is_reply: bool,

    /// Derived: copy of `parent_comment_id`
    #[sea_orm(nullable)]
    pub reply_id: Option<String>,

    /// Rows in `comment_like` for this comment (denormalized)
    #[sea_orm(default_value = 0)]
    pub likes_count: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::blog::Entity",
        from = "Column::BlogId",
        to = "super::blog::Column::Id",
        on_delete = "Cascade"
    )]
    Blog,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentCommentId",
        to = "Column::Id",
        on_delete = "Cascade"
    )]
    Parent,

    #[sea_orm(has_many = "super::comment_like::Entity")]
    Likes,
}

impl Related<super::blog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blog.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

/// Reply flags implied by a parent comment id.
#[must_use]
pub fn reply_fields(parent_comment_id: Option<&str>) -> (bool, Option<String>) {
    (
        parent_comment_id.is_some(),
        parent_comment_id.map(ToString::to_string),
    )
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        // Partial updates that leave the parent untouched keep their flags.
        let parent = match &self.parent_comment_id {
            ActiveValue::Set(v) | ActiveValue::Unchanged(v) => v.clone(),
            ActiveValue::NotSet => return Ok(self),
        };

        let (is_reply, reply_id) = reply_fields(parent.as_deref());
        self.is_reply = ActiveValue::Set(is_reply);
        self.reply_id = ActiveValue::Set(reply_id);
        Ok(self)
    }
}
