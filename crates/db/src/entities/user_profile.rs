//! User profile entity (avatar and bio).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Storage key every new profile starts with.
pub const DEFAULT_AVATAR: &str = "avatars/default.png";

/// Maximum bio length in characters.
pub const MAX_BIO_LEN: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profile")]
pub struct Model {
    /// Same as user.id (1:1 relationship)
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    /// Storage key of the avatar image
    pub avatar: String,

    #[sea_orm(column_type = "Text")]
    pub bio: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether the avatar is still the shared default image.
    #[must_use]
    pub fn has_default_avatar(&self) -> bool {
        self.avatar.is_empty() || self.avatar == DEFAULT_AVATAR
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
