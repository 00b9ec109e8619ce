//! Email verification code entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Length of an emailed verification code.
pub const CODE_LEN: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "captcha")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// One pending code per address
    #[sea_orm(unique)]
    pub email: String,

    pub code: String,

    /// Reset every time a new code is issued
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
