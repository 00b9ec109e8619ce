//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_user_profile_table;
mod m20250101_000003_create_captcha_table;
mod m20250101_000004_create_session_table;
mod m20250101_000005_create_blog_category_table;
mod m20250101_000006_create_blog_table;
mod m20250101_000007_create_blog_comment_table;
mod m20250101_000008_create_like_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_user_profile_table::Migration),
            Box::new(m20250101_000003_create_captcha_table::Migration),
            Box::new(m20250101_000004_create_session_table::Migration),
            Box::new(m20250101_000005_create_blog_category_table::Migration),
            Box::new(m20250101_000006_create_blog_table::Migration),
            Box::new(m20250101_000007_create_blog_comment_table::Migration),
            Box::new(m20250101_000008_create_like_tables::Migration),
        ]
    }
}
