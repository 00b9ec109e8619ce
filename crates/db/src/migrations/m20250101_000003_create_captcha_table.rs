//! Create captcha table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Captcha::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Captcha::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Captcha::Email).string_len(254).not_null())
                    .col(ColumnDef::new(Captcha::Code).string_len(6).not_null())
                    .col(
                        ColumnDef::new(Captcha::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one pending code per address
        manager
            .create_index(
                Index::create()
                    .name("idx_captcha_email")
                    .table(Captcha::Table)
                    .col(Captcha::Email)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Captcha::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Captcha {
    Table,
    Id,
    Email,
    Code,
    CreatedAt,
}
