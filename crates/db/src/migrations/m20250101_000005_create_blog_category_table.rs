//! Create `blog_category` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlogCategory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlogCategory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BlogCategory::Name).string_len(120).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_category_name")
                    .table(BlogCategory::Table)
                    .col(BlogCategory::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlogCategory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BlogCategory {
    Table,
    Id,
    Name,
}
