//! Create blog table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Blog::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Blog::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Blog::Title).string_len(120).not_null())
                    .col(ColumnDef::new(Blog::Content).text().not_null())
                    .col(ColumnDef::new(Blog::CategoryId).string_len(32).not_null())
                    .col(ColumnDef::new(Blog::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Blog::ViewsCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Blog::LikesCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Blog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Blog::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_category")
                            .from(Blog::Table, Blog::CategoryId)
                            .to(BlogCategory::Table, BlogCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_author")
                            .from(Blog::Table, Blog::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_at (index page and search ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_blog_created_at")
                    .table(Blog::Table)
                    .col(Blog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_category_id")
                    .table(Blog::Table)
                    .col(Blog::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_author_id")
                    .table(Blog::Table)
                    .col(Blog::AuthorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Blog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Blog {
    Table,
    Id,
    Title,
    Content,
    CategoryId,
    AuthorId,
    ViewsCount,
    LikesCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BlogCategory {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
