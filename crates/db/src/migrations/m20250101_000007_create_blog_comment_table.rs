//! Create `blog_comment` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlogComment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlogComment::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BlogComment::Content).text().not_null())
                    .col(ColumnDef::new(BlogComment::BlogId).string_len(32).not_null())
                    .col(ColumnDef::new(BlogComment::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(BlogComment::ParentCommentId).string_len(32))
                    .col(
                        ColumnDef::new(BlogComment::IsReply)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(BlogComment::ReplyId).string_len(32))
                    .col(
                        ColumnDef::new(BlogComment::LikesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BlogComment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(BlogComment::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_comment_blog")
                            .from(BlogComment::Table, BlogComment::BlogId)
                            .to(Blog::Table, Blog::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_comment_author")
                            .from(BlogComment::Table, BlogComment::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_comment_parent")
                            .from(BlogComment::Table, BlogComment::ParentCommentId)
                            .to(BlogComment::Table, BlogComment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (blog_id, created_at) - listing a blog's thread
        manager
            .create_index(
                Index::create()
                    .name("idx_blog_comment_blog_created")
                    .table(BlogComment::Table)
                    .col(BlogComment::BlogId)
                    .col(BlogComment::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_comment_parent")
                    .table(BlogComment::Table)
                    .col(BlogComment::ParentCommentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlogComment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BlogComment {
    Table,
    Id,
    Content,
    BlogId,
    AuthorId,
    ParentCommentId,
    IsReply,
    ReplyId,
    LikesCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Blog {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
