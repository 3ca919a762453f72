//! Create artwork reaction table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ArtworkReaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ArtworkReaction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ArtworkReaction::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArtworkReaction::ArtworkId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArtworkReaction::ReactionType)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArtworkReaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ArtworkReaction::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artwork_reaction_user")
                            .from(ArtworkReaction::Table, ArtworkReaction::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artwork_reaction_artwork")
                            .from(ArtworkReaction::Table, ArtworkReaction::ArtworkId)
                            .to(Artwork::Table, Artwork::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, artwork_id) - one reaction per user per artwork
        manager
            .create_index(
                Index::create()
                    .name("idx_artwork_reaction_user_artwork")
                    .table(ArtworkReaction::Table)
                    .col(ArtworkReaction::UserId)
                    .col(ArtworkReaction::ArtworkId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (artwork_id, reaction_type) for per-type recounts
        manager
            .create_index(
                Index::create()
                    .name("idx_artwork_reaction_artwork_type")
                    .table(ArtworkReaction::Table)
                    .col(ArtworkReaction::ArtworkId)
                    .col(ArtworkReaction::ReactionType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArtworkReaction::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ArtworkReaction {
    Table,
    Id,
    UserId,
    ArtworkId,
    ReactionType,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Artwork {
    Table,
    Id,
}
