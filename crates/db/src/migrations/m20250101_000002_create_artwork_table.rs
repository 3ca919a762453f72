//! Create artwork table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn counter(col: Artwork) -> ColumnDef {
    ColumnDef::new(col).integer().not_null().default(0).to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Artwork::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Artwork::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Artwork::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Artwork::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Artwork::Description).text().not_null())
                    .col(ColumnDef::new(Artwork::ArtistName).string_len(100))
                    .col(ColumnDef::new(Artwork::ArtworkType).string_len(16).not_null())
                    .col(ColumnDef::new(Artwork::Technique).string_len(100))
                    .col(ColumnDef::new(Artwork::YearCreated).integer())
                    .col(
                        ColumnDef::new(Artwork::Latitude)
                            .decimal_len(10, 8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Artwork::Longitude)
                            .decimal_len(11, 8)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Artwork::Address).string_len(500))
                    .col(ColumnDef::new(Artwork::City).string_len(100))
                    .col(&mut counter(Artwork::ViewsCount))
                    .col(&mut counter(Artwork::FavoritesCount))
                    .col(&mut counter(Artwork::CommentsCount))
                    .col(&mut counter(Artwork::ValidationScore))
                    .col(&mut counter(Artwork::LikesCount))
                    .col(&mut counter(Artwork::LovesCount))
                    .col(&mut counter(Artwork::WowsCount))
                    .col(&mut counter(Artwork::ClapsCount))
                    .col(
                        ColumnDef::new(Artwork::Status)
                            .string_len(16)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Artwork::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Artwork::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Artwork::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artwork_user")
                            .from(Artwork::Table, Artwork::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for listing a user's artworks)
        manager
            .create_index(
                Index::create()
                    .name("idx_artwork_user_id")
                    .table(Artwork::Table)
                    .col(Artwork::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: (status, latitude, longitude) for bounding-box searches
        manager
            .create_index(
                Index::create()
                    .name("idx_artwork_status_location")
                    .table(Artwork::Table)
                    .col(Artwork::Status)
                    .col(Artwork::Latitude)
                    .col(Artwork::Longitude)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for newest-first listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_artwork_created_at")
                    .table(Artwork::Table)
                    .col(Artwork::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Artwork::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum Artwork {
    Table,
    Id,
    UserId,
    Title,
    Description,
    ArtistName,
    ArtworkType,
    Technique,
    YearCreated,
    Latitude,
    Longitude,
    Address,
    City,
    ViewsCount,
    FavoritesCount,
    CommentsCount,
    ValidationScore,
    LikesCount,
    LovesCount,
    WowsCount,
    ClapsCount,
    Status,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
