//! Artwork entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation status of an artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum ArtworkStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "REMOVED")]
    Removed,
}

/// Kind of urban artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum ArtworkType {
    #[sea_orm(string_value = "MURAL")]
    Mural,
    #[sea_orm(string_value = "GRAFFITI")]
    Graffiti,
    #[sea_orm(string_value = "SCULPTURE")]
    Sculpture,
    #[sea_orm(string_value = "INSTALLATION")]
    Installation,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artwork")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owner user ID
    #[sea_orm(indexed)]
    pub user_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(nullable)]
    pub artist_name: Option<String>,

    pub artwork_type: ArtworkType,

    #[sea_orm(nullable)]
    pub technique: Option<String>,

    #[sea_orm(nullable)]
    pub year_created: Option<i32>,

    #[sea_orm(column_type = "Decimal(Some((10, 8)))")]
    pub latitude: Decimal,

    #[sea_orm(column_type = "Decimal(Some((11, 8)))")]
    pub longitude: Decimal,

    #[sea_orm(nullable)]
    pub address: Option<String>,

    #[sea_orm(nullable)]
    pub city: Option<String>,

    // Denormalized counters. Only CounterSync writes these.
    #[sea_orm(default_value = 0)]
    pub views_count: i32,

    #[sea_orm(default_value = 0)]
    pub favorites_count: i32,

    #[sea_orm(default_value = 0)]
    pub comments_count: i32,

    #[sea_orm(default_value = 0)]
    pub validation_score: i32,

    #[sea_orm(default_value = 0)]
    pub likes_count: i32,

    #[sea_orm(default_value = 0)]
    pub loves_count: i32,

    #[sea_orm(default_value = 0)]
    pub wows_count: i32,

    #[sea_orm(default_value = 0)]
    pub claps_count: i32,

    pub status: ArtworkStatus,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

/// A denormalized counter column on the artwork row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementCounter {
    Views,
    Favorites,
    Comments,
    ValidationScore,
    Likes,
    Loves,
    Wows,
    Claps,
}

impl EngagementCounter {
    /// Every counter, in column order.
    pub const ALL: [Self; 8] = [
        Self::Views,
        Self::Favorites,
        Self::Comments,
        Self::ValidationScore,
        Self::Likes,
        Self::Loves,
        Self::Wows,
        Self::Claps,
    ];

    /// The column backing this counter.
    #[must_use]
    pub const fn column(self) -> Column {
        match self {
            Self::Views => Column::ViewsCount,
            Self::Favorites => Column::FavoritesCount,
            Self::Comments => Column::CommentsCount,
            Self::ValidationScore => Column::ValidationScore,
            Self::Likes => Column::LikesCount,
            Self::Loves => Column::LovesCount,
            Self::Wows => Column::WowsCount,
            Self::Claps => Column::ClapsCount,
        }
    }

    /// Raw SQL name of the backing column.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Views => "views_count",
            Self::Favorites => "favorites_count",
            Self::Comments => "comments_count",
            Self::ValidationScore => "validation_score",
            Self::Likes => "likes_count",
            Self::Loves => "loves_count",
            Self::Wows => "wows_count",
            Self::Claps => "claps_count",
        }
    }

    /// Read this counter off a loaded row.
    #[must_use]
    pub const fn read(self, model: &Model) -> i32 {
        match self {
            Self::Views => model.views_count,
            Self::Favorites => model.favorites_count,
            Self::Comments => model.comments_count,
            Self::ValidationScore => model.validation_score,
            Self::Likes => model.likes_count,
            Self::Loves => model.loves_count,
            Self::Wows => model.wows_count,
            Self::Claps => model.claps_count,
        }
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

    #[sea_orm(has_many = "super::artwork_reaction::Entity")]
    Reaction,

    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorite,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::artwork_reaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reaction.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorite.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
