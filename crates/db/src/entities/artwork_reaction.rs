//! Artwork reaction entity (one typed reaction per user per artwork).

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tokapu_common::AppError;

use super::artwork::EngagementCounter;

/// The closed set of reactions a user can leave on an artwork.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReactionType {
    #[sea_orm(string_value = "LIKE")]
    Like,
    #[sea_orm(string_value = "LOVE")]
    Love,
    #[sea_orm(string_value = "WOW")]
    Wow,
    #[sea_orm(string_value = "CLAP")]
    Clap,
}

impl ReactionType {
    /// Every reaction type.
    pub const ALL: [Self; 4] = [Self::Like, Self::Love, Self::Wow, Self::Clap];

    /// Canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Love => "LOVE",
            Self::Wow => "WOW",
            Self::Clap => "CLAP",
        }
    }

    /// The artwork counter tallying this reaction.
    #[must_use]
    pub const fn counter(self) -> EngagementCounter {
        match self {
            Self::Like => EngagementCounter::Likes,
            Self::Love => EngagementCounter::Loves,
            Self::Wow => EngagementCounter::Wows,
            Self::Clap => EngagementCounter::Claps,
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionType {
    type Err = AppError;

    /// Case-insensitive parse; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("Reaction type is required".to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AppError::Validation(format!("Invalid reaction type: {trimmed}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artwork_reaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who reacted
    pub user_id: String,

    /// The artwork being reacted to
    pub artwork_id: String,

    pub reaction_type: ReactionType,

    pub created_at: DateTimeWithTimeZone,

    /// Set when the reaction switches type
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
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

    #[sea_orm(
        belongs_to = "super::artwork::Entity",
        from = "Column::ArtworkId",
        to = "super::artwork::Column::Id",
        on_delete = "Cascade"
    )]
    Artwork,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::artwork::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artwork.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("like".parse::<ReactionType>().unwrap(), ReactionType::Like);
        assert_eq!("Love".parse::<ReactionType>().unwrap(), ReactionType::Love);
        assert_eq!(" WOW ".parse::<ReactionType>().unwrap(), ReactionType::Wow);
        assert_eq!("cLaP".parse::<ReactionType>().unwrap(), ReactionType::Clap);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        match "HEART".parse::<ReactionType>() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("HEART")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            "   ".parse::<ReactionType>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_counter_mapping_is_total_and_injective() {
        let counters: std::collections::HashSet<_> =
            ReactionType::ALL.iter().map(|t| t.counter()).collect();
        assert_eq!(counters.len(), ReactionType::ALL.len());
        assert_eq!(ReactionType::Like.counter(), EngagementCounter::Likes);
        assert_eq!(ReactionType::Clap.counter(), EngagementCounter::Claps);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for t in ReactionType::ALL {
            assert_eq!(t.to_string().parse::<ReactionType>().unwrap(), t);
        }
    }
}
