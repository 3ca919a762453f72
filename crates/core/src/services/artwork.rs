//! Artwork catalogue.

use std::sync::Arc;

use crate::services::counter::CounterSync;
use crate::services::proximity;
use crate::services::visibility;
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use tokapu_common::{AppError, AppResult, EngagementConfig, IdGenerator};
use tokapu_db::{
    entities::{
        artwork::{self, ArtworkStatus, ArtworkType},
        artwork_reaction::ReactionType,
        comment,
    },
    repositories::{ArtworkRepository, CommentRepository, FavoriteRepository, ReactionRepository},
};
use validator::Validate;

/// Input for posting an artwork.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtworkInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(max = 200))]
    pub artist_name: Option<String>,
    pub artwork_type: ArtworkType,
    #[validate(length(max = 100))]
    pub technique: Option<String>,
    #[validate(range(min = 1000, max = 2100))]
    pub year_created: Option<i32>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
}

/// Input for editing an artwork's descriptive fields.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtworkInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub artist_name: Option<String>,
    pub artwork_type: Option<ArtworkType>,
    #[validate(length(max = 100))]
    pub technique: Option<String>,
    #[validate(range(min = 1000, max = 2100))]
    pub year_created: Option<i32>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
}

/// Per-type reaction tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReactionCounts {
    pub like: i32,
    pub love: i32,
    pub wow: i32,
    pub clap: i32,
}

impl ReactionCounts {
    fn of(artwork: &artwork::Model) -> Self {
        Self {
            like: artwork.likes_count,
            love: artwork.loves_count,
            wow: artwork.wows_count,
            clap: artwork.claps_count,
        }
    }

    /// Sum over all types.
    #[must_use]
    pub const fn total(&self) -> i32 {
        self.like + self.love + self.wow + self.clap
    }
}

/// An artwork with its engagement summary for one viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkView {
    pub artwork: artwork::Model,
    pub reactions: ReactionCounts,
    pub total_reactions: i32,
    /// The viewer's own reaction; `None` for anonymous viewers.
    pub user_reaction: Option<ReactionType>,
    pub is_favorited: bool,
    pub recent_comments: Vec<comment::Model>,
}

/// Artwork service for business logic.
#[derive(Clone)]
pub struct ArtworkService {
    artwork_repo: ArtworkRepository,
    reaction_repo: ReactionRepository,
    favorite_repo: FavoriteRepository,
    comment_repo: CommentRepository,
    counters: CounterSync,
    config: EngagementConfig,
    id_gen: IdGenerator,
}

impl ArtworkService {
    /// Create a new artwork service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: EngagementConfig) -> Self {
        Self {
            artwork_repo: ArtworkRepository::new(db.clone()),
            reaction_repo: ReactionRepository::new(db.clone()),
            favorite_repo: FavoriteRepository::new(db.clone()),
            comment_repo: CommentRepository::new(db.clone()),
            counters: CounterSync::new(db),
            config,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a new artwork owned by `user_id`.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateArtworkInput,
    ) -> AppResult<artwork::Model> {
        input.validate()?;
        proximity::check_coordinates(input.latitude, input.longitude)?;

        let status = if self.config.auto_approve_artworks {
            ArtworkStatus::Approved
        } else {
            ArtworkStatus::Pending
        };

        let model = artwork::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(input.title),
            description: Set(input.description),
            artist_name: Set(input.artist_name),
            artwork_type: Set(input.artwork_type),
            technique: Set(input.technique),
            year_created: Set(input.year_created),
            latitude: Set(proximity::coordinate(input.latitude)?),
            longitude: Set(proximity::coordinate(input.longitude)?),
            address: Set(input.address),
            city: Set(input.city),
            views_count: Set(0),
            favorites_count: Set(0),
            comments_count: Set(0),
            validation_score: Set(0),
            likes_count: Set(0),
            loves_count: Set(0),
            wows_count: Set(0),
            claps_count: Set(0),
            status: Set(status),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.artwork_repo.create(model).await?;
        tracing::info!(
            artwork_id = %created.id,
            user_id = %user_id,
            status = ?created.status,
            "Artwork created"
        );
        Ok(created)
    }

    /// Load an artwork for a viewer, counting the view.
    pub async fn get(&self, artwork_id: &str, viewer_id: Option<&str>) -> AppResult<ArtworkView> {
        let artwork = self.artwork_repo.get_by_id(artwork_id).await?;
        let artwork = visibility::ensure_visible(artwork, viewer_id)?;

        self.counters.record_view(artwork_id).await;

        let (user_reaction, is_favorited) = match viewer_id {
            Some(viewer) => (
                self.reaction_repo.current_type(viewer, artwork_id).await?,
                self.favorite_repo.is_favorited(viewer, artwork_id).await?,
            ),
            None => (None, false),
        };

        let recent_comments = self
            .comment_repo
            .find_recent_by_artwork(artwork_id, self.config.recent_comments_limit)
            .await?;

        let reactions = ReactionCounts::of(&artwork);
        Ok(ArtworkView {
            artwork,
            reactions,
            total_reactions: reactions.total(),
            user_reaction,
            is_favorited,
            recent_comments,
        })
    }

    /// Approved, active artworks, newest first.
    pub async fn list_approved(&self, limit: u64, offset: u64) -> AppResult<Vec<artwork::Model>> {
        self.artwork_repo.find_approved(limit, offset).await
    }

    /// A user's artworks as seen by `viewer_id`. Owners see all of theirs.
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        viewer_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<artwork::Model>> {
        let visible_only = viewer_id != Some(owner_id);
        let artworks = self
            .artwork_repo
            .find_by_owner(owner_id, visible_only, limit, offset)
            .await?;
        Ok(visibility::filter_visible(artworks, viewer_id))
    }

    /// Approved artworks of one type.
    pub async fn filter_by_type(
        &self,
        artwork_type: ArtworkType,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<artwork::Model>> {
        self.artwork_repo
            .find_approved_by_type(artwork_type, limit, offset)
            .await
    }

    /// Substring search over title, description and artist name.
    pub async fn search(
        &self,
        query: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<artwork::Model>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("Search query is required".to_string()));
        }
        self.artwork_repo.search(query, limit, offset).await
    }

    /// Edit an artwork. Only the owner may do so; counters are not touched.
    pub async fn update(
        &self,
        user_id: &str,
        artwork_id: &str,
        input: UpdateArtworkInput,
    ) -> AppResult<artwork::Model> {
        input.validate()?;

        let artwork = self.owned_by(user_id, artwork_id).await?;
        let mut active: artwork::ActiveModel = artwork.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(artist_name) = input.artist_name {
            active.artist_name = Set(Some(artist_name));
        }
        if let Some(artwork_type) = input.artwork_type {
            active.artwork_type = Set(artwork_type);
        }
        if let Some(technique) = input.technique {
            active.technique = Set(Some(technique));
        }
        if let Some(year_created) = input.year_created {
            active.year_created = Set(Some(year_created));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(city) = input.city {
            active.city = Set(Some(city));
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.artwork_repo.update(active).await
    }

    /// Delete an artwork. Only the owner may do so.
    pub async fn delete(&self, user_id: &str, artwork_id: &str) -> AppResult<()> {
        self.owned_by(user_id, artwork_id).await?;
        self.artwork_repo.delete(artwork_id).await?;

        tracing::info!(artwork_id = %artwork_id, user_id = %user_id, "Artwork deleted");
        Ok(())
    }

    async fn owned_by(&self, user_id: &str, artwork_id: &str) -> AppResult<artwork::Model> {
        let artwork = self.artwork_repo.get_by_id(artwork_id).await?;
        let artwork = visibility::ensure_visible(artwork, Some(user_id))?;
        if artwork.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can modify this artwork".to_string(),
            ));
        }
        Ok(artwork)
    }
}
