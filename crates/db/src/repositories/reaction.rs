//! Artwork reaction repository.

use std::sync::Arc;

use async_trait::async_trait;
use crate::entities::{
    ArtworkReaction,
    artwork_reaction::{self, ReactionType},
};
use crate::repositories::relation::{RelationshipStore, map_insert_err, relation_not_found};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use tokapu_common::{AppError, AppResult, IdGenerator};

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// The reaction type a user currently has on an artwork, if any.
    pub async fn current_type(
        &self,
        user_id: &str,
        artwork_id: &str,
    ) -> AppResult<Option<ReactionType>> {
        Ok(self
            .find(self.db.as_ref(), user_id, artwork_id)
            .await?
            .map(|r| r.reaction_type))
    }

    /// Change the type of an existing reaction in place.
    pub async fn update_type<C: ConnectionTrait>(
        &self,
        conn: &C,
        reaction: artwork_reaction::Model,
        reaction_type: ReactionType,
    ) -> AppResult<artwork_reaction::Model> {
        let mut active: artwork_reaction::ActiveModel = reaction.into();
        active.reaction_type = Set(reaction_type);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        active
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reactions of one type on an artwork.
    pub async fn count_by_artwork_and_type<C: ConnectionTrait>(
        &self,
        conn: &C,
        artwork_id: &str,
        reaction_type: ReactionType,
    ) -> AppResult<u64> {
        ArtworkReaction::find()
            .filter(artwork_reaction::Column::ArtworkId.eq(artwork_id))
            .filter(artwork_reaction::Column::ReactionType.eq(reaction_type))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl RelationshipStore for ReactionRepository {
    type Model = artwork_reaction::Model;
    type Payload = ReactionType;

    const KIND: &'static str = "Reaction";

    async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
    ) -> AppResult<Option<Self::Model>> {
        ArtworkReaction::find()
            .filter(artwork_reaction::Column::UserId.eq(actor_id))
            .filter(artwork_reaction::Column::ArtworkId.eq(target_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reactions are only created from the empty state, so there is no
    /// pre-check here; the unique index still turns a racing insert into
    /// `Conflict`.
    async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
        payload: ReactionType,
    ) -> AppResult<Self::Model> {
        let model = artwork_reaction::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(actor_id.to_string()),
            artwork_id: Set(target_id.to_string()),
            reaction_type: Set(payload),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| map_insert_err(Self::KIND, e))
    }

    async fn delete<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
    ) -> AppResult<()> {
        let result = ArtworkReaction::delete_many()
            .filter(artwork_reaction::Column::UserId.eq(actor_id))
            .filter(artwork_reaction::Column::ArtworkId.eq(target_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(relation_not_found(Self::KIND));
        }
        Ok(())
    }
}
