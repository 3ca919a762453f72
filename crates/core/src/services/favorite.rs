//! Favorites.

use std::collections::HashMap;
use std::sync::Arc;

use crate::services::counter::{CounterSync, db_err};
use crate::services::visibility;
use tokapu_common::AppResult;
use tokapu_db::{
    entities::{artwork, artwork::EngagementCounter, favorite},
    repositories::{ArtworkRepository, FavoriteRepository, RelationshipStore},
};
use sea_orm::{DatabaseConnection, TransactionTrait};

/// Favorite service for business logic.
#[derive(Clone)]
pub struct FavoriteService {
    db: Arc<DatabaseConnection>,
    favorite_repo: FavoriteRepository,
    artwork_repo: ArtworkRepository,
    counters: CounterSync,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            favorite_repo: FavoriteRepository::new(db.clone()),
            artwork_repo: ArtworkRepository::new(db.clone()),
            counters: CounterSync::new(db.clone()),
            db,
        }
    }

    /// Favorite an artwork. Fails with `Conflict` if it already is.
    pub async fn add(&self, user_id: &str, artwork_id: &str) -> AppResult<favorite::Model> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let artwork = self.artwork_repo.find_for_update(&txn, artwork_id).await?;
        visibility::ensure_visible(artwork, Some(user_id))?;

        let created = self
            .favorite_repo
            .create(&txn, user_id, artwork_id, ())
            .await?;
        self.counters
            .adjust(&txn, artwork_id, EngagementCounter::Favorites, 1)
            .await?;

        txn.commit().await.map_err(db_err)?;

        tracing::debug!(user_id = %user_id, artwork_id = %artwork_id, "Artwork favorited");
        Ok(created)
    }

    /// Unfavorite an artwork. Fails with `NotFound` if it is not favorited.
    pub async fn remove(&self, user_id: &str, artwork_id: &str) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        self.artwork_repo.find_for_update(&txn, artwork_id).await?;
        self.favorite_repo
            .delete(&txn, user_id, artwork_id)
            .await?;
        self.counters
            .adjust(&txn, artwork_id, EngagementCounter::Favorites, -1)
            .await?;

        txn.commit().await.map_err(db_err)?;

        tracing::debug!(user_id = %user_id, artwork_id = %artwork_id, "Artwork unfavorited");
        Ok(())
    }

    /// Whether the user has favorited the artwork.
    pub async fn is_favorited(&self, user_id: &str, artwork_id: &str) -> AppResult<bool> {
        self.favorite_repo.is_favorited(user_id, artwork_id).await
    }

    /// Artworks the user favorited that they can still see, newest favorite
    /// first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<artwork::Model>> {
        let favorites = self.favorite_repo.find_by_user(user_id).await?;
        let ids: Vec<String> = favorites.iter().map(|f| f.artwork_id.clone()).collect();

        let mut by_id: HashMap<String, artwork::Model> = self
            .artwork_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        let ordered = ids.iter().filter_map(|id| by_id.remove(id)).collect();
        Ok(visibility::filter_visible(ordered, Some(user_id)))
    }
}
