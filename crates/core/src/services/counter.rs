//! Engagement counter synchronisation.
//!
//! All writes to the denormalised artwork counters go through [`CounterSync`].
//! Relation mutations call [`CounterSync::adjust`] with the same transaction
//! they used for the relation row, after locking the artwork with
//! [`ArtworkRepository::find_for_update`].

use std::sync::Arc;

use serde::Serialize;
use tokapu_common::AppResult;
use tokapu_db::{
    entities::{
        artwork::{self, EngagementCounter},
        artwork_reaction::ReactionType,
    },
    repositories::{ArtworkRepository, CommentRepository, FavoriteRepository, ReactionRepository},
};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

/// Relation-backed counters of one artwork.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterTally {
    pub likes: i32,
    pub loves: i32,
    pub wows: i32,
    pub claps: i32,
    pub favorites: i32,
    pub comments: i32,
}

impl CounterTally {
    /// Read the stored counters off an artwork row.
    #[must_use]
    pub const fn from_artwork(artwork: &artwork::Model) -> Self {
        Self {
            likes: artwork.likes_count,
            loves: artwork.loves_count,
            wows: artwork.wows_count,
            claps: artwork.claps_count,
            favorites: artwork.favorites_count,
            comments: artwork.comments_count,
        }
    }

    /// Stored value for a reaction type.
    #[must_use]
    pub const fn reactions(&self, reaction_type: ReactionType) -> i32 {
        match reaction_type {
            ReactionType::Like => self.likes,
            ReactionType::Love => self.loves,
            ReactionType::Wow => self.wows,
            ReactionType::Clap => self.claps,
        }
    }

    fn as_pairs(self) -> [(EngagementCounter, i32); 6] {
        [
            (EngagementCounter::Likes, self.likes),
            (EngagementCounter::Loves, self.loves),
            (EngagementCounter::Wows, self.wows),
            (EngagementCounter::Claps, self.claps),
            (EngagementCounter::Favorites, self.favorites),
            (EngagementCounter::Comments, self.comments),
        ]
    }
}

/// Result of [`CounterSync::reconcile`].
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub artwork_id: String,
    pub before: CounterTally,
    pub after: CounterTally,
}

impl Reconciliation {
    /// Whether any stored counter disagreed with its relations.
    #[must_use]
    pub fn drifted(&self) -> bool {
        self.before != self.after
    }
}

/// Keeps artwork counters in step with relation rows.
#[derive(Clone)]
pub struct CounterSync {
    db: Arc<DatabaseConnection>,
    artwork_repo: ArtworkRepository,
    reaction_repo: ReactionRepository,
    favorite_repo: FavoriteRepository,
    comment_repo: CommentRepository,
}

impl CounterSync {
    /// Create a new counter sync service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            artwork_repo: ArtworkRepository::new(db.clone()),
            reaction_repo: ReactionRepository::new(db.clone()),
            favorite_repo: FavoriteRepository::new(db.clone()),
            comment_repo: CommentRepository::new(db.clone()),
            db,
        }
    }

    /// Apply `delta` to one counter, flooring at zero.
    ///
    /// `conn` should be the transaction that carries the matching relation
    /// change.
    pub async fn adjust<C: ConnectionTrait>(
        &self,
        conn: &C,
        artwork_id: &str,
        counter: EngagementCounter,
        delta: i32,
    ) -> AppResult<()> {
        if delta == 0 {
            return Ok(());
        }

        tracing::debug!(
            artwork_id = %artwork_id,
            counter = counter.column_name(),
            delta,
            "Adjusting engagement counter"
        );
        self.artwork_repo
            .adjust_counter(conn, artwork_id, counter, delta)
            .await
    }

    /// Count one view. Failures are logged and dropped.
    pub async fn record_view(&self, artwork_id: &str) {
        if let Err(e) = self
            .adjust(self.db.as_ref(), artwork_id, EngagementCounter::Views, 1)
            .await
        {
            tracing::warn!(artwork_id = %artwork_id, error = %e, "Failed to record view");
        }
    }

    /// Recompute reaction, favorite and comment counters from the relation
    /// tables and store them.
    pub async fn reconcile(&self, artwork_id: &str) -> AppResult<Reconciliation> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let artwork = self.artwork_repo.find_for_update(&txn, artwork_id).await?;
        let before = CounterTally::from_artwork(&artwork);

        let mut after = CounterTally::default();
        for reaction_type in ReactionType::ALL {
            let n = self
                .reaction_repo
                .count_by_artwork_and_type(&txn, artwork_id, reaction_type)
                .await? as i32;
            match reaction_type {
                ReactionType::Like => after.likes = n,
                ReactionType::Love => after.loves = n,
                ReactionType::Wow => after.wows = n,
                ReactionType::Clap => after.claps = n,
            }
        }
        after.favorites = self.favorite_repo.count_by_artwork(&txn, artwork_id).await? as i32;
        after.comments = self.comment_repo.count_by_artwork(&txn, artwork_id).await? as i32;

        if before != after {
            self.artwork_repo
                .set_counters(&txn, artwork_id, &after.as_pairs())
                .await?;
        }
        txn.commit().await.map_err(db_err)?;

        let result = Reconciliation {
            artwork_id: artwork_id.to_string(),
            before,
            after,
        };
        tracing::info!(
            artwork_id = %artwork_id,
            drifted = result.drifted(),
            "Reconciled engagement counters"
        );
        Ok(result)
    }
}

pub(crate) fn db_err(e: sea_orm::DbErr) -> tokapu_common::AppError {
    tokapu_common::AppError::Database(e.to_string())
}
