//! Artwork repository.
//!
//! Counter columns are only ever written through [`ArtworkRepository::adjust_counter`]
//! and [`ArtworkRepository::set_counters`]; `update` leaves them alone.

use std::sync::Arc;

use crate::entities::{
    Artwork,
    artwork::{self, ArtworkStatus, ArtworkType, EngagementCounter},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};
use tokapu_common::{AppError, AppResult};

/// Artwork repository for database operations.
#[derive(Clone)]
pub struct ArtworkRepository {
    db: Arc<DatabaseConnection>,
}

impl ArtworkRepository {
    /// Create a new artwork repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an artwork by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<artwork::Model>> {
        Artwork::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an artwork by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<artwork::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ArtworkNotFound(id.to_string()))
    }

    /// Load an artwork and take a row lock on it (`SELECT ... FOR UPDATE`).
    ///
    /// Must be called inside a transaction; the lock is held until it ends.
    pub async fn find_for_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<artwork::Model> {
        Artwork::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::ArtworkNotFound(id.to_string()))
    }

    /// Find artworks by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<artwork::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Artwork::find()
            .filter(artwork::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new artwork.
    pub async fn create(&self, model: artwork::ActiveModel) -> AppResult<artwork::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an artwork.
    pub async fn update(&self, model: artwork::ActiveModel) -> AppResult<artwork::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an artwork. Relations cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Artwork::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::ArtworkNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Approved, active artworks, newest first.
    pub async fn find_approved(&self, limit: u64, offset: u64) -> AppResult<Vec<artwork::Model>> {
        Artwork::find()
            .filter(artwork::Column::Status.eq(ArtworkStatus::Approved))
            .filter(artwork::Column::IsActive.eq(true))
            .order_by_desc(artwork::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Artworks owned by a user, newest first. With `visible_only` the page
    /// holds only approved, active ones, so hidden rows never eat into it.
    pub async fn find_by_owner(
        &self,
        user_id: &str,
        visible_only: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<artwork::Model>> {
        let mut query = Artwork::find().filter(artwork::Column::UserId.eq(user_id));
        if visible_only {
            query = query
                .filter(artwork::Column::Status.eq(ArtworkStatus::Approved))
                .filter(artwork::Column::IsActive.eq(true));
        }

        query
            .order_by_desc(artwork::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Approved, active artworks of one type, newest first.
    pub async fn find_approved_by_type(
        &self,
        artwork_type: ArtworkType,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<artwork::Model>> {
        Artwork::find()
            .filter(artwork::Column::Status.eq(ArtworkStatus::Approved))
            .filter(artwork::Column::IsActive.eq(true))
            .filter(artwork::Column::ArtworkType.eq(artwork_type))
            .order_by_desc(artwork::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Case-insensitive substring search over title, description and artist.
    ///
    /// Only approved, active artworks are returned. Results are newest first;
    /// there is no relevance ranking.
    pub async fn search(
        &self,
        query: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<artwork::Model>> {
        let pattern = like_pattern(query);

        let text_match = Condition::any()
            .add(Expr::expr(Func::lower(Expr::col(artwork::Column::Title))).like(pattern.as_str()))
            .add(
                Expr::expr(Func::lower(Expr::col(artwork::Column::Description)))
                    .like(pattern.as_str()),
            )
            .add(
                Expr::expr(Func::lower(Expr::col(artwork::Column::ArtistName)))
                    .like(pattern.as_str()),
            );

        Artwork::find()
            .filter(artwork::Column::Status.eq(ArtworkStatus::Approved))
            .filter(artwork::Column::IsActive.eq(true))
            .filter(text_match)
            .order_by_desc(artwork::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Approved, active artworks whose coordinates fall inside the given box
    /// (bounds inclusive). No ordering is applied.
    pub async fn find_in_box(
        &self,
        min_lat: Decimal,
        max_lat: Decimal,
        min_lng: Decimal,
        max_lng: Decimal,
    ) -> AppResult<Vec<artwork::Model>> {
        Artwork::find()
            .filter(artwork::Column::Status.eq(ArtworkStatus::Approved))
            .filter(artwork::Column::IsActive.eq(true))
            .filter(artwork::Column::Latitude.between(min_lat, max_lat))
            .filter(artwork::Column::Longitude.between(min_lng, max_lng))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count artworks owned by a user.
    pub async fn count_by_owner(&self, user_id: &str) -> AppResult<u64> {
        Artwork::find()
            .filter(artwork::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Engagement Counters ====================

    /// Add `delta` to one counter in a single statement, flooring at zero.
    ///
    /// A NULL column is read as 0. Fails with `ArtworkNotFound` when no row
    /// matched.
    pub async fn adjust_counter<C: ConnectionTrait>(
        &self,
        conn: &C,
        artwork_id: &str,
        counter: EngagementCounter,
        delta: i32,
    ) -> AppResult<()> {
        let col = counter.column_name();

        let result = Artwork::update_many()
            .col_expr(
                counter.column(),
                Expr::cust(format!("GREATEST(COALESCE({col}, 0) + ({delta}), 0)")),
            )
            .filter(artwork::Column::Id.eq(artwork_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::ArtworkNotFound(artwork_id.to_string()));
        }
        Ok(())
    }

    /// Overwrite several counters at once. Negative values are stored as 0.
    pub async fn set_counters<C: ConnectionTrait>(
        &self,
        conn: &C,
        artwork_id: &str,
        values: &[(EngagementCounter, i32)],
    ) -> AppResult<()> {
        if values.is_empty() {
            return Ok(());
        }

        let mut update = Artwork::update_many();
        for &(counter, value) in values {
            update = update.col_expr(counter.column(), Expr::value(value.max(0)));
        }

        let result = update
            .filter(artwork::Column::Id.eq(artwork_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::ArtworkNotFound(artwork_id.to_string()));
        }
        Ok(())
    }
}

/// Lower-cased `%query%` pattern with the LIKE metacharacters escaped.
/// Backslash goes first since it is the escape character itself.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
