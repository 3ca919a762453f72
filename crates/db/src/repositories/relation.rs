//! Exactly-one-per-(actor, target) relation store.
//!
//! Reactions, favorites and follows all share the same shape: a row keyed
//! by an actor and a target, protected by a unique index on the pair. The
//! store re-checks that invariant before writing so callers get a domain
//! error (`Conflict` / `NotFound`) rather than a raw constraint violation,
//! and maps the constraint violation itself to `Conflict` for the race
//! that slips between the check and the insert.
//!
//! Every method takes the connection explicitly so the same call can run
//! against the pool or inside a `DatabaseTransaction`.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbErr, SqlErr};
use tokapu_common::{AppError, AppResult};

/// Contract shared by the relation repositories.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// The stored relation row.
    type Model: Send + Sync;
    /// Data carried by the relation besides its endpoints.
    type Payload: Send;

    /// Human-readable relation name used in error messages.
    const KIND: &'static str;

    /// Look up the relation for `(actor, target)`.
    async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
    ) -> AppResult<Option<Self::Model>>;

    /// Whether `(actor, target)` has a live relation.
    async fn exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
    ) -> AppResult<bool> {
        Ok(self.find(conn, actor_id, target_id).await?.is_some())
    }

    /// Create the relation. Fails with `Conflict` if one already exists.
    async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
        payload: Self::Payload,
    ) -> AppResult<Self::Model>;

    /// Delete the relation. Fails with `NotFound` if there is none.
    async fn delete<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
    ) -> AppResult<()>;
}

/// Map an insert failure, turning unique-key violations into `Conflict`.
pub(crate) fn map_insert_err(kind: &str, err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("{kind} already exists"))
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// `NotFound` for a relation that is not there.
pub(crate) fn relation_not_found(kind: &str) -> AppError {
    AppError::NotFound(format!("{kind} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_insert_err_passes_through_other_errors() {
        let err = map_insert_err("Favorite", DbErr::Custom("connection reset".to_string()));
        match err {
            AppError::Database(msg) => assert!(msg.contains("connection reset")),
            other => panic!("Expected Database error, got {other:?}"),
        }
    }

    #[test]
    fn test_relation_not_found_message() {
        match relation_not_found("Reaction") {
            AppError::NotFound(msg) => assert_eq!(msg, "Reaction not found"),
            other => panic!("Expected NotFound error, got {other:?}"),
        }
    }
}
