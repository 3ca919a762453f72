//! Follower repository.

use std::sync::Arc;

use async_trait::async_trait;
use crate::entities::{Follower, follower};
use crate::repositories::relation::{RelationshipStore, map_insert_err, relation_not_found};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tokapu_common::{AppError, AppResult, IdGenerator};

/// Follower repository for database operations.
///
/// As a [`RelationshipStore`] the actor is the follower and the target is
/// the followed user.
#[derive(Clone)]
pub struct FollowerRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl FollowerRepository {
    /// Create a new follower repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Check if `follower_id` follows `following_id`.
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        self.exists(self.db.as_ref(), follower_id, following_id)
            .await
    }

    /// Users following `user_id`, newest first.
    pub async fn find_followers(&self, user_id: &str) -> AppResult<Vec<follower::Model>> {
        Follower::find()
            .filter(follower::Column::FollowingId.eq(user_id))
            .order_by_desc(follower::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users `user_id` follows, newest first.
    pub async fn find_following(&self, user_id: &str) -> AppResult<Vec<follower::Model>> {
        Follower::find()
            .filter(follower::Column::FollowerId.eq(user_id))
            .order_by_desc(follower::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        Follower::find()
            .filter(follower::Column::FollowingId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users a user follows.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        Follower::find()
            .filter(follower::Column::FollowerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl RelationshipStore for FollowerRepository {
    type Model = follower::Model;
    type Payload = ();

    const KIND: &'static str = "Follow";

    async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
    ) -> AppResult<Option<Self::Model>> {
        Follower::find()
            .filter(follower::Column::FollowerId.eq(actor_id))
            .filter(follower::Column::FollowingId.eq(target_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
        _payload: (),
    ) -> AppResult<Self::Model> {
        if self.exists(conn, actor_id, target_id).await? {
            return Err(AppError::Conflict("Already following".to_string()));
        }

        let model = follower::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(actor_id.to_string()),
            following_id: Set(target_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
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
        let result = Follower::delete_many()
            .filter(follower::Column::FollowerId.eq(actor_id))
            .filter(follower::Column::FollowingId.eq(target_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(relation_not_found(Self::KIND));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_follow(id: &str, follower_id: &str, following_id: &str) -> follower::Model {
        follower::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_following() {
        let follow = create_test_follow("f1", "alice", "bob");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[follow]])
                .append_query_results([Vec::<follower::Model>::new()])
                .into_connection(),
        );

        let repo = FollowerRepository::new(db);
        assert!(repo.is_following("alice", "bob").await.unwrap());
        assert!(!repo.is_following("bob", "alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let follow = create_test_follow("f1", "alice", "bob");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[follow]])
                .into_connection(),
        );

        let repo = FollowerRepository::new(db.clone());
        match repo.create(db.as_ref(), "alice", "bob", ()).await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "Already following"),
            other => panic!("Expected Conflict error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = FollowerRepository::new(db.clone());
        assert!(repo.delete(db.as_ref(), "alice", "bob").await.is_ok());
    }

    #[tokio::test]
    async fn test_counts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(12))
                }]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );

        let repo = FollowerRepository::new(db);
        assert_eq!(repo.count_followers("bob").await.unwrap(), 12);
        assert_eq!(repo.count_following("bob").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_followers() {
        let f1 = create_test_follow("f2", "carol", "bob");
        let f2 = create_test_follow("f1", "alice", "bob");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[f1, f2]])
                .into_connection(),
        );

        let repo = FollowerRepository::new(db);
        let followers = repo.find_followers("bob").await.unwrap();

        assert_eq!(followers.len(), 2);
        assert!(followers.iter().all(|f| f.following_id == "bob"));
    }
}
