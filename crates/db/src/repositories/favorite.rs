//! Favorite repository.

use std::sync::Arc;

use async_trait::async_trait;
use crate::entities::{Favorite, favorite};
use crate::repositories::relation::{RelationshipStore, map_insert_err, relation_not_found};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tokapu_common::{AppError, AppResult, IdGenerator};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Check if an artwork is favorited by a user.
    pub async fn is_favorited(&self, user_id: &str, artwork_id: &str) -> AppResult<bool> {
        self.exists(self.db.as_ref(), user_id, artwork_id).await
    }

    /// Favorites by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count favorites made by a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count favorites on an artwork.
    pub async fn count_by_artwork<C: ConnectionTrait>(
        &self,
        conn: &C,
        artwork_id: &str,
    ) -> AppResult<u64> {
        Favorite::find()
            .filter(favorite::Column::ArtworkId.eq(artwork_id))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl RelationshipStore for FavoriteRepository {
    type Model = favorite::Model;
    type Payload = ();

    const KIND: &'static str = "Favorite";

    async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
    ) -> AppResult<Option<Self::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(actor_id))
            .filter(favorite::Column::ArtworkId.eq(target_id))
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
            return Err(AppError::Conflict("Artwork already favorited".to_string()));
        }

        let model = favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(actor_id.to_string()),
            artwork_id: Set(target_id.to_string()),
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
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(actor_id))
            .filter(favorite::Column::ArtworkId.eq(target_id))
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

    fn create_test_favorite(id: &str, user_id: &str, artwork_id: &str) -> favorite::Model {
        favorite::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            artwork_id: artwork_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_favorited_true() {
        let fav = create_test_favorite("fav1", "user1", "art1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fav]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        assert!(repo.is_favorited("user1", "art1").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_new_favorite() {
        let fav = create_test_favorite("fav1", "user1", "art1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favorite::Model>::new()])
                .append_query_results([[fav]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db.clone());
        let created = repo.create(db.as_ref(), "user1", "art1", ()).await.unwrap();

        assert_eq!(created.user_id, "user1");
        assert_eq!(created.artwork_id, "art1");
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let fav = create_test_favorite("fav1", "user1", "art1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fav]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db.clone());
        match repo.create(db.as_ref(), "user1", "art1", ()).await {
            Err(AppError::Conflict(msg)) => assert!(msg.contains("already favorited")),
            other => panic!("Expected Conflict error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db.clone());
        assert!(matches!(
            repo.delete(db.as_ref(), "user1", "art1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let f1 = create_test_favorite("fav2", "user1", "art2");
        let f2 = create_test_favorite("fav1", "user1", "art1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[f1, f2]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        let favorites = repo.find_by_user("user1").await.unwrap();

        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].artwork_id, "art2");
    }

    #[tokio::test]
    async fn test_count_by_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(7))
                }]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        assert_eq!(repo.count_by_user("user1").await.unwrap(), 7);
    }
}
