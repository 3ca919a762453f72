//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tokapu_common::{AppError, AppResult, IdGenerator};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a comment. The text is stored as given.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        artwork_id: &str,
        text: &str,
    ) -> AppResult<comment::Model> {
        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            artwork_id: Set(artwork_id.to_string()),
            user_id: Set(user_id.to_string()),
            comment_text: Set(text.to_string()),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment by ID.
    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        let result = Comment::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Comment not found: {id}")));
        }
        Ok(())
    }

    /// All comments on an artwork, newest first.
    pub async fn find_by_artwork(&self, artwork_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ArtworkId.eq(artwork_id))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The `limit` most recent comments on an artwork.
    pub async fn find_recent_by_artwork(
        &self,
        artwork_id: &str,
        limit: u64,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ArtworkId.eq(artwork_id))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments on an artwork.
    pub async fn count_by_artwork<C: ConnectionTrait>(
        &self,
        conn: &C,
        artwork_id: &str,
    ) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::ArtworkId.eq(artwork_id))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments written by a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_comment(id: &str, user_id: &str, text: &str, age_minutes: i64) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            artwork_id: "art1".to_string(),
            user_id: user_id.to_string(),
            comment_text: text.to_string(),
            created_at: (Utc::now() - Duration::minutes(age_minutes)).into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create() {
        let created = create_test_comment("c1", "user1", "Beautiful colours", 0);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created.clone()]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db.clone());
        let result = repo
            .create(db.as_ref(), "user1", "art1", "Beautiful colours")
            .await
            .unwrap();

        assert_eq!(result.comment_text, "Beautiful colours");
        assert_eq!(result.user_id, "user1");
    }

    #[tokio::test]
    async fn test_find_recent_by_artwork() {
        let newest = create_test_comment("c3", "user2", "third", 1);
        let middle = create_test_comment("c2", "user1", "second", 5);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[newest, middle]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.find_recent_by_artwork("art1", 2).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].comment_text, "third");
        assert!(result[0].created_at >= result[1].created_at);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = CommentRepository::new(db.clone());
        let result = repo.delete(db.as_ref(), "missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_count_by_artwork() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(4))
                }]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db.clone());
        assert_eq!(repo.count_by_artwork(db.as_ref(), "art1").await.unwrap(), 4);
    }
}
