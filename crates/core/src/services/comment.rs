//! Comments on artworks.

use std::sync::Arc;

use crate::services::counter::{CounterSync, db_err};
use crate::services::visibility;
use tokapu_common::{AppError, AppResult, EngagementConfig};
use tokapu_db::{
    entities::{artwork::EngagementCounter, comment},
    repositories::{ArtworkRepository, CommentRepository},
};
use sea_orm::{DatabaseConnection, TransactionTrait};

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    db: Arc<DatabaseConnection>,
    comment_repo: CommentRepository,
    artwork_repo: ArtworkRepository,
    counters: CounterSync,
    config: EngagementConfig,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: EngagementConfig) -> Self {
        Self {
            comment_repo: CommentRepository::new(db.clone()),
            artwork_repo: ArtworkRepository::new(db.clone()),
            counters: CounterSync::new(db.clone()),
            db,
            config,
        }
    }

    /// Comment on an artwork the user can see.
    pub async fn add(
        &self,
        user_id: &str,
        artwork_id: &str,
        text: &str,
    ) -> AppResult<comment::Model> {
        let text = self.validate_text(text)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let artwork = self.artwork_repo.find_for_update(&txn, artwork_id).await?;
        visibility::ensure_visible(artwork, Some(user_id))?;

        let created = self
            .comment_repo
            .create(&txn, user_id, artwork_id, text)
            .await?;
        self.counters
            .adjust(&txn, artwork_id, EngagementCounter::Comments, 1)
            .await?;

        txn.commit().await.map_err(db_err)?;

        tracing::debug!(
            user_id = %user_id,
            artwork_id = %artwork_id,
            comment_id = %created.id,
            "Comment added"
        );
        Ok(created)
    }

    /// All comments on an artwork, newest first.
    pub async fn list_for_artwork(
        &self,
        artwork_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        let artwork = self.artwork_repo.get_by_id(artwork_id).await?;
        visibility::ensure_visible(artwork, viewer_id)?;

        self.comment_repo.find_by_artwork(artwork_id).await
    }

    /// The configured number of most recent comments on an artwork.
    pub async fn recent_for_artwork(&self, artwork_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo
            .find_recent_by_artwork(artwork_id, self.config.recent_comments_limit)
            .await
    }

    /// Delete a comment. Only its author may do so.
    pub async fn delete(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment not found: {comment_id}")))?;

        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can delete this comment".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        self.artwork_repo
            .find_for_update(&txn, &comment.artwork_id)
            .await?;
        self.comment_repo.delete(&txn, comment_id).await?;
        self.counters
            .adjust(&txn, &comment.artwork_id, EngagementCounter::Comments, -1)
            .await?;

        txn.commit().await.map_err(db_err)?;

        tracing::debug!(
            user_id = %user_id,
            artwork_id = %comment.artwork_id,
            comment_id = %comment_id,
            "Comment deleted"
        );
        Ok(())
    }

    fn validate_text<'a>(&self, text: &'a str) -> AppResult<&'a str> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Comment text is required".to_string()));
        }
        if text.chars().count() > self.config.max_comment_length {
            return Err(AppError::Validation(format!(
                "Comment may not exceed {} characters",
                self.config.max_comment_length
            )));
        }
        Ok(text)
    }
}
