//! Social graph: who follows whom.
//!
//! Follower and following counts are not stored; they are counted from the
//! follow rows whenever they are asked for.

use std::sync::Arc;

use tokapu_common::{AppError, AppResult};
use tokapu_db::{
    entities::follower,
    repositories::{FollowerRepository, RelationshipStore, UserRepository},
};
use sea_orm::DatabaseConnection;

/// Follow/unfollow between users.
#[derive(Clone)]
pub struct SocialGraph {
    db: Arc<DatabaseConnection>,
    follower_repo: FollowerRepository,
    user_repo: UserRepository,
}

impl SocialGraph {
    /// Create a new social graph service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            follower_repo: FollowerRepository::new(db.clone()),
            user_repo: UserRepository::new(db.clone()),
            db,
        }
    }

    /// Follow a user.
    pub async fn follow(&self, follower_id: &str, following_id: &str) -> AppResult<follower::Model> {
        if follower_id == following_id {
            return Err(AppError::Validation("Cannot follow yourself".to_string()));
        }

        self.user_repo.get_by_id(following_id).await?;

        let follow = self
            .follower_repo
            .create(self.db.as_ref(), follower_id, following_id, ())
            .await?;

        tracing::debug!(
            follower_id = %follower_id,
            following_id = %following_id,
            "Followed user"
        );
        Ok(follow)
    }

    /// Stop following a user.
    pub async fn unfollow(&self, follower_id: &str, following_id: &str) -> AppResult<()> {
        self.follower_repo
            .delete(self.db.as_ref(), follower_id, following_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("Not following".to_string()),
                other => other,
            })?;

        tracing::debug!(
            follower_id = %follower_id,
            following_id = %following_id,
            "Unfollowed user"
        );
        Ok(())
    }

    /// Whether `follower_id` follows `following_id`.
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        self.follower_repo
            .is_following(follower_id, following_id)
            .await
    }

    /// Number of users following `user_id`.
    pub async fn followers_count(&self, user_id: &str) -> AppResult<u64> {
        self.follower_repo.count_followers(user_id).await
    }

    /// Number of users `user_id` follows.
    pub async fn following_count(&self, user_id: &str) -> AppResult<u64> {
        self.follower_repo.count_following(user_id).await
    }

    /// Follow rows pointing at `user_id`, newest first.
    pub async fn followers(&self, user_id: &str) -> AppResult<Vec<follower::Model>> {
        self.follower_repo.find_followers(user_id).await
    }

    /// Follow rows originating from `user_id`, newest first.
    pub async fn following(&self, user_id: &str) -> AppResult<Vec<follower::Model>> {
        self.follower_repo.find_following(user_id).await
    }
}
