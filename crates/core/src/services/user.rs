//! User profiles.

use std::sync::Arc;

use crate::services::visibility;
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use tokapu_common::{AppError, AppResult, IdGenerator};
use tokapu_db::{
    entities::user,
    repositories::{
        ArtworkRepository, CommentRepository, FavoriteRepository, FollowerRepository,
        UserRepository,
    },
};
use validator::Validate;

/// Input for creating a user record.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_artist: bool,
}

/// Input for a partial profile update. `Some(None)` clears a field.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(max = 100))]
    pub full_name: Option<Option<String>>,
    #[validate(length(max = 1000))]
    pub bio: Option<Option<String>>,
    #[validate(length(max = 100))]
    pub city: Option<Option<String>>,
    #[validate(length(max = 500))]
    pub profile_photo_url: Option<Option<String>>,
    pub is_artist: Option<bool>,
    pub is_public: Option<bool>,
}

/// A profile with its counts, as seen by one viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: user::Model,
    pub artworks_count: u64,
    pub favorites_count: u64,
    pub comments_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    /// Whether the viewer follows this user.
    pub is_following: bool,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    artwork_repo: ArtworkRepository,
    favorite_repo: FavoriteRepository,
    comment_repo: CommentRepository,
    follower_repo: FollowerRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            user_repo: UserRepository::new(db.clone()),
            artwork_repo: ArtworkRepository::new(db.clone()),
            favorite_repo: FavoriteRepository::new(db.clone()),
            comment_repo: CommentRepository::new(db.clone()),
            follower_repo: FollowerRepository::new(db),
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a user record. Credentials are handled elsewhere.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.user_repo.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            email: Set(input.email),
            full_name: Set(input.full_name),
            bio: Set(None),
            city: Set(None),
            profile_photo_url: Set(None),
            is_artist: Set(input.is_artist),
            is_public: Set(true),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "User created");
        Ok(created)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Profile of `user_id` as seen by `viewer_id`.
    ///
    /// Private profiles are reported as missing to anyone who is neither
    /// the owner nor a follower.
    pub async fn profile(&self, user_id: &str, viewer_id: Option<&str>) -> AppResult<UserProfile> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let is_following = match viewer_id {
            Some(viewer) if viewer != user_id => {
                self.follower_repo.is_following(viewer, user_id).await?
            }
            _ => false,
        };

        if !visibility::can_view_profile(&user, viewer_id, is_following) {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }

        Ok(UserProfile {
            artworks_count: self.artwork_repo.count_by_owner(user_id).await?,
            favorites_count: self.favorite_repo.count_by_user(user_id).await?,
            comments_count: self.comment_repo.count_by_user(user_id).await?,
            followers_count: self.follower_repo.count_followers(user_id).await?,
            following_count: self.follower_repo.count_following(user_id).await?,
            is_following,
            user,
        })
    }

    /// Apply a partial profile update.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(full_name) = input.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(bio) = input.bio {
            active.bio = Set(bio);
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(url) = input.profile_photo_url {
            active.profile_photo_url = Set(url);
        }
        if let Some(is_artist) = input.is_artist {
            active.is_artist = Set(is_artist);
        }
        if let Some(is_public) = input.is_public {
            active.is_public = Set(is_public);
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }
}
