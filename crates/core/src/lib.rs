//! Engagement and discovery logic for Tokapu.
//!
//! Services here sit between the HTTP layer and the repositories in
//! `tokapu-db`. Every change to a reaction, favorite or comment runs in one
//! transaction with the artwork row locked, and updates the matching
//! counter through [`CounterSync`].

pub mod services;

pub use services::*;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokapu_common::Config;
use tokapu_db::repositories::ArtworkRepository;

/// All services, wired to one connection pool.
#[derive(Clone)]
pub struct Services {
    /// Artwork catalogue.
    pub artworks: ArtworkService,
    /// Comments.
    pub comments: CommentService,
    /// Counter maintenance.
    pub counters: CounterSync,
    /// Favorites.
    pub favorites: FavoriteService,
    /// Nearby search.
    pub proximity: ProximityFilter,
    /// Reactions.
    pub reactions: ReactionEngine,
    /// Follows.
    pub social: SocialGraph,
    /// Profiles.
    pub users: UserService,
}

impl Services {
    /// Build every service from the pool and configuration.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        Self {
            artworks: ArtworkService::new(db.clone(), config.engagement.clone()),
            comments: CommentService::new(db.clone(), config.engagement.clone()),
            counters: CounterSync::new(db.clone()),
            favorites: FavoriteService::new(db.clone()),
            proximity: ProximityFilter::new(
                ArtworkRepository::new(db.clone()),
                config.proximity.clone(),
            ),
            reactions: ReactionEngine::new(db.clone()),
            social: SocialGraph::new(db.clone()),
            users: UserService::new(db),
        }
    }
}
