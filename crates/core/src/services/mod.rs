//! Business logic services.

#![allow(missing_docs)]

pub mod artwork;
pub mod comment;
pub mod counter;
pub mod favorite;
pub mod following;
pub mod proximity;
pub mod reaction;
pub mod user;
pub mod visibility;

pub use artwork::{
    ArtworkService, ArtworkView, CreateArtworkInput, ReactionCounts, UpdateArtworkInput,
};
pub use comment::CommentService;
pub use counter::{CounterSync, CounterTally, Reconciliation};
pub use favorite::FavoriteService;
pub use following::SocialGraph;
pub use proximity::{BoundingBox, ProximityFilter};
pub use reaction::{ReactionEngine, ReactionOutcome, ReactionTransition};
pub use user::{CreateUserInput, UpdateProfileInput, UserProfile, UserService};
