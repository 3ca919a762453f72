//! Database entities.

#![allow(missing_docs)]

pub mod artwork;
pub mod artwork_reaction;
pub mod comment;
pub mod favorite;
pub mod follower;
pub mod user;

pub use artwork::Entity as Artwork;
pub use artwork_reaction::Entity as ArtworkReaction;
pub use comment::Entity as Comment;
pub use favorite::Entity as Favorite;
pub use follower::Entity as Follower;
pub use user::Entity as User;
