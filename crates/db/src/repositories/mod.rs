//! Database repositories.

pub mod artwork;
pub mod comment;
pub mod favorite;
pub mod follower;
pub mod reaction;
pub mod relation;
pub mod user;

pub use artwork::ArtworkRepository;
pub use comment::CommentRepository;
pub use favorite::FavoriteRepository;
pub use follower::FollowerRepository;
pub use reaction::ReactionRepository;
pub use relation::RelationshipStore;
pub use user::UserRepository;
