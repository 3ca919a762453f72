//! Who gets to see which artworks and profiles.
//!
//! A hidden artwork is reported as missing (`ArtworkNotFound`), and a hidden
//! profile as `UserNotFound`, so callers cannot probe for their existence.

use tokapu_common::{AppError, AppResult};
use tokapu_db::entities::{
    artwork::{self, ArtworkStatus},
    user,
};

/// Owners always see their artworks; everyone else only sees approved,
/// active ones.
#[must_use]
pub fn is_visible(artwork: &artwork::Model, viewer_id: Option<&str>) -> bool {
    if viewer_id == Some(artwork.user_id.as_str()) {
        return true;
    }
    artwork.status == ArtworkStatus::Approved && artwork.is_active
}

/// Drop the artworks the viewer may not see, keeping order.
#[must_use]
pub fn filter_visible(
    artworks: Vec<artwork::Model>,
    viewer_id: Option<&str>,
) -> Vec<artwork::Model> {
    artworks
        .into_iter()
        .filter(|a| is_visible(a, viewer_id))
        .collect()
}

/// Pass a visible artwork through, or fail as if it did not exist.
pub fn ensure_visible(
    artwork: artwork::Model,
    viewer_id: Option<&str>,
) -> AppResult<artwork::Model> {
    if is_visible(&artwork, viewer_id) {
        Ok(artwork)
    } else {
        Err(AppError::ArtworkNotFound(artwork.id))
    }
}

/// Public profiles are open to all. Private ones are open to their owner and
/// to users who follow them.
#[must_use]
pub fn can_view_profile(user: &user::Model, viewer_id: Option<&str>, viewer_follows: bool) -> bool {
    user.is_public || viewer_id == Some(user.id.as_str()) || viewer_follows
}
