/// Database models and operations
///
/// Each model owns its table: the struct mirrors the row, and CRUD plus the
/// domain-specific operations (like toggles, view counters, weekly lookup)
/// live as async methods taking a `&PgPool`.
///
/// # Models
///
/// - [`user::User`]: Account records, credentials, password reset state
/// - [`artist::Artist`]: Artist profiles owned one-to-one by users
/// - [`artwork::Artwork`]: Gallery pieces with likes, views, tags
/// - [`forum_post::ForumPost`]: Community discussion posts
/// - [`comment::Comment`]: Comments attached to forum posts or submissions
/// - [`challenge::Challenge`]: Weekly art challenges
/// - [`submission::Submission`]: Challenge entries
use serde::Serialize;

pub mod artist;
pub mod artwork;
pub mod challenge;
pub mod comment;
pub mod forum_post;
pub mod submission;
pub mod user;

/// Outcome of a like toggle
///
/// Every likeable model (artworks, forum posts, comments, submissions)
/// returns this from its `toggle_like`: whether the caller now likes the
/// resource, and the total like count after the toggle.
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
pub struct LikeStatus {
    /// True if the caller likes the resource after the toggle
    pub liked: bool,

    /// Like count after the toggle
    pub like_count: i64,
}
