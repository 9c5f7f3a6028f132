/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Identity endpoints (register, login, me, password reset, avatar)
/// - `artists`: Artist profile endpoints
/// - `artworks`: Gallery endpoints (uploads, listing, likes)
/// - `forum`: Forum posts and their comments
/// - `challenges`: Weekly challenge lookups
/// - `submissions`: Challenge entries and their comments

use artloop_shared::models::LikeStatus;
use serde::Serialize;

pub mod artists;
pub mod artworks;
pub mod auth;
pub mod challenges;
pub mod forum;
pub mod health;
pub mod submissions;

/// Like toggle response, shared by every likeable resource
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    /// Whether the caller likes the resource after the toggle
    pub liked: bool,

    /// Like count after the toggle
    pub like_count: i64,
}

impl From<LikeStatus> for LikeResponse {
    fn from(status: LikeStatus) -> Self {
        Self {
            liked: status.liked,
            like_count: status.like_count,
        }
    }
}
