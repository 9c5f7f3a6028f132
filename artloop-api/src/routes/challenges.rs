/// Weekly challenge endpoints
///
/// Challenges are provisioned ahead of time, one per ISO week; these routes
/// only read. Openness is computed at read time from the manual flag and
/// the deadline, never stored.
///
/// # Endpoints
///
/// - `GET /challenge` - All challenges, most recent week first
/// - `GET /challenge/weekly` - The challenge for the current ISO week
/// - `GET /challenge/:id` - One challenge by id

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use artloop_shared::models::challenge::Challenge;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Challenge with its openness evaluated against the current clock
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    /// Challenge fields
    #[serde(flatten)]
    pub challenge: Challenge,

    /// Whether submissions are accepted right now
    pub is_open: bool,
}

impl ChallengeResponse {
    fn now(challenge: Challenge) -> Self {
        let is_open = challenge.is_open(Utc::now());
        Self { challenge, is_open }
    }
}

/// All challenges, most recent week first
pub async fn list_challenges(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ChallengeResponse>>> {
    let challenges = Challenge::list(&state.db)
        .await?
        .into_iter()
        .map(ChallengeResponse::now)
        .collect();

    Ok(Json(challenges))
}

/// The challenge for the current ISO week
///
/// # Errors
///
/// - `404 Not Found`: No challenge row for this week
pub async fn weekly_challenge(
    State(state): State<AppState>,
) -> ApiResult<Json<ChallengeResponse>> {
    let challenge = Challenge::find_current(&state.db, Utc::now())
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("No weekly challenge found for the current week.".to_string())
        })?;

    Ok(Json(ChallengeResponse::now(challenge)))
}

/// One challenge by id
///
/// # Errors
///
/// - `404 Not Found`: No such challenge
pub async fn get_challenge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ChallengeResponse>> {
    let challenge = Challenge::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Challenge not found".to_string()))?;

    Ok(Json(ChallengeResponse::now(challenge)))
}
