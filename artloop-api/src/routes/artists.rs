/// Artist profile endpoints
///
/// A user has at most one artist profile; creating a second returns a
/// conflict. The profile's portfolio is never stored, it is computed from
/// the artworks that reference the profile.
///
/// # Endpoints
///
/// - `GET /artists` - Artists with a non-empty portfolio (public)
/// - `GET /artists/:id` - One profile with its portfolio (public)
/// - `POST /artists` - Create the caller's profile (bearer)
/// - `PUT /artists/:id` - Update own profile (bearer, owner only)
/// - `DELETE /artists/:id` - Delete own profile (bearer, owner only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use artloop_shared::{
    auth::{middleware::AuthUser, ownership::owner_only},
    models::{
        artist::{Artist, CreateArtist, UpdateArtist},
        artwork::Artwork,
        user::User,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create-profile request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtistRequest {
    /// Public artist name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Optional bio
    pub bio: Option<String>,

    /// Optional contact email
    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,

    /// Optional contact phone
    pub contact_phone: Option<String>,

    /// Optional website link
    pub website: Option<String>,

    /// Optional commission pricing description
    pub service_charges: Option<String>,
}

/// Update-profile request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtistRequest {
    /// New artist name
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,

    /// New bio
    pub bio: Option<String>,

    /// New contact email
    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,

    /// New contact phone
    pub contact_phone: Option<String>,

    /// New website link
    pub website: Option<String>,

    /// New commission pricing description
    pub service_charges: Option<String>,
}

/// Profile response including the computed portfolio
#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    /// Profile fields
    #[serde(flatten)]
    pub artist: Artist,

    /// Ids of the profile's artworks, newest first
    pub portfolio: Vec<Uuid>,
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct ArtistListResponse {
    /// Profiles with at least one artwork
    pub artists: Vec<Artist>,
}

/// Lists artists that have a non-empty portfolio
pub async fn list_artists(State(state): State<AppState>) -> ApiResult<Json<ArtistListResponse>> {
    let artists = Artist::list_with_artworks(&state.db).await?;
    Ok(Json(ArtistListResponse { artists }))
}

/// One artist profile with its computed portfolio
///
/// # Errors
///
/// - `404 Not Found`: No such profile
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ArtistResponse>> {
    let artist = Artist::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found".to_string()))?;

    let portfolio = Artwork::list_by_artist(&state.db, artist.id)
        .await?
        .into_iter()
        .map(|a| a.id)
        .collect();

    Ok(Json(ArtistResponse { artist, portfolio }))
}

/// Creates the caller's artist profile
///
/// Flips `is_artist` on the account as a side effect.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid token
/// - `409 Conflict`: Caller already has a profile
pub async fn create_artist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateArtistRequest>,
) -> ApiResult<(StatusCode, Json<ArtistResponse>)> {
    req.validate()?;

    let artist = Artist::create(
        &state.db,
        CreateArtist {
            owner_user_id: auth.user_id,
            name: req.name,
            bio: req.bio,
            contact_email: req.contact_email,
            contact_phone: req.contact_phone,
            website: req.website,
            service_charges: req.service_charges,
        },
    )
    .await?;

    User::set_is_artist(&state.db, auth.user_id, true).await?;

    Ok((
        StatusCode::CREATED,
        Json(ArtistResponse {
            artist,
            portfolio: Vec::new(),
        }),
    ))
}

/// Updates the caller's artist profile
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Caller does not own the profile
/// - `404 Not Found`: No such profile
pub async fn update_artist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateArtistRequest>,
) -> ApiResult<Json<ArtistResponse>> {
    req.validate()?;

    let artist = Artist::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found".to_string()))?;

    owner_only(artist.owner_user_id, auth.user_id)?;

    let artist = Artist::update(
        &state.db,
        id,
        UpdateArtist {
            name: req.name,
            bio: req.bio,
            contact_email: req.contact_email,
            contact_phone: req.contact_phone,
            website: req.website,
            service_charges: req.service_charges,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Artist not found".to_string()))?;

    let portfolio = Artwork::list_by_artist(&state.db, artist.id)
        .await?
        .into_iter()
        .map(|a| a.id)
        .collect();

    Ok(Json(ArtistResponse { artist, portfolio }))
}

/// Deletes the caller's artist profile
///
/// Reverts `is_artist` on the account. Artworks are detached rather than
/// deleted; their `artist_id` becomes NULL.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Caller does not own the profile
/// - `404 Not Found`: No such profile
pub async fn delete_artist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let artist = Artist::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found".to_string()))?;

    owner_only(artist.owner_user_id, auth.user_id)?;

    Artist::delete(&state.db, id).await?;
    User::set_is_artist(&state.db, auth.user_id, false).await?;

    Ok(StatusCode::NO_CONTENT)
}
