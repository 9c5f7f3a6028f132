/// Gallery endpoints
///
/// Uploads arrive as multipart (text fields plus an `image` file) and are
/// validated before anything is stored; a rejected upload never creates a
/// row. Every mutation path resolves the artwork's owner through its artist
/// profile; guest uploads have no owner and are immutable.
///
/// # Endpoints
///
/// - `GET /artwork` - Public gallery with search/filter/pagination
/// - `GET /artwork/:id` - One artwork, bumps the view counter
/// - `POST /artwork/portfolio/upload` - Private portfolio upload (bearer)
/// - `POST /artwork/gallery/upload` - Public upload to own portfolio (bearer)
/// - `POST /artwork/public-upload` - Anonymous guest upload
/// - `GET /artwork/user/me` - Caller's own artworks (bearer)
/// - `PUT /artwork/:id` / `DELETE /artwork/:id` - Owner only (bearer)
/// - `POST /artwork/:id/like` - Toggle like (bearer)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::LikeResponse,
    uploads::{self, ImageKind},
};
use artloop_shared::{
    auth::{middleware::AuthUser, ownership::owner_only},
    models::{
        artist::Artist,
        artwork::{Artwork, ArtworkCategory, CreateArtwork, UpdateArtwork},
    },
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Default gallery page size
const DEFAULT_PAGE_SIZE: i64 = 12;

/// Gallery listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListArtworksQuery {
    /// 1-based page number
    pub page: Option<i64>,

    /// Page size
    pub limit: Option<i64>,

    /// Category filter; absent or "all" means unfiltered
    pub category: Option<String>,

    /// Case-insensitive substring search
    pub search: Option<String>,
}

/// Gallery listing response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListArtworksResponse {
    /// The page of artworks, newest first
    pub artworks: Vec<Artwork>,

    /// Total rows matching the filters
    pub total: i64,

    /// The returned page number
    pub current_page: i64,

    /// Total pages under the current page size
    pub total_pages: i64,
}

/// Update request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtworkRequest {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New category label
    pub category: Option<String>,

    /// Replacement tag list
    pub tags: Option<Vec<String>>,

    /// New visibility
    pub is_public: Option<bool>,
}

/// Text and file fields collected from an upload body
#[derive(Debug, Default)]
struct UploadFields {
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    tags: Option<String>,
    guest_name: Option<String>,
    image: Option<(Option<String>, Bytes)>,
}

/// Drains a multipart body into [`UploadFields`]
///
/// Unknown fields are ignored, matching lenient client behavior.
async fn collect_upload(multipart: &mut Multipart) -> ApiResult<UploadFields> {
    let mut fields = UploadFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("title") => fields.title = Some(read_text(field).await?),
            Some("description") => fields.description = Some(read_text(field).await?),
            Some("category") => fields.category = Some(read_text(field).await?),
            Some("tags") => fields.tags = Some(read_text(field).await?),
            Some("guestName") => fields.guest_name = Some(read_text(field).await?),
            Some("image") => {
                let content_type = field.content_type().map(|ct| ct.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
                fields.image = Some((content_type, data));
            }
            _ => {}
        }
    }

    Ok(fields)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart field: {}", e)))
}

/// Splits a comma-separated tags field into trimmed, non-empty tags
fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn parse_category(raw: Option<&str>) -> ApiResult<ArtworkCategory> {
    let raw = raw.ok_or_else(|| ApiError::BadRequest("Category is required".to_string()))?;
    ArtworkCategory::from_str(raw).map_err(ApiError::BadRequest)
}

/// Resolves the user id allowed to mutate an artwork
///
/// Guest uploads have no owning artist and can never be mutated.
async fn resolve_owner(state: &AppState, artwork: &Artwork) -> ApiResult<Uuid> {
    let artist_id = artwork.artist_id.ok_or_else(|| {
        ApiError::Forbidden("Guest artworks cannot be modified".to_string())
    })?;

    let artist = Artist::find_by_id(&state.db, artist_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Artwork has no owning artist".to_string()))?;

    Ok(artist.owner_user_id)
}

/// Public gallery listing
///
/// Only `is_public` artworks, newest first, with offset pagination.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown category label
pub async fn list_artworks(
    State(state): State<AppState>,
    Query(query): Query<ListArtworksQuery>,
) -> ApiResult<Json<ListArtworksResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let offset = (page - 1) * limit;

    let category = match query.category.as_deref() {
        None | Some("all") | Some("") => None,
        Some(raw) => Some(ArtworkCategory::from_str(raw).map_err(ApiError::BadRequest)?),
    };
    let search = query.search.as_deref().filter(|s| !s.is_empty());

    let artworks = Artwork::list_public(&state.db, category, search, limit, offset).await?;
    let total = Artwork::count_public(&state.db, category, search).await?;
    let total_pages = (total + limit - 1) / limit;

    Ok(Json(ListArtworksResponse {
        artworks,
        total,
        current_page: page,
        total_pages,
    }))
}

/// One artwork by id
///
/// Every read counts as a view; the returned row carries the incremented
/// counter.
///
/// # Errors
///
/// - `404 Not Found`: No such artwork
pub async fn get_artwork(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Artwork>> {
    let artwork = Artwork::fetch_and_bump_views(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artwork not found".to_string()))?;

    Ok(Json(artwork))
}

/// Upload to the caller's private portfolio
///
/// PNG or JPEG up to 25 MB. Created with `is_public = false`.
///
/// # Errors
///
/// - `400 Bad Request`: Missing title/category/image, or bad image
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: Caller has no artist profile
pub async fn portfolio_upload(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Artwork>)> {
    upload_for_artist(state, auth, multipart, false).await
}

/// Upload straight to the public gallery under the caller's profile
///
/// Identical to the portfolio upload except `is_public = true`.
pub async fn gallery_upload(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Artwork>)> {
    upload_for_artist(state, auth, multipart, true).await
}

async fn upload_for_artist(
    state: AppState,
    auth: AuthUser,
    mut multipart: Multipart,
    is_public: bool,
) -> ApiResult<(StatusCode, Json<Artwork>)> {
    let artist = Artist::find_by_owner(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist profile not found".to_string()))?;

    let fields = collect_upload(&mut multipart).await?;

    let title = fields
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;
    let category = parse_category(fields.category.as_deref())?;
    let (content_type, data) = fields
        .image
        .ok_or_else(|| ApiError::BadRequest("No image file uploaded".to_string()))?;

    let image_file = uploads::save_image(
        &state.config.uploads.dir,
        ImageKind::Artwork,
        content_type.as_deref(),
        data,
    )
    .await?;

    let artwork = Artwork::create(
        &state.db,
        CreateArtwork {
            title,
            description: fields.description.unwrap_or_default(),
            image_file,
            category,
            tags: parse_tags(fields.tags.as_deref()),
            artist_id: Some(artist.id),
            guest_artist_name: None,
            is_public,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(artwork)))
}

/// Anonymous guest upload
///
/// No authentication; the artwork is created without an owning artist and
/// is public immediately. Guest uploads can never be edited or deleted.
///
/// # Errors
///
/// - `400 Bad Request`: Missing title/category/image, or bad image
pub async fn public_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Artwork>)> {
    let fields = collect_upload(&mut multipart).await?;

    let title = fields
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;
    let category = parse_category(fields.category.as_deref())?;
    let (content_type, data) = fields
        .image
        .ok_or_else(|| ApiError::BadRequest("No image file uploaded".to_string()))?;

    let image_file = uploads::save_image(
        &state.config.uploads.dir,
        ImageKind::Artwork,
        content_type.as_deref(),
        data,
    )
    .await?;

    let artwork = Artwork::create(
        &state.db,
        CreateArtwork {
            title,
            description: fields.description.unwrap_or_default(),
            image_file,
            category,
            tags: parse_tags(fields.tags.as_deref()),
            artist_id: None,
            guest_artist_name: fields.guest_name.filter(|n| !n.is_empty()),
            is_public: true,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(artwork)))
}

/// The caller's own artworks, newest first
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
pub async fn my_artworks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Artwork>>> {
    let artworks = Artwork::list_by_owner_user(&state.db, auth.user_id).await?;
    Ok(Json(artworks))
}

/// Updates an artwork (owner only)
///
/// # Errors
///
/// - `400 Bad Request`: Unknown category label
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Caller is not the owner, or the artwork is a guest upload
/// - `404 Not Found`: No such artwork
pub async fn update_artwork(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateArtworkRequest>,
) -> ApiResult<Json<Artwork>> {
    let artwork = Artwork::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artwork not found".to_string()))?;

    let owner = resolve_owner(&state, &artwork).await?;
    owner_only(owner, auth.user_id)?;

    let category = match req.category.as_deref() {
        Some(raw) => Some(ArtworkCategory::from_str(raw).map_err(ApiError::BadRequest)?),
        None => None,
    };

    let artwork = Artwork::update(
        &state.db,
        id,
        UpdateArtwork {
            title: req.title,
            description: req.description,
            category,
            tags: req.tags,
            is_public: req.is_public,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Artwork not found".to_string()))?;

    Ok(Json(artwork))
}

/// Deletes an artwork (owner only)
///
/// The stored image file is removed after the row.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Caller is not the owner, or the artwork is a guest upload
/// - `404 Not Found`: No such artwork
pub async fn delete_artwork(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let artwork = Artwork::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artwork not found".to_string()))?;

    let owner = resolve_owner(&state, &artwork).await?;
    owner_only(owner, auth.user_id)?;

    Artwork::delete(&state.db, id).await?;
    uploads::remove_image(&state.config.uploads.dir, &artwork.image_file).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Toggles the caller's like on an artwork
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such artwork
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LikeResponse>> {
    let status = Artwork::toggle_like(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artwork not found".to_string()))?;

    Ok(Json(status.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags(Some("landscape, sunset ,  oil ")),
            vec!["landscape", "sunset", "oil"]
        );
        assert!(parse_tags(Some(" , ,")).is_empty());
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn test_parse_category() {
        assert!(parse_category(Some("Photography")).is_ok());
        assert!(parse_category(Some("Pottery")).is_err());
        assert!(parse_category(None).is_err());
    }
}
