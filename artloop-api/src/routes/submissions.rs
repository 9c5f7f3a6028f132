/// Challenge submission endpoints
///
/// Entries are multipart uploads tied to a challenge. The submission window
/// is enforced server-side: a closed challenge (manual flag off or deadline
/// passed) rejects new entries. Submission comments live in the shared
/// comments table and survive independently of forum activity.
///
/// # Endpoints
///
/// - `GET /submissions/:id` - Entries for a challenge (public)
/// - `POST /submissions` - Submit an entry (bearer, multipart)
/// - `POST /submissions/:id/like` - Toggle like (bearer)
/// - `GET /submissions/:id/comments` - Entry comments (public)
/// - `POST /submissions/:id/comments` - Add a comment (bearer)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::LikeResponse,
    uploads::{self, ImageKind},
};
use artloop_shared::{
    auth::middleware::AuthUser,
    models::{
        challenge::Challenge,
        comment::{Comment, CommentParent, CreateComment},
        submission::{CreateSubmission, Submission},
    },
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Add-comment request
///
/// Submission comments call the body field `text`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    /// Comment text
    #[validate(length(min = 1, message = "Comment text is required"))]
    pub text: String,
}

/// Fields collected from a submission upload body
#[derive(Debug, Default)]
struct SubmissionFields {
    challenge_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    image: Option<(Option<String>, Bytes)>,
}

async fn collect_submission(multipart: &mut Multipart) -> ApiResult<SubmissionFields> {
    let mut fields = SubmissionFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("challengeId") => {
                fields.challenge_id = Some(read_text(field).await?);
            }
            Some("title") => fields.title = Some(read_text(field).await?),
            Some("description") => fields.description = Some(read_text(field).await?),
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

/// Entries for one challenge, newest first
///
/// # Errors
///
/// - `404 Not Found`: No such challenge
pub async fn list_submissions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Submission>>> {
    let challenge = Challenge::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Challenge not found".to_string()))?;

    let submissions = Submission::list_for_challenge(&state.db, challenge.id).await?;

    Ok(Json(submissions))
}

/// Submits an entry to a challenge
///
/// Multipart with `challengeId`, `title`, optional `description`, and an
/// `image` file (any `image/*`, up to 5 MB). The challenge must be open:
/// manual flag on and deadline not passed.
///
/// # Errors
///
/// - `400 Bad Request`: Missing challenge id, title, or image
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Submissions are closed
/// - `404 Not Found`: No such challenge
pub async fn create_submission(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Submission>)> {
    let fields = collect_submission(&mut multipart).await?;

    let challenge_id = fields
        .challenge_id
        .as_deref()
        .map(Uuid::from_str)
        .transpose()
        .map_err(|_| ApiError::BadRequest("Invalid challenge id".to_string()))?
        .ok_or_else(|| ApiError::BadRequest("Challenge id is required".to_string()))?;

    let challenge = Challenge::find_by_id(&state.db, challenge_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Challenge not found".to_string()))?;

    if !challenge.is_open(Utc::now()) {
        return Err(ApiError::Forbidden(
            "Submissions are closed for this challenge".to_string(),
        ));
    }

    let title = fields
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;
    let (content_type, data) = fields
        .image
        .ok_or_else(|| ApiError::BadRequest("No image file uploaded".to_string()))?;

    let image_file = uploads::save_image(
        &state.config.uploads.dir,
        ImageKind::Submission,
        content_type.as_deref(),
        data,
    )
    .await?;

    let submission = Submission::create(
        &state.db,
        CreateSubmission {
            challenge_id: challenge.id,
            user_id: auth.user_id,
            image_file,
            title,
            description: fields.description.filter(|d| !d.is_empty()),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// Toggles the caller's like on an entry
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such submission
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LikeResponse>> {
    let status = Submission::toggle_like(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    Ok(Json(status.into()))
}

/// Comments on one entry, oldest first
///
/// # Errors
///
/// - `404 Not Found`: No such submission
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    let submission = Submission::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    let comments =
        Comment::list_for_parent(&state.db, CommentParent::Submission, submission.id).await?;

    Ok(Json(comments))
}

/// Adds a comment to an entry
///
/// # Errors
///
/// - `400 Bad Request`: Empty comment text
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such submission
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate()?;

    let submission = Submission::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            parent_kind: CommentParent::Submission,
            parent_id: submission.id,
            author_id: auth.user_id,
            content: req.text,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
