/// Identity endpoints
///
/// This module provides account endpoints:
/// - Registration and login
/// - Current-user resolution
/// - Password reset flow
/// - Avatar upload
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new account
/// - `POST /auth/login` - Login and get a bearer token
/// - `GET /auth/me` - Current user (bearer)
/// - `PUT /auth/me` - Update username/bio (bearer)
/// - `GET /auth/logout` - Stateless logout acknowledgement
/// - `POST /auth/forgot-password` - Request a reset link
/// - `POST /auth/reset-password` - Redeem a reset token
/// - `POST /auth/avatar` - Upload an avatar image (bearer, multipart)
/// - `DELETE /auth/avatar` - Remove the avatar (bearer)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    uploads::{self, ImageKind},
};
use artloop_shared::{
    auth::{
        jwt,
        middleware::AuthUser,
        password::{self, generate_reset_token},
    },
    models::{
        artist::Artist,
        user::{CreateUser, UpdateUser, User},
    },
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Username is required"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// The created account
    pub user: User,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The authenticated account
    pub user: User,

    /// Bearer token (1 hour)
    pub token: String,
}

/// Current-user response
///
/// The user fields flattened, plus the id of the caller's artist profile
/// when they have one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// Account fields
    #[serde(flatten)]
    pub user: User,

    /// Artist profile id, None when the user has no profile
    pub artist_id: Option<Uuid>,
}

/// Profile update request
///
/// Omitted fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    /// New display name
    #[validate(length(min = 1, max = 255, message = "Username cannot be empty"))]
    pub username: Option<String>,

    /// New bio
    pub bio: Option<String>,
}

/// Forgot-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Email address of the account
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Forgot-password response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    /// Status message
    pub message: String,

    /// The reset link, returned even when mail delivery fails
    pub reset_link: String,
}

/// Reset-password request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// The single-use reset token from the link
    pub token: String,

    /// Replacement password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Message-only response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Status message
    pub message: String,
}

/// Avatar response
#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    /// The updated account
    pub user: User,
}

/// Register a new account
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already exists
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// Login and get a bearer token
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    }

    let claims = jwt::Claims::new(user.id, &user.email);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(LoginResponse { user, token }))
}

/// Current user, augmented with their artist profile id
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: Account no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let artist_id = Artist::find_by_owner(&state.db, user.id).await?.map(|a| a.id);

    Ok(Json(MeResponse { user, artist_id }))
}

/// Logout acknowledgement
///
/// Tokens are stateless and simply expire; clients discard theirs on
/// logout. The endpoint exists so clients have something to call.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out".to_string(),
    })
}

/// Update the caller's username and bio
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: Account no longer exists
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<MeResponse>> {
    req.validate()?;

    let user = User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            username: req.username,
            bio: req.bio,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let artist_id = Artist::find_by_owner(&state.db, user.id).await?.map(|a| a.id);

    Ok(Json(MeResponse { user, artist_id }))
}

/// Request a password reset link
///
/// Stores a single-use token with a one-hour expiry on the account. Mail
/// delivery failure is non-fatal; the link is always returned to the caller.
///
/// # Errors
///
/// - `404 Not Found`: No account with that email
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<ForgotPasswordResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account with that email".to_string()))?;

    let token = generate_reset_token();
    let expires = Utc::now() + Duration::hours(1);
    User::set_reset_token(&state.db, user.id, &token, expires).await?;

    let reset_link = format!("{}/{}", state.config.mail.reset_link_base, token);

    if let Err(e) = state.mailer.send_password_reset(&user.email, &reset_link).await {
        tracing::warn!(error = %e, "reset mail delivery failed, returning link anyway");
    }

    Ok(Json(ForgotPasswordResponse {
        message: "Password reset link generated".to_string(),
        reset_link,
    }))
}

/// Redeem a reset token and set a new password
///
/// The token is single-use: redeeming it clears the stored token fields.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid or expired token, or weak password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let user = User::find_by_valid_reset_token(&state.db, &req.token)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    let password_hash = password::hash_password(&req.new_password)?;
    User::reset_password(&state.db, user.id, &password_hash).await?;

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}

/// Upload an avatar image
///
/// Multipart with an `avatar` field. Any `image/*` type up to 5 MB. A
/// previous avatar file is removed from disk after the new one is stored.
///
/// # Errors
///
/// - `400 Bad Request`: No file, wrong type, or too large
/// - `401 Unauthorized`: Missing or invalid token
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<Json<AvatarResponse>> {
    let mut stored: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("avatar") {
            let content_type = field.content_type().map(|ct| ct.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

            stored = Some(
                uploads::save_image(
                    &state.config.uploads.dir,
                    ImageKind::Avatar,
                    content_type.as_deref(),
                    data,
                )
                .await?,
            );
        }
    }

    let stored =
        stored.ok_or_else(|| ApiError::BadRequest("No avatar file uploaded".to_string()))?;

    let previous = User::find_by_id(&state.db, auth.user_id)
        .await?
        .and_then(|u| u.avatar);

    let user = User::set_avatar(&state.db, auth.user_id, Some(&stored))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if let Some(old) = previous {
        uploads::remove_image(&state.config.uploads.dir, &old).await;
    }

    Ok(Json(AvatarResponse { user }))
}

/// Remove the current avatar
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: Account no longer exists
pub async fn delete_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<AvatarResponse>> {
    let previous = User::find_by_id(&state.db, auth.user_id)
        .await?
        .and_then(|u| u.avatar);

    let user = User::set_avatar(&state.db, auth.user_id, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if let Some(old) = previous {
        uploads::remove_image(&state.config.uploads.dir, &old).await;
    }

    Ok(Json(AvatarResponse { user }))
}
