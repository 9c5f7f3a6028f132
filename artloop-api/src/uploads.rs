/// Multipart image intake and storage
///
/// Uploaded images are written to the configured upload directory under a
/// generated `image-<uuid>.<ext>` name and referenced from the database by
/// their `uploads/<file>` path, which is also where the static file layer
/// serves them. Validation happens before anything touches disk: content
/// type first, then the per-kind size cap.

use bytes::Bytes;
use uuid::Uuid;

use crate::error::ApiError;

/// Maximum accepted artwork image size
pub const ARTWORK_MAX_BYTES: usize = 25 * 1024 * 1024;

/// Maximum accepted avatar and submission image size
pub const AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;

/// What an uploaded image is for
///
/// The kind decides both the size cap and which content types are accepted:
/// gallery artwork is restricted to PNG/JPEG, avatars and challenge
/// submissions take any image type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Artwork,
    Avatar,
    Submission,
}

impl ImageKind {
    /// Size cap for this kind
    pub fn max_bytes(&self) -> usize {
        match self {
            Self::Artwork => ARTWORK_MAX_BYTES,
            Self::Avatar | Self::Submission => AVATAR_MAX_BYTES,
        }
    }

    /// Checks whether a content type is acceptable for this kind
    fn accepts(&self, content_type: &str) -> bool {
        match self {
            Self::Artwork => matches!(content_type, "image/png" | "image/jpeg"),
            Self::Avatar | Self::Submission => content_type.starts_with("image/"),
        }
    }
}

/// File extension for a content type
fn extension_for(content_type: &str) -> String {
    match content_type {
        "image/png" => "png".to_string(),
        "image/jpeg" => "jpg".to_string(),
        "image/gif" => "gif".to_string(),
        "image/webp" => "webp".to_string(),
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| "img".to_string()),
    }
}

/// Validates an uploaded image without touching disk
///
/// # Errors
///
/// - `ApiError::BadRequest` when the content type is missing, not an
///   accepted image type, or the payload exceeds the kind's size cap
pub fn validate_image(
    kind: ImageKind,
    content_type: Option<&str>,
    data: &Bytes,
) -> Result<(), ApiError> {
    let content_type = content_type
        .ok_or_else(|| ApiError::BadRequest("Missing image content type".to_string()))?;

    if !kind.accepts(content_type) {
        return Err(ApiError::BadRequest(format!(
            "Unsupported image type: {}",
            content_type
        )));
    }

    if data.len() > kind.max_bytes() {
        return Err(ApiError::BadRequest(format!(
            "Image too large: limit is {} bytes",
            kind.max_bytes()
        )));
    }

    Ok(())
}

/// Validates and stores an uploaded image
///
/// # Returns
///
/// The `uploads/<file>` path to store in the database
///
/// # Errors
///
/// - `ApiError::BadRequest` when validation fails
/// - `ApiError::InternalError` when the file cannot be written
pub async fn save_image(
    upload_dir: &str,
    kind: ImageKind,
    content_type: Option<&str>,
    data: Bytes,
) -> Result<String, ApiError> {
    validate_image(kind, content_type, &data)?;

    // validate_image guarantees the content type is present
    let content_type = content_type.unwrap_or_default();
    let filename = format!("image-{}.{}", Uuid::new_v4(), extension_for(content_type));
    let disk_path = format!("{}/{}", upload_dir, filename);

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to create upload dir: {}", e)))?;

    tokio::fs::write(&disk_path, &data)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to store image: {}", e)))?;

    tracing::debug!(path = %disk_path, bytes = data.len(), "stored uploaded image");

    Ok(format!("uploads/{}", filename))
}

/// Removes a stored image, ignoring files that are already gone
pub async fn remove_image(upload_dir: &str, stored_path: &str) {
    let filename = stored_path.trim_start_matches("uploads/");
    let disk_path = format!("{}/{}", upload_dir, filename);

    if let Err(e) = tokio::fs::remove_file(&disk_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %disk_path, error = %e, "failed to remove stored image");
        }
    }
}
