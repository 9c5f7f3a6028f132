/// Token extraction for Axum requests
///
/// The API accepts the bearer credential in either of two places, matching
/// what existing clients send:
///
/// - `x-auth-token: <token>`
/// - `Authorization: Bearer <token>`
///
/// The middleware layer in the API crate validates the extracted token and
/// inserts an [`AuthUser`] into the request extensions; protected handlers
/// pull it back out with Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use artloop_shared::auth::middleware::AuthUser;
///
/// async fn handler(Extension(auth): Extension<AuthUser>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
/// ```
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Custom header carrying the bearer token
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Authenticated principal added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email from the token claims
    pub email: String,
}

/// Error type for credential extraction
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token in either accepted header
    #[error("No token, authorization denied")]
    MissingToken,
}

/// Extracts the bearer token from request headers
///
/// Checks `x-auth-token` first, then `Authorization: Bearer <token>`,
/// in that order.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(token) = headers.get(AUTH_TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}
