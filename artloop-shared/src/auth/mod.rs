/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and reset-token generation
/// - [`jwt`]: Bearer token generation and validation (HS256, 1 hour expiry)
/// - [`middleware`]: Token extraction from requests and the `AuthUser` extension
/// - [`ownership`]: The owner-only capability check used by every mutation path
pub mod jwt;
pub mod middleware;
pub mod ownership;
pub mod password;
