/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test account and token creation
/// - Row factories for artists, artworks, posts, and challenges
/// - Multipart request body building

use artloop_api::app::{build_router, AppState};
use artloop_api::config::Config;
use artloop_api::mailer::LogMailer;
use artloop_shared::auth::jwt::{create_token, Claims};
use artloop_shared::auth::password::hash_password;
use artloop_shared::models::artist::{Artist, CreateArtist};
use artloop_shared::models::artwork::{Artwork, ArtworkCategory, CreateArtwork};
use artloop_shared::models::challenge::{Challenge, ChallengeCategory, CreateChallenge};
use artloop_shared::models::forum_post::{CreateForumPost, ForumCategory, ForumPost};
use artloop_shared::models::user::{CreateUser, User};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Password every test account is created with
pub const TEST_PASSWORD: &str = "password123";

/// Multipart boundary used by [`multipart_body`]
pub const BOUNDARY: &str = "----artloop-test-boundary";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh account and its own upload dir
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let mut config = Config::from_env()?;

        // Isolate stored files per test
        config.uploads.dir = std::env::temp_dir()
            .join(format!("artloop-it-{}", Uuid::new_v4()))
            .to_string_lossy()
            .to_string();

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        // Create test user with a real password hash so login works
        let user = User::create(
            &db,
            CreateUser {
                username: "Test User".to_string(),
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: hash_password(TEST_PASSWORD)?,
            },
        )
        .await?;

        // Generate JWT token
        let claims = Claims::new(user.id, &user.email);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone(), Arc::new(LogMailer));
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates a second account with its own token
    pub async fn second_user(&self) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                username: "Other User".to_string(),
                email: format!("other-{}@example.com", Uuid::new_v4()),
                password_hash: hash_password(TEST_PASSWORD)?,
            },
        )
        .await?;

        let claims = Claims::new(user.id, &user.email);
        let token = create_token(&claims, &self.config.jwt.secret)?;

        Ok((user, token))
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Deleting the user cascades to the artist profile, posts, comments,
        // and submissions; owned artworks are detached, not deleted
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;

        tokio::fs::remove_dir_all(&self.config.uploads.dir).await.ok();
        Ok(())
    }
}

/// Helper to create an artist profile for a user
pub async fn create_test_artist(ctx: &TestContext, owner_user_id: Uuid) -> anyhow::Result<Artist> {
    let artist = Artist::create(
        &ctx.db,
        CreateArtist {
            owner_user_id,
            name: format!("Artist {}", Uuid::new_v4()),
            bio: None,
            contact_email: None,
            contact_phone: None,
            website: None,
            service_charges: None,
        },
    )
    .await?;

    User::set_is_artist(&ctx.db, owner_user_id, true).await?;

    Ok(artist)
}

/// Helper to create an artwork row directly
pub async fn create_test_artwork(
    ctx: &TestContext,
    artist_id: Option<Uuid>,
    is_public: bool,
    title: &str,
) -> anyhow::Result<Artwork> {
    let artwork = Artwork::create(
        &ctx.db,
        CreateArtwork {
            title: title.to_string(),
            description: String::new(),
            image_file: "uploads/test-image.png".to_string(),
            category: ArtworkCategory::DigitalArt,
            tags: Vec::new(),
            artist_id,
            guest_artist_name: if artist_id.is_none() {
                Some("Guest".to_string())
            } else {
                None
            },
            is_public,
        },
    )
    .await?;

    Ok(artwork)
}

/// Helper to create a forum post row directly
pub async fn create_test_post(ctx: &TestContext, title: &str) -> anyhow::Result<ForumPost> {
    let post = ForumPost::create(
        &ctx.db,
        CreateForumPost {
            title: title.to_string(),
            content: "Post body".to_string(),
            category: ForumCategory::General,
            tags: Vec::new(),
            author_id: ctx.user.id,
        },
    )
    .await?;

    Ok(post)
}

/// Helper to create a challenge at a fixed (week, year) slot
///
/// Replaces any row left behind by an earlier run, so the slot is always
/// free at insert time.
pub async fn replace_challenge(
    ctx: &TestContext,
    week: i32,
    year: i32,
    submission_end_date: DateTime<Utc>,
) -> anyhow::Result<Challenge> {
    sqlx::query("DELETE FROM challenges WHERE week = $1 AND year = $2")
        .bind(week)
        .bind(year)
        .execute(&ctx.db)
        .await?;

    let challenge = Challenge::create(
        &ctx.db,
        CreateChallenge {
            title: "Test Challenge".to_string(),
            description: "Draw something".to_string(),
            category: ChallengeCategory::Sketching,
            week,
            year,
            submission_end_date,
        },
    )
    .await?;

    Ok(challenge)
}

/// Helper to flip a challenge's manual submissions switch off
pub async fn close_challenge(ctx: &TestContext, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("UPDATE challenges SET is_submissions_open = FALSE WHERE id = $1")
        .bind(id)
        .execute(&ctx.db)
        .await?;

    Ok(())
}

/// Builds a multipart/form-data body with text fields and an optional file
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((name, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"test.png\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Content-Type header value matching [`multipart_body`]
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Reads a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
