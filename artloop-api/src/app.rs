/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use artloop_api::{app::AppState, config::Config, mailer::LogMailer};
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config, Arc::new(LogMailer));
/// let app = artloop_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, mailer::Mailer};
use artloop_shared::auth::{
    jwt,
    middleware::{extract_token, AuthUser},
};
use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Request body cap for multipart upload routes, slightly above the largest
/// accepted image so field overhead doesn't trip the limit
const UPLOAD_BODY_LIMIT: usize = 26 * 1024 * 1024;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outgoing mail collaborator
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /uploads/*                     # Stored images (static)
/// ├── /auth/                         # Identity
/// │   ├── POST /register             # public
/// │   ├── POST /login                # public
/// │   ├── POST /forgot-password      # public
/// │   ├── POST /reset-password       # public
/// │   ├── GET  /me                   # bearer
/// │   └── POST|DELETE /avatar        # bearer
/// ├── /artists/                      # Artist profiles
/// ├── /artwork/                      # Gallery
/// ├── /forum/                        # Posts and comments
/// ├── /challenge/                    # Weekly challenges
/// └── /submissions/                  # Challenge entries
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Token authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Identity: public half and bearer half
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", get(routes::auth::logout))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/reset-password", post(routes::auth::reset_password));

    let auth_protected = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/me", put(routes::auth::update_me))
        .route("/avatar", post(routes::auth::upload_avatar))
        .route("/avatar", delete(routes::auth::delete_avatar))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    let artist_public = Router::new()
        .route("/", get(routes::artists::list_artists))
        .route("/:id", get(routes::artists::get_artist));

    let artist_protected = Router::new()
        .route("/", post(routes::artists::create_artist))
        .route("/:id", put(routes::artists::update_artist))
        .route("/:id", delete(routes::artists::delete_artist))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    let artwork_public = Router::new()
        .route("/", get(routes::artworks::list_artworks))
        .route("/public-upload", post(routes::artworks::public_upload))
        .route("/:id", get(routes::artworks::get_artwork))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    let artwork_protected = Router::new()
        .route("/portfolio/upload", post(routes::artworks::portfolio_upload))
        .route("/gallery/upload", post(routes::artworks::gallery_upload))
        .route("/user/me", get(routes::artworks::my_artworks))
        .route("/:id", put(routes::artworks::update_artwork))
        .route("/:id", delete(routes::artworks::delete_artwork))
        .route("/:id/like", post(routes::artworks::toggle_like))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    let forum_public = Router::new()
        .route("/posts", get(routes::forum::list_posts))
        .route("/posts/:id", get(routes::forum::get_post))
        .route("/stats", get(routes::forum::stats));

    let forum_protected = Router::new()
        .route("/posts", post(routes::forum::create_post))
        .route("/posts/:id", put(routes::forum::update_post))
        .route("/posts/:id", delete(routes::forum::delete_post))
        .route("/posts/:id/like", post(routes::forum::toggle_post_like))
        .route("/posts/:id/comments", post(routes::forum::add_comment))
        .route(
            "/posts/:post_id/comments/:comment_id/like",
            post(routes::forum::toggle_comment_like),
        )
        .route(
            "/posts/:post_id/comments/:comment_id",
            delete(routes::forum::delete_comment),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    let challenge_routes = Router::new()
        .route("/", get(routes::challenges::list_challenges))
        .route("/weekly", get(routes::challenges::weekly_challenge))
        .route("/:id", get(routes::challenges::get_challenge));

    let submission_public = Router::new()
        .route("/:id", get(routes::submissions::list_submissions))
        .route("/:id/comments", get(routes::submissions::list_comments));

    let submission_protected = Router::new()
        .route("/", post(routes::submissions::create_submission))
        .route("/:id/like", post(routes::submissions::toggle_like))
        .route("/:id/comments", post(routes::submissions::add_comment))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_public.merge(auth_protected))
        .nest("/artists", artist_public.merge(artist_protected))
        .nest("/artwork", artwork_public.merge(artwork_protected))
        .nest("/forum", forum_public.merge(forum_protected))
        .nest("/challenge", challenge_routes)
        .nest("/submissions", submission_public.merge(submission_protected))
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Token authentication middleware layer
///
/// Extracts the bearer token from `x-auth-token` or `Authorization`,
/// validates it, and injects an [`AuthUser`] into request extensions.
async fn token_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let token = extract_token(req.headers())?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(req).await)
}
