/// Integration tests for the ArtLoop API
///
/// These tests verify the full system works end-to-end:
/// - Registration, login, and token-protected routes
/// - Gallery uploads, visibility, likes, and view counting
/// - Ownership enforcement on artworks and artist profiles
/// - Forum post lifecycle, locking, and comment scoping
/// - Weekly challenge lookup and the submission window

mod common;

use artloop_shared::models::artwork::Artwork;
use artloop_shared::models::user::User;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

/// Test account registration and login roundtrip
#[tokio::test]
async fn test_register_and_login() {
    let mut ctx = TestContext::new().await.unwrap();

    let email = format!("newbie-{}@example.com", uuid::Uuid::new_v4());
    let request = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "username": "newbie",
                "email": email,
                "password": "pw123456"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    assert_eq!(body["user"]["username"], "newbie");
    assert_eq!(body["user"]["email"], email);
    // The hash must never leave the server
    assert!(body["user"].get("passwordHash").is_none());

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": email,
                "password": "pw123456"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], email);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test that a duplicate email is rejected with a conflict
#[tokio::test]
async fn test_register_duplicate_email() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "username": "copycat",
                "email": ctx.user.email,
                "password": "pw123456"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    ctx.cleanup().await.unwrap();
}

/// Test that bad credentials fail with a generic message
#[tokio::test]
async fn test_login_invalid_credentials() {
    let mut ctx = TestContext::new().await.unwrap();

    // Wrong password
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": ctx.user.email,
                "password": "not-the-password"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown email gets the same status, not a 404
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": "nobody@example.com",
                "password": "pw123456"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

/// Test authentication requirement on protected routes
#[tokio::test]
async fn test_authentication_required() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/auth/me")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token is also rejected
    let request = Request::builder()
        .method("GET")
        .uri("/auth/me")
        .header("x-auth-token", "not.a.jwt")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Test that /auth/me reports the artist profile id once one exists
#[tokio::test]
async fn test_me_reports_artist_profile() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/auth/me")
        .header("x-auth-token", &ctx.jwt_token)
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["email"], ctx.user.email);
    assert!(body["artistId"].is_null());

    let artist = common::create_test_artist(&ctx, ctx.user.id).await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/auth/me")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["artistId"], artist.id.to_string());
    assert_eq!(body["isArtist"], true);

    ctx.cleanup().await.unwrap();
}

/// Test the stateless logout acknowledgement
#[tokio::test]
async fn test_logout_is_stateless() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/auth/logout")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Logged out");

    // The token still works afterwards; expiry is the only invalidation
    let request = Request::builder()
        .method("GET")
        .uri("/auth/me")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

/// Test updating username and bio through /auth/me
#[tokio::test]
async fn test_profile_update() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri("/auth/me")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(r#"{"bio": "Ink and watercolour"}"#))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["bio"], "Ink and watercolour");
    assert_eq!(body["username"], ctx.user.username);

    // Empty username is rejected, bio stays untouched
    let request = Request::builder()
        .method("PUT")
        .uri("/auth/me")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(r#"{"username": ""}"#))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("GET")
        .uri("/auth/me")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["bio"], "Ink and watercolour");

    ctx.cleanup().await.unwrap();
}

/// Test that portfolio upload requires an artist profile
#[tokio::test]
async fn test_portfolio_upload_requires_artist_profile() {
    let mut ctx = TestContext::new().await.unwrap();

    let body = common::multipart_body(
        &[("title", "My piece"), ("category", "Digital Art")],
        Some(("image", "image/png", b"png bytes")),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/artwork/portfolio/upload")
        .header("authorization", ctx.auth_header())
        .header("content-type", common::multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Artist profile not found");

    // No row was created
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM artworks WHERE title = 'My piece'",
    )
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(count, 0);

    ctx.cleanup().await.unwrap();
}

/// Test that portfolio uploads stay out of the public gallery
#[tokio::test]
async fn test_portfolio_upload_stays_private() {
    let mut ctx = TestContext::new().await.unwrap();
    common::create_test_artist(&ctx, ctx.user.id).await.unwrap();

    let marker = format!("private-{}", uuid::Uuid::new_v4());
    let body = common::multipart_body(
        &[
            ("title", &marker),
            ("category", "Digital Art"),
            ("tags", "wip, sketch"),
        ],
        Some(("image", "image/png", b"png bytes")),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/artwork/portfolio/upload")
        .header("authorization", ctx.auth_header())
        .header("content-type", common::multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = common::body_json(response).await;
    assert_eq!(created["isPublic"], false);
    assert_eq!(created["tags"], json!(["wip", "sketch"]));

    // The public gallery never lists it
    let request = Request::builder()
        .method("GET")
        .uri(format!("/artwork?search={}", marker))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let listing = common::body_json(response).await;
    assert_eq!(listing["total"], 0);

    // But the owner sees it under their own artworks
    let request = Request::builder()
        .method("GET")
        .uri("/artwork/user/me")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mine = common::body_json(response).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    ctx.cleanup().await.unwrap();
}

/// Test anonymous guest uploads: public immediately, never editable
#[tokio::test]
async fn test_guest_upload_is_public_and_immutable() {
    let mut ctx = TestContext::new().await.unwrap();

    let body = common::multipart_body(
        &[
            ("title", "Guest piece"),
            ("category", "Photography"),
            ("guestName", "Wandering Guest"),
        ],
        Some(("image", "image/jpeg", b"jpeg bytes")),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/artwork/public-upload")
        .header("content-type", common::multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = common::body_json(response).await;
    assert_eq!(created["isPublic"], true);
    assert!(created["artistId"].is_null());
    assert_eq!(created["guestArtistName"], "Wandering Guest");

    let artwork_id = created["id"].as_str().unwrap().to_string();

    // Even an authenticated user cannot touch it
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/artwork/{}", artwork_id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "title": "Stolen" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/artwork/{}", artwork_id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    sqlx::query("DELETE FROM artworks WHERE id = $1::uuid")
        .bind(&artwork_id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test that every detail read counts exactly one view
#[tokio::test]
async fn test_view_counter_increments() {
    let mut ctx = TestContext::new().await.unwrap();
    let artist = common::create_test_artist(&ctx, ctx.user.id).await.unwrap();
    let artwork = common::create_test_artwork(&ctx, Some(artist.id), true, "Viewed piece")
        .await
        .unwrap();
    assert_eq!(artwork.views, 0);

    for expected in 1..=2 {
        let request = Request::builder()
            .method("GET")
            .uri(format!("/artwork/{}", artwork.id))
            .body(Body::empty())
            .unwrap();

        let response = ctx.app.call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = common::body_json(response).await;
        assert_eq!(body["views"], expected);
    }

    sqlx::query("DELETE FROM artworks WHERE id = $1")
        .bind(artwork.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test that the like toggle is its own inverse
#[tokio::test]
async fn test_like_toggle_is_idempotent_pair() {
    let mut ctx = TestContext::new().await.unwrap();
    let artist = common::create_test_artist(&ctx, ctx.user.id).await.unwrap();
    let artwork = common::create_test_artwork(&ctx, Some(artist.id), true, "Liked piece")
        .await
        .unwrap();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/artwork/{}/like", artwork.id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["liked"], true);
    assert_eq!(body["likeCount"], 1);

    let request = Request::builder()
        .method("POST")
        .uri(format!("/artwork/{}/like", artwork.id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["liked"], false);
    assert_eq!(body["likeCount"], 0);

    sqlx::query("DELETE FROM artworks WHERE id = $1")
        .bind(artwork.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test that only the owning artist's user can update an artwork
#[tokio::test]
async fn test_artwork_update_owner_only() {
    let mut ctx = TestContext::new().await.unwrap();
    let artist = common::create_test_artist(&ctx, ctx.user.id).await.unwrap();
    let artwork = common::create_test_artwork(&ctx, Some(artist.id), true, "Owned piece")
        .await
        .unwrap();

    let (other, other_token) = ctx.second_user().await.unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/artwork/{}", artwork.id))
        .header("authorization", format!("Bearer {}", other_token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "title": "Hijacked" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owner succeeds
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/artwork/{}", artwork.id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "title": "Renamed" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["title"], "Renamed");

    sqlx::query("DELETE FROM artworks WHERE id = $1")
        .bind(artwork.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(other.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test gallery search with offset pagination
#[tokio::test]
async fn test_gallery_pagination_and_search() {
    let mut ctx = TestContext::new().await.unwrap();
    let artist = common::create_test_artist(&ctx, ctx.user.id).await.unwrap();

    let marker = format!("pager-{}", uuid::Uuid::new_v4());
    let mut ids = Vec::new();
    for i in 0..3 {
        let artwork = common::create_test_artwork(
            &ctx,
            Some(artist.id),
            true,
            &format!("{} number {}", marker, i),
        )
        .await
        .unwrap();
        ids.push(artwork.id);
    }

    let request = Request::builder()
        .method("GET")
        .uri(format!("/artwork?search={}&limit=2&page=1", marker))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["artworks"].as_array().unwrap().len(), 2);

    let request = Request::builder()
        .method("GET")
        .uri(format!("/artwork?search={}&limit=2&page=2", marker))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["artworks"].as_array().unwrap().len(), 1);

    for id in ids {
        sqlx::query("DELETE FROM artworks WHERE id = $1")
            .bind(id)
            .execute(&ctx.db)
            .await
            .unwrap();
    }
    ctx.cleanup().await.unwrap();
}

/// Test artist profile uniqueness and the detach-on-delete behavior
#[tokio::test]
async fn test_artist_profile_conflict_and_delete() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/artists")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": "First Profile" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::body_json(response).await;
    let artist_id: uuid::Uuid = created["id"].as_str().unwrap().parse().unwrap();

    // A second profile for the same user conflicts
    let request = Request::builder()
        .method("POST")
        .uri("/artists")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": "Second Profile" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let artwork = common::create_test_artwork(&ctx, Some(artist_id), true, "Detached piece")
        .await
        .unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/artists/{}", artist_id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The flag reverts and the artwork is detached, not deleted
    let user = User::find_by_id(&ctx.db, ctx.user.id).await.unwrap().unwrap();
    assert!(!user.is_artist);

    let detached = Artwork::find_by_id(&ctx.db, artwork.id)
        .await
        .unwrap()
        .unwrap();
    assert!(detached.artist_id.is_none());

    sqlx::query("DELETE FROM artworks WHERE id = $1")
        .bind(artwork.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test the forum post lifecycle with author-only mutation
#[tokio::test]
async fn test_forum_post_lifecycle() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/forum/posts")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "title": "Brush care",
                "content": "How do you clean yours?",
                "category": "tools",
                "tags": ["brushes"]
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::body_json(response).await;
    let post_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["likeCount"], 0);
    assert_eq!(created["comments"].as_array().unwrap().len(), 0);

    // Reading bumps the view counter
    let request = Request::builder()
        .method("GET")
        .uri(format!("/forum/posts/{}", post_id))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["views"], 1);

    // A stranger cannot edit it
    let (other, other_token) = ctx.second_user().await.unwrap();
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/forum/posts/{}", post_id))
        .header("authorization", format!("Bearer {}", other_token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "title": "Defaced" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The author edits and deletes
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/forum/posts/{}", post_id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "title": "Brush care tips" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["title"], "Brush care tips");

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/forum/posts/{}", post_id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(other.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test that a locked post rejects comments but lets authors delete theirs
#[tokio::test]
async fn test_locked_post_comment_rules() {
    let mut ctx = TestContext::new().await.unwrap();
    let post = common::create_test_post(&ctx, "Soon locked").await.unwrap();

    // Comment while open
    let request = Request::builder()
        .method("POST")
        .uri(format!("/forum/posts/{}/comments", post.id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "content": "First!" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    let comment_id = body["comments"][0]["id"].as_str().unwrap().to_string();

    sqlx::query("UPDATE forum_posts SET is_locked = TRUE WHERE id = $1")
        .bind(post.id)
        .execute(&ctx.db)
        .await
        .unwrap();

    // New comments are rejected
    let request = Request::builder()
        .method("POST")
        .uri(format!("/forum/posts/{}/comments", post.id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "content": "Too late" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The lock does not stop the comment author from deleting
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/forum/posts/{}/comments/{}", post.id, comment_id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    ctx.cleanup().await.unwrap();
}

/// Test that comment routes are scoped to their parent post
#[tokio::test]
async fn test_comment_parent_scoping() {
    let mut ctx = TestContext::new().await.unwrap();
    let post_a = common::create_test_post(&ctx, "Post A").await.unwrap();
    let post_b = common::create_test_post(&ctx, "Post B").await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/forum/posts/{}/comments", post_a.id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "content": "On post A" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let body = common::body_json(response).await;
    let comment_id = body["comments"][0]["id"].as_str().unwrap().to_string();

    // Addressing the comment through the wrong post is a 404
    let request = Request::builder()
        .method("POST")
        .uri(format!(
            "/forum/posts/{}/comments/{}/like",
            post_b.id, comment_id
        ))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Through the right post it toggles
    let request = Request::builder()
        .method("POST")
        .uri(format!(
            "/forum/posts/{}/comments/{}/like",
            post_a.id, comment_id
        ))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["liked"], true);

    ctx.cleanup().await.unwrap();
}

/// Test the forum stats shape
#[tokio::test]
async fn test_forum_stats_shape() {
    let mut ctx = TestContext::new().await.unwrap();
    common::create_test_post(&ctx, "Counted post").await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/forum/stats")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert!(body["totalPosts"].as_i64().unwrap() >= 1);
    assert!(body["totalComments"].as_i64().unwrap() >= 0);
    assert!(body["totalLikes"].as_i64().unwrap() >= 0);

    ctx.cleanup().await.unwrap();
}

/// Test weekly challenge lookup against the current ISO week
#[tokio::test]
async fn test_weekly_challenge_lookup() {
    use chrono::{Datelike, Duration, Utc};

    let mut ctx = TestContext::new().await.unwrap();

    let iso = Utc::now().iso_week();
    let challenge = common::replace_challenge(
        &ctx,
        iso.week() as i32,
        iso.year(),
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/challenge/weekly")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["id"], challenge.id.to_string());
    assert_eq!(body["isOpen"], true);

    // Closing the switch is reflected in the computed openness
    common::close_challenge(&ctx, challenge.id).await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri(format!("/challenge/{}", challenge.id))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["isOpen"], false);

    sqlx::query("DELETE FROM challenges WHERE id = $1")
        .bind(challenge.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test that a closed challenge rejects submissions
#[tokio::test]
async fn test_submission_rejected_when_closed() {
    use chrono::{Duration, Utc};

    let mut ctx = TestContext::new().await.unwrap();

    // Slot far outside any real calendar so it never collides with seed data
    let challenge = common::replace_challenge(&ctx, 5, 3005, Utc::now() + Duration::days(7))
        .await
        .unwrap();
    common::close_challenge(&ctx, challenge.id).await.unwrap();

    let challenge_id = challenge.id.to_string();
    let body = common::multipart_body(
        &[("challengeId", &challenge_id), ("title", "Late entry")],
        Some(("image", "image/png", b"png bytes")),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/submissions")
        .header("authorization", ctx.auth_header())
        .header("content-type", common::multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A past deadline closes the window even with the switch on
    let expired = common::replace_challenge(&ctx, 6, 3006, Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    let expired_id = expired.id.to_string();
    let body = common::multipart_body(
        &[("challengeId", &expired_id), ("title", "Too late")],
        Some(("image", "image/png", b"png bytes")),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/submissions")
        .header("authorization", ctx.auth_header())
        .header("content-type", common::multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    sqlx::query("DELETE FROM challenges WHERE id = $1 OR id = $2")
        .bind(challenge.id)
        .bind(expired.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test the full submission flow: submit, list, like, comment
#[tokio::test]
async fn test_submission_flow() {
    use chrono::{Duration, Utc};

    let mut ctx = TestContext::new().await.unwrap();
    let challenge = common::replace_challenge(&ctx, 7, 3007, Utc::now() + Duration::days(7))
        .await
        .unwrap();

    let challenge_id = challenge.id.to_string();
    let body = common::multipart_body(
        &[
            ("challengeId", &challenge_id),
            ("title", "My entry"),
            ("description", "First attempt"),
        ],
        Some(("image", "image/gif", b"gif bytes")),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/submissions")
        .header("authorization", ctx.auth_header())
        .header("content-type", common::multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::body_json(response).await;
    let submission_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["title"], "My entry");

    // Listed under its challenge
    let request = Request::builder()
        .method("GET")
        .uri(format!("/submissions/{}", challenge.id))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = common::body_json(response).await;
    assert_eq!(listing.as_array().unwrap().len(), 1);

    // Like toggle
    let request = Request::builder()
        .method("POST")
        .uri(format!("/submissions/{}/like", submission_id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["liked"], true);
    assert_eq!(body["likeCount"], 1);

    // Empty comment text is rejected
    let request = Request::builder()
        .method("POST")
        .uri(format!("/submissions/{}/comments", submission_id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": "" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri(format!("/submissions/{}/comments", submission_id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": "Great linework" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = Request::builder()
        .method("GET")
        .uri(format!("/submissions/{}/comments", submission_id))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let comments = common::body_json(response).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["content"], "Great linework");

    sqlx::query("DELETE FROM challenges WHERE id = $1")
        .bind(challenge.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test that forum and submission comment threads never mix
#[tokio::test]
async fn test_comment_threads_stay_separate() {
    use chrono::{Duration, Utc};

    let mut ctx = TestContext::new().await.unwrap();

    let post = common::create_test_post(&ctx, "Brush care").await.unwrap();
    let challenge = common::replace_challenge(&ctx, 8, 3008, Utc::now() + Duration::days(7))
        .await
        .unwrap();

    let challenge_id = challenge.id.to_string();
    let body = common::multipart_body(
        &[("challengeId", &challenge_id), ("title", "Entry")],
        Some(("image", "image/png", b"png bytes")),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/submissions")
        .header("authorization", ctx.auth_header())
        .header("content-type", common::multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::body_json(response).await;
    let submission_id = created["id"].as_str().unwrap().to_string();

    // One comment on each side, same author
    let request = Request::builder()
        .method("POST")
        .uri(format!("/forum/posts/{}/comments", post.id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "content": "Forum side" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = Request::builder()
        .method("POST")
        .uri(format!("/submissions/{}/comments", submission_id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": "Submission side" }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The post thread only has the forum comment
    let request = Request::builder()
        .method("GET")
        .uri(format!("/forum/posts/{}", post.id))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let detail = common::body_json(response).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);
    assert_eq!(detail["comments"][0]["content"], "Forum side");

    // The submission thread only has the submission comment
    let request = Request::builder()
        .method("GET")
        .uri(format!("/submissions/{}/comments", submission_id))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    let comments = common::body_json(response).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["content"], "Submission side");

    sqlx::query("DELETE FROM challenges WHERE id = $1")
        .bind(challenge.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test the password reset flow end to end
#[tokio::test]
async fn test_password_reset_flow() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/forgot-password")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "email": ctx.user.email }).to_string()))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let reset_link = body["resetLink"].as_str().unwrap();
    let token = reset_link.rsplit('/').next().unwrap().to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/reset-password")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "token": token, "newPassword": "fresh-pass-1" }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The new password works
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": ctx.user.email, "password": "fresh-pass-1" }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The token is single-use
    let request = Request::builder()
        .method("POST")
        .uri("/auth/reset-password")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "token": token, "newPassword": "another-pass-1" }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

/// Test that unknown email on forgot-password is a 404
#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/forgot-password")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": "ghost@example.com" }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

/// Test that a rejected upload never creates a row or a file
#[tokio::test]
async fn test_invalid_upload_creates_nothing() {
    let mut ctx = TestContext::new().await.unwrap();
    common::create_test_artist(&ctx, ctx.user.id).await.unwrap();

    // Artwork uploads accept only PNG and JPEG
    let body = common::multipart_body(
        &[("title", "Bad type"), ("category", "Other")],
        Some(("image", "image/gif", b"gif bytes")),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/artwork/gallery/upload")
        .header("authorization", ctx.auth_header())
        .header("content-type", common::multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM artworks WHERE title = 'Bad type'")
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    assert_eq!(count, 0);
    assert!(!std::path::Path::new(&ctx.config.uploads.dir).exists());

    ctx.cleanup().await.unwrap();
}
