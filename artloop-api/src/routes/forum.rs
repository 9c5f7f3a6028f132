/// Forum endpoints
///
/// Posts belong to fixed categories and carry like lists and view counters.
/// Comments share the post's lifecycle: deleting a post deletes its
/// comments, and a locked post rejects new comments while still letting
/// comment authors delete their own.
///
/// # Endpoints
///
/// - `GET /forum/posts` - Listing with category/search/sort/pagination
/// - `GET /forum/posts/:id` - One post with comments, bumps views
/// - `GET /forum/stats` - Aggregate counters
/// - `POST /forum/posts` - Create (bearer)
/// - `PUT /forum/posts/:id` / `DELETE /forum/posts/:id` - Author only (bearer)
/// - `POST /forum/posts/:id/like` - Toggle like (bearer)
/// - `POST /forum/posts/:id/comments` - Add comment (bearer)
/// - `POST /forum/posts/:post_id/comments/:comment_id/like` - Toggle comment like (bearer)
/// - `DELETE /forum/posts/:post_id/comments/:comment_id` - Comment author only (bearer)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::LikeResponse,
};
use artloop_shared::{
    auth::{middleware::AuthUser, ownership::owner_only},
    models::{
        comment::{Comment, CommentParent, CreateComment},
        forum_post::{CreateForumPost, ForumCategory, ForumPost, ForumStats, PostSort, UpdateForumPost},
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Default forum page size
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Post listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    /// Category filter; absent or "all" means unfiltered
    pub category: Option<String>,

    /// Case-insensitive substring search
    pub search: Option<String>,

    /// 1-based page number
    pub page: Option<i64>,

    /// Page size
    pub limit: Option<i64>,

    /// Sort order: newest (default), oldest, mostLiked, mostViewed
    pub sort: Option<String>,
}

/// Post with its engagement counters
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    /// Post fields
    #[serde(flatten)]
    pub post: ForumPost,

    /// Current like count
    pub like_count: i64,

    /// Current comment count
    pub comment_count: i64,
}

/// Post listing response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsResponse {
    /// The page of posts
    pub posts: Vec<PostSummary>,

    /// Total posts matching the filters
    pub total: i64,

    /// The returned page number
    pub current_page: i64,

    /// Total pages under the current page size
    pub total_pages: i64,
}

/// Post with its full comment thread
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    /// Post fields
    #[serde(flatten)]
    pub post: ForumPost,

    /// Current like count
    pub like_count: i64,

    /// Comments, oldest first
    pub comments: Vec<Comment>,
}

/// Create-post request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    /// Post title
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    /// Post body
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    /// Category label
    pub category: String,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update-post request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,

    /// New body
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,

    /// New category label
    pub category: Option<String>,

    /// Replacement tag list
    pub tags: Option<Vec<String>>,
}

/// Add-comment request
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    /// Comment text
    #[validate(length(min = 1, message = "Comment content is required"))]
    pub content: String,
}

fn parse_category_filter(raw: Option<&str>) -> ApiResult<Option<ForumCategory>> {
    match raw {
        None | Some("all") | Some("") => Ok(None),
        Some(raw) => ForumCategory::from_str(raw)
            .map(Some)
            .map_err(ApiError::BadRequest),
    }
}

async fn post_detail(state: &AppState, post: ForumPost) -> ApiResult<PostDetail> {
    let comments = Comment::list_for_parent(&state.db, CommentParent::ForumPost, post.id).await?;
    let like_count = post.liked_by.len() as i64;

    Ok(PostDetail {
        post,
        like_count,
        comments,
    })
}

/// Post listing with filters and sort
///
/// # Errors
///
/// - `400 Bad Request`: Unknown category label
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> ApiResult<Json<ListPostsResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let offset = (page - 1) * limit;

    let category = parse_category_filter(query.category.as_deref())?;
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let sort = PostSort::parse(query.sort.as_deref().unwrap_or_default());

    let posts = ForumPost::list(&state.db, category, search, sort, limit, offset).await?;
    let total = ForumPost::count(&state.db, category, search).await?;
    let total_pages = (total + limit - 1) / limit;

    let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let comment_counts =
        Comment::counts_for_parents(&state.db, CommentParent::ForumPost, &ids).await?;

    let posts = posts
        .into_iter()
        .map(|post| {
            let like_count = post.liked_by.len() as i64;
            let comment_count = comment_counts.get(&post.id).copied().unwrap_or(0);
            PostSummary {
                post,
                like_count,
                comment_count,
            }
        })
        .collect();

    Ok(Json(ListPostsResponse {
        posts,
        total,
        current_page: page,
        total_pages,
    }))
}

/// One post with its comment thread
///
/// Every read counts as a view.
///
/// # Errors
///
/// - `404 Not Found`: No such post
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PostDetail>> {
    let post = ForumPost::fetch_and_bump_views(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(post_detail(&state, post).await?))
}

/// Aggregate forum counters
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<ForumStats>> {
    let stats = ForumPost::stats(&state.db).await?;
    Ok(Json(stats))
}

/// Creates a post
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown category
/// - `401 Unauthorized`: Missing or invalid token
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostDetail>)> {
    req.validate()?;

    let category = ForumCategory::from_str(&req.category).map_err(ApiError::BadRequest)?;

    let post = ForumPost::create(
        &state.db,
        CreateForumPost {
            title: req.title,
            content: req.content,
            category,
            tags: req.tags,
            author_id: auth.user_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(post_detail(&state, post).await?)))
}

/// Updates a post (author only)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown category
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Caller is not the author
/// - `404 Not Found`: No such post
pub async fn update_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePostRequest>,
) -> ApiResult<Json<PostDetail>> {
    req.validate()?;

    let post = ForumPost::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    owner_only(post.author_id, auth.user_id)?;

    let category = match req.category.as_deref() {
        Some(raw) => Some(ForumCategory::from_str(raw).map_err(ApiError::BadRequest)?),
        None => None,
    };

    let post = ForumPost::update(
        &state.db,
        id,
        UpdateForumPost {
            title: req.title,
            content: req.content,
            category,
            tags: req.tags,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(post_detail(&state, post).await?))
}

/// Deletes a post and its comments (author only)
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Caller is not the author
/// - `404 Not Found`: No such post
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let post = ForumPost::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    owner_only(post.author_id, auth.user_id)?;

    ForumPost::delete_with_comments(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Toggles the caller's like on a post
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such post
pub async fn toggle_post_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LikeResponse>> {
    let status = ForumPost::toggle_like(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(status.into()))
}

/// Adds a comment to a post
///
/// Locked posts reject new comments.
///
/// # Errors
///
/// - `400 Bad Request`: Empty comment
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Post is locked
/// - `404 Not Found`: No such post
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<PostDetail>)> {
    req.validate()?;

    let post = ForumPost::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if post.is_locked {
        return Err(ApiError::Forbidden("Post is locked".to_string()));
    }

    Comment::create(
        &state.db,
        CreateComment {
            parent_kind: CommentParent::ForumPost,
            parent_id: post.id,
            author_id: auth.user_id,
            content: req.content,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(post_detail(&state, post).await?)))
}

/// Toggles the caller's like on a comment
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such post or comment
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<LikeResponse>> {
    let comment =
        Comment::find_for_parent(&state.db, comment_id, CommentParent::ForumPost, post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    let status = Comment::toggle_like(&state.db, comment.id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(Json(status.into()))
}

/// Deletes a comment (comment author only)
///
/// The post's lock state is irrelevant here; authors may always remove
/// their own comments.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Caller is not the comment author
/// - `404 Not Found`: No such post or comment
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let comment =
        Comment::find_for_parent(&state.db, comment_id, CommentParent::ForumPost, post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    owner_only(comment.author_id, auth.user_id)?;

    Comment::delete(&state.db, comment.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
