/// Forum post model and database operations
///
/// Posts live in fixed categories and carry their like list and view counter
/// inline, same as artworks. Comments are stored in the shared comments
/// table under `parent_kind = 'forum_post'` and are deleted together with
/// their post.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE forum_posts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     content TEXT NOT NULL,
///     category forum_category NOT NULL,
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     liked_by UUID[] NOT NULL DEFAULT '{}',
///     views INTEGER NOT NULL DEFAULT 0,
///     is_pinned BOOLEAN NOT NULL DEFAULT FALSE,
///     is_locked BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::comment::CommentParent;
use super::LikeStatus;

/// Forum discussion categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "forum_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ForumCategory {
    Techniques,
    Inspiration,
    Critique,
    Tools,
    Collaboration,
    Business,
    General,
}

impl ForumCategory {
    /// Lowercase label, identical to the database enum label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Techniques => "techniques",
            Self::Inspiration => "inspiration",
            Self::Critique => "critique",
            Self::Tools => "tools",
            Self::Collaboration => "collaboration",
            Self::Business => "business",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for ForumCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ForumCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "techniques" => Ok(Self::Techniques),
            "inspiration" => Ok(Self::Inspiration),
            "critique" => Ok(Self::Critique),
            "tools" => Ok(Self::Tools),
            "collaboration" => Ok(Self::Collaboration),
            "business" => Ok(Self::Business),
            "general" => Ok(Self::General),
            other => Err(format!("Unknown forum category: {}", other)),
        }
    }
}

/// Sort orders accepted by the post listing
///
/// Unknown sort strings fall back to newest-first rather than failing the
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
    MostLiked,
    MostViewed,
}

impl PostSort {
    /// Parses a query-string value, defaulting to [`PostSort::Newest`]
    pub fn parse(s: &str) -> Self {
        match s {
            "oldest" => Self::Oldest,
            "mostLiked" => Self::MostLiked,
            "mostViewed" => Self::MostViewed,
            _ => Self::Newest,
        }
    }

    /// ORDER BY expression for this sort
    ///
    /// Pinned posts always float to the top.
    fn order_clause(&self) -> &'static str {
        match self {
            Self::Newest => "is_pinned DESC, created_at DESC",
            Self::Oldest => "is_pinned DESC, created_at ASC",
            Self::MostLiked => "is_pinned DESC, cardinality(liked_by) DESC, created_at DESC",
            Self::MostViewed => "is_pinned DESC, views DESC, created_at DESC",
        }
    }
}

/// Forum post model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    /// Unique post ID (UUID v4)
    pub id: Uuid,

    /// Post title
    pub title: String,

    /// Post body
    pub content: String,

    /// Discussion category
    pub category: ForumCategory,

    /// Free-form tags
    pub tags: Vec<String>,

    /// Authoring user
    pub author_id: Uuid,

    /// Users who currently like this post
    pub liked_by: Vec<Uuid>,

    /// Detail view counter
    pub views: i32,

    /// Pinned posts sort before everything else
    pub is_pinned: bool,

    /// Locked posts reject new comments
    pub is_locked: bool,

    /// When the post was created
    pub created_at: DateTime<Utc>,

    /// When the post was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a forum post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateForumPost {
    /// Post title
    pub title: String,

    /// Post body
    pub content: String,

    /// Discussion category
    pub category: ForumCategory,

    /// Free-form tags
    pub tags: Vec<String>,

    /// Authoring user
    pub author_id: Uuid,
}

/// Input for updating a forum post
///
/// All fields are optional. Only non-None fields will be updated;
/// `tags` is replaced wholesale when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateForumPost {
    /// New title
    pub title: Option<String>,

    /// New body
    pub content: Option<String>,

    /// New category
    pub category: Option<ForumCategory>,

    /// Replacement tag list
    pub tags: Option<Vec<String>>,
}

/// Aggregate forum counters for the stats endpoint
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ForumStats {
    /// Number of posts across all categories
    pub total_posts: i64,

    /// Number of comments on forum posts
    pub total_comments: i64,

    /// Sum of like counts across all posts
    pub total_likes: i64,
}

const POST_COLUMNS: &str = "id, title, content, category, tags, author_id, liked_by, views, \
                            is_pinned, is_locked, created_at, updated_at";

impl ForumPost {
    /// Creates a forum post
    pub async fn create(pool: &PgPool, data: CreateForumPost) -> Result<Self, sqlx::Error> {
        let post = sqlx::query_as::<_, ForumPost>(&format!(
            r#"
            INSERT INTO forum_posts (title, content, category, tags, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.content)
        .bind(data.category)
        .bind(data.tags)
        .bind(data.author_id)
        .fetch_one(pool)
        .await?;

        Ok(post)
    }

    /// Finds a post by ID without touching the view counter
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let post = sqlx::query_as::<_, ForumPost>(&format!(
            "SELECT {POST_COLUMNS} FROM forum_posts WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Fetches a post and bumps its view counter in one statement
    pub async fn fetch_and_bump_views(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let post = sqlx::query_as::<_, ForumPost>(&format!(
            r#"
            UPDATE forum_posts
            SET views = views + 1
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Lists posts with optional category and text filters, pinned posts first
    ///
    /// The search term matches title, content, and tags, case-insensitively.
    pub async fn list(
        pool: &PgPool,
        category: Option<ForumCategory>,
        search: Option<&str>,
        sort: PostSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = search.map(|s| format!("%{}%", s));

        let posts = sqlx::query_as::<_, ForumPost>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM forum_posts
            WHERE ($1::forum_category IS NULL OR category = $1)
              AND ($2::text IS NULL
                   OR title ILIKE $2
                   OR content ILIKE $2
                   OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $2))
            ORDER BY {}
            LIMIT $3 OFFSET $4
            "#,
            sort.order_clause(),
        ))
        .bind(category)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(posts)
    }

    /// Counts posts under the same filters as [`Self::list`]
    pub async fn count(
        pool: &PgPool,
        category: Option<ForumCategory>,
        search: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let pattern = search.map(|s| format!("%{}%", s));

        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM forum_posts
            WHERE ($1::forum_category IS NULL OR category = $1)
              AND ($2::text IS NULL
                   OR title ILIKE $2
                   OR content ILIKE $2
                   OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $2))
            "#,
        )
        .bind(category)
        .bind(pattern)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Updates a post
    ///
    /// # Returns
    ///
    /// The updated post if found, None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateForumPost,
    ) -> Result<Option<Self>, sqlx::Error> {
        let post = sqlx::query_as::<_, ForumPost>(&format!(
            r#"
            UPDATE forum_posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                category = COALESCE($4, category),
                tags = COALESCE($5, tags),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.content)
        .bind(data.category)
        .bind(data.tags)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Deletes a post together with its comments
    ///
    /// Runs in a transaction so a failure leaves both tables untouched.
    ///
    /// # Returns
    ///
    /// True if the post was deleted, false if it didn't exist
    pub async fn delete_with_comments(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE parent_kind = $1 AND parent_id = $2")
            .bind(CommentParent::ForumPost)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM forum_posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Toggles a like by one user in a single atomic statement
    ///
    /// # Returns
    ///
    /// The new like status if the post exists, None otherwise
    pub async fn toggle_like(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LikeStatus>, sqlx::Error> {
        let status = sqlx::query_as::<_, LikeStatus>(
            r#"
            UPDATE forum_posts
            SET liked_by = CASE WHEN $2 = ANY(liked_by)
                                THEN array_remove(liked_by, $2)
                                ELSE array_append(liked_by, $2)
                           END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING $2 = ANY(liked_by) AS liked,
                      cardinality(liked_by)::BIGINT AS like_count
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(status)
    }

    /// Aggregate counters for the stats endpoint
    pub async fn stats(pool: &PgPool) -> Result<ForumStats, sqlx::Error> {
        let stats = sqlx::query_as::<_, ForumStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM forum_posts) AS total_posts,
                (SELECT COUNT(*) FROM comments WHERE parent_kind = 'forum_post') AS total_comments,
                (SELECT COALESCE(SUM(cardinality(liked_by)), 0) FROM forum_posts)::BIGINT AS total_likes
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }
}
