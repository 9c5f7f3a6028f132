/// Artwork model and database operations
///
/// Gallery pieces. An artwork is either owned by an artist profile
/// (`artist_id`) or attributed to a guest by name; both can coexist when an
/// artist uploads on someone else's behalf. Likes live in a `liked_by` UUID
/// array so the toggle is a single atomic UPDATE, and the view counter is
/// bumped in the same statement that fetches the row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE artworks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     image_file VARCHAR(512) NOT NULL,
///     category artwork_category NOT NULL,
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     artist_id UUID REFERENCES artists(id) ON DELETE SET NULL,
///     guest_artist_name VARCHAR(255),
///     liked_by UUID[] NOT NULL DEFAULT '{}',
///     views INTEGER NOT NULL DEFAULT 0,
///     is_public BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::LikeStatus;

/// Gallery categories
///
/// Stored as a Postgres enum whose labels match the display strings, so the
/// database values serialize directly into API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "artwork_category")]
pub enum ArtworkCategory {
    #[sqlx(rename = "Digital Art")]
    #[serde(rename = "Digital Art")]
    DigitalArt,
    #[sqlx(rename = "Traditional Art")]
    #[serde(rename = "Traditional Art")]
    TraditionalArt,
    Photography,
    Sculpture,
    #[sqlx(rename = "Mixed Media")]
    #[serde(rename = "Mixed Media")]
    MixedMedia,
    Other,
}

impl ArtworkCategory {
    /// Display label, identical to the database enum label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DigitalArt => "Digital Art",
            Self::TraditionalArt => "Traditional Art",
            Self::Photography => "Photography",
            Self::Sculpture => "Sculpture",
            Self::MixedMedia => "Mixed Media",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for ArtworkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtworkCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Digital Art" => Ok(Self::DigitalArt),
            "Traditional Art" => Ok(Self::TraditionalArt),
            "Photography" => Ok(Self::Photography),
            "Sculpture" => Ok(Self::Sculpture),
            "Mixed Media" => Ok(Self::MixedMedia),
            "Other" => Ok(Self::Other),
            other => Err(format!("Unknown artwork category: {}", other)),
        }
    }
}

/// Artwork model representing a gallery piece
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    /// Unique artwork ID (UUID v4)
    pub id: Uuid,

    /// Title shown in the gallery
    pub title: String,

    /// Description, empty string when the uploader gave none
    pub description: String,

    /// Relative path of the stored image
    pub image_file: String,

    /// Gallery category
    pub category: ArtworkCategory,

    /// Free-form tags used by search
    pub tags: Vec<String>,

    /// Owning artist profile, None for guest uploads and orphaned pieces
    pub artist_id: Option<Uuid>,

    /// Attribution for pieces uploaded without an artist profile
    pub guest_artist_name: Option<String>,

    /// Users who currently like this artwork
    pub liked_by: Vec<Uuid>,

    /// Detail view counter
    pub views: i32,

    /// Whether the piece appears in the public gallery
    pub is_public: bool,

    /// When the artwork was uploaded
    pub created_at: DateTime<Utc>,

    /// When the artwork was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an artwork
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArtwork {
    /// Title
    pub title: String,

    /// Description (empty string allowed)
    pub description: String,

    /// Stored image path
    pub image_file: String,

    /// Gallery category
    pub category: ArtworkCategory,

    /// Free-form tags
    pub tags: Vec<String>,

    /// Owning artist profile, if the uploader has one
    pub artist_id: Option<Uuid>,

    /// Guest attribution, used when there is no artist profile
    pub guest_artist_name: Option<String>,

    /// Whether the piece is publicly visible
    pub is_public: bool,
}

/// Input for updating an artwork
///
/// All fields are optional. Only non-None fields will be updated;
/// `tags` is replaced wholesale when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArtwork {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New category
    pub category: Option<ArtworkCategory>,

    /// Replacement tag list
    pub tags: Option<Vec<String>>,

    /// New visibility
    pub is_public: Option<bool>,
}

const ARTWORK_COLUMNS: &str = "id, title, description, image_file, category, tags, artist_id, \
                               guest_artist_name, liked_by, views, is_public, created_at, updated_at";

impl Artwork {
    /// Creates an artwork
    ///
    /// # Errors
    ///
    /// Returns an error if the artist reference is invalid or the database
    /// connection fails
    pub async fn create(pool: &PgPool, data: CreateArtwork) -> Result<Self, sqlx::Error> {
        let artwork = sqlx::query_as::<_, Artwork>(&format!(
            r#"
            INSERT INTO artworks (title, description, image_file, category, tags,
                                  artist_id, guest_artist_name, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ARTWORK_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.image_file)
        .bind(data.category)
        .bind(data.tags)
        .bind(data.artist_id)
        .bind(data.guest_artist_name)
        .bind(data.is_public)
        .fetch_one(pool)
        .await?;

        Ok(artwork)
    }

    /// Finds an artwork by ID without touching the view counter
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let artwork = sqlx::query_as::<_, Artwork>(&format!(
            "SELECT {ARTWORK_COLUMNS} FROM artworks WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(artwork)
    }

    /// Fetches an artwork and bumps its view counter in one statement
    ///
    /// The increment is unconditional; every detail fetch counts as a view.
    /// The returned row carries the already-incremented count.
    pub async fn fetch_and_bump_views(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let artwork = sqlx::query_as::<_, Artwork>(&format!(
            r#"
            UPDATE artworks
            SET views = views + 1
            WHERE id = $1
            RETURNING {ARTWORK_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(artwork)
    }

    /// Lists public artworks with optional category and text filters
    ///
    /// The search term matches title, description, guest attribution, and
    /// tags, case-insensitively. Results are newest first.
    pub async fn list_public(
        pool: &PgPool,
        category: Option<ArtworkCategory>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = search.map(|s| format!("%{}%", s));

        let artworks = sqlx::query_as::<_, Artwork>(&format!(
            r#"
            SELECT {ARTWORK_COLUMNS}
            FROM artworks
            WHERE is_public = TRUE
              AND ($1::artwork_category IS NULL OR category = $1)
              AND ($2::text IS NULL
                   OR title ILIKE $2
                   OR description ILIKE $2
                   OR guest_artist_name ILIKE $2
                   OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $2))
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        ))
        .bind(category)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(artworks)
    }

    /// Counts public artworks under the same filters as [`Self::list_public`]
    pub async fn count_public(
        pool: &PgPool,
        category: Option<ArtworkCategory>,
        search: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let pattern = search.map(|s| format!("%{}%", s));

        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM artworks
            WHERE is_public = TRUE
              AND ($1::artwork_category IS NULL OR category = $1)
              AND ($2::text IS NULL
                   OR title ILIKE $2
                   OR description ILIKE $2
                   OR guest_artist_name ILIKE $2
                   OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $2))
            "#,
        )
        .bind(category)
        .bind(pattern)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Lists the portfolio of one artist, newest first
    ///
    /// Includes private pieces; visibility filtering is the caller's call.
    pub async fn list_by_artist(pool: &PgPool, artist_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let artworks = sqlx::query_as::<_, Artwork>(&format!(
            r#"
            SELECT {ARTWORK_COLUMNS}
            FROM artworks
            WHERE artist_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(artist_id)
        .fetch_all(pool)
        .await?;

        Ok(artworks)
    }

    /// Lists artworks belonging to the artist profile owned by a user
    ///
    /// Resolves the profile through the artists table, so callers only need
    /// the authenticated user id.
    pub async fn list_by_owner_user(
        pool: &PgPool,
        owner_user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let artworks = sqlx::query_as::<_, Artwork>(
            r#"
            SELECT a.id, a.title, a.description, a.image_file, a.category, a.tags,
                   a.artist_id, a.guest_artist_name, a.liked_by, a.views, a.is_public,
                   a.created_at, a.updated_at
            FROM artworks a
            JOIN artists ar ON ar.id = a.artist_id
            WHERE ar.owner_user_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(pool)
        .await?;

        Ok(artworks)
    }

    /// Updates an artwork
    ///
    /// # Returns
    ///
    /// The updated artwork if found, None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateArtwork,
    ) -> Result<Option<Self>, sqlx::Error> {
        let artwork = sqlx::query_as::<_, Artwork>(&format!(
            r#"
            UPDATE artworks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                tags = COALESCE($5, tags),
                is_public = COALESCE($6, is_public),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ARTWORK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.category)
        .bind(data.tags)
        .bind(data.is_public)
        .fetch_optional(pool)
        .await?;

        Ok(artwork)
    }

    /// Deletes an artwork
    ///
    /// # Returns
    ///
    /// True if the artwork was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM artworks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Toggles a like by one user in a single atomic statement
    ///
    /// Membership in `liked_by` decides the direction: present removes,
    /// absent appends. The RETURNING clause reads the post-update array, so
    /// concurrent toggles by different users never lose each other's writes.
    ///
    /// # Returns
    ///
    /// The new like status if the artwork exists, None otherwise
    pub async fn toggle_like(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LikeStatus>, sqlx::Error> {
        let status = sqlx::query_as::<_, LikeStatus>(
            r#"
            UPDATE artworks
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
}
