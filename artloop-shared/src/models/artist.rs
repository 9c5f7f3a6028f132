/// Artist profile model and database operations
///
/// An artist profile is a one-to-one extension of a user account: the
/// `owner_user_id` column is UNIQUE, so creating a second profile for the
/// same user fails with a constraint violation that the API maps to a
/// conflict. The artwork table references artists, so a profile's portfolio
/// is always computed by query rather than stored.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE artists (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     bio TEXT,
///     contact_email VARCHAR(255),
///     contact_phone VARCHAR(64),
///     website VARCHAR(512),
///     service_charges TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Artist profile owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Unique artist ID (UUID v4)
    pub id: Uuid,

    /// Owning user account
    pub owner_user_id: Uuid,

    /// Public artist name
    pub name: String,

    /// Artist bio shown on the profile page
    pub bio: Option<String>,

    /// Contact email for commissions
    pub contact_email: Option<String>,

    /// Contact phone for commissions
    pub contact_phone: Option<String>,

    /// Personal website or social link
    pub website: Option<String>,

    /// Free-form description of commission pricing
    pub service_charges: Option<String>,

    /// When the profile was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating an artist profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArtist {
    /// Owning user account
    pub owner_user_id: Uuid,

    /// Public artist name
    pub name: String,

    /// Optional bio
    pub bio: Option<String>,

    /// Optional contact email
    pub contact_email: Option<String>,

    /// Optional contact phone
    pub contact_phone: Option<String>,

    /// Optional website link
    pub website: Option<String>,

    /// Optional commission pricing description
    pub service_charges: Option<String>,
}

/// Input for updating an artist profile
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArtist {
    /// New artist name
    pub name: Option<String>,

    /// New bio
    pub bio: Option<String>,

    /// New contact email
    pub contact_email: Option<String>,

    /// New contact phone
    pub contact_phone: Option<String>,

    /// New website link
    pub website: Option<String>,

    /// New commission pricing description
    pub service_charges: Option<String>,
}

const ARTIST_COLUMNS: &str = "id, owner_user_id, name, bio, contact_email, contact_phone, \
                              website, service_charges, created_at";

impl Artist {
    /// Creates an artist profile
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The user already has a profile (unique constraint on `owner_user_id`)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateArtist) -> Result<Self, sqlx::Error> {
        let artist = sqlx::query_as::<_, Artist>(&format!(
            r#"
            INSERT INTO artists (owner_user_id, name, bio, contact_email, contact_phone,
                                 website, service_charges)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ARTIST_COLUMNS}
            "#,
        ))
        .bind(data.owner_user_id)
        .bind(data.name)
        .bind(data.bio)
        .bind(data.contact_email)
        .bind(data.contact_phone)
        .bind(data.website)
        .bind(data.service_charges)
        .fetch_one(pool)
        .await?;

        Ok(artist)
    }

    /// Finds an artist profile by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let artist = sqlx::query_as::<_, Artist>(&format!(
            "SELECT {ARTIST_COLUMNS} FROM artists WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(artist)
    }

    /// Finds the artist profile owned by a user, if any
    pub async fn find_by_owner(
        pool: &PgPool,
        owner_user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let artist = sqlx::query_as::<_, Artist>(&format!(
            "SELECT {ARTIST_COLUMNS} FROM artists WHERE owner_user_id = $1",
        ))
        .bind(owner_user_id)
        .fetch_optional(pool)
        .await?;

        Ok(artist)
    }

    /// Updates an artist profile
    ///
    /// Only non-None fields are changed.
    ///
    /// # Returns
    ///
    /// The updated profile if found, None if the profile doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateArtist,
    ) -> Result<Option<Self>, sqlx::Error> {
        let artist = sqlx::query_as::<_, Artist>(&format!(
            r#"
            UPDATE artists
            SET name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                contact_email = COALESCE($4, contact_email),
                contact_phone = COALESCE($5, contact_phone),
                website = COALESCE($6, website),
                service_charges = COALESCE($7, service_charges)
            WHERE id = $1
            RETURNING {ARTIST_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.bio)
        .bind(data.contact_email)
        .bind(data.contact_phone)
        .bind(data.website)
        .bind(data.service_charges)
        .fetch_optional(pool)
        .await?;

        Ok(artist)
    }

    /// Deletes an artist profile
    ///
    /// Artworks referencing the profile are detached, not deleted; their
    /// `artist_id` goes NULL via the foreign key's ON DELETE SET NULL.
    ///
    /// # Returns
    ///
    /// True if the profile was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM artists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists artist profiles that have at least one artwork, newest first
    ///
    /// Portfolio membership is computed against the artworks table, so a
    /// profile appears here as soon as its first piece exists.
    pub async fn list_with_artworks(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let artists = sqlx::query_as::<_, Artist>(&format!(
            r#"
            SELECT {ARTIST_COLUMNS}
            FROM artists
            WHERE EXISTS (SELECT 1 FROM artworks WHERE artworks.artist_id = artists.id)
            ORDER BY created_at DESC
            "#,
        ))
        .fetch_all(pool)
        .await?;

        Ok(artists)
    }
}
