/// Challenge submission model and database operations
///
/// An entry in a weekly challenge: an uploaded image plus a title. Whether
/// the submission window is open is decided before insert using
/// [`super::challenge::Challenge::is_open`]; this model only persists rows.
/// Comments on submissions live in the shared comments table under
/// `parent_kind = 'submission'`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::LikeStatus;

/// Challenge entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Unique submission ID (UUID v4)
    pub id: Uuid,

    /// Challenge this entry belongs to
    pub challenge_id: Uuid,

    /// Submitting user
    pub user_id: Uuid,

    /// Relative path of the stored image
    pub image_file: String,

    /// Entry title
    pub title: String,

    /// Optional entry description
    pub description: Option<String>,

    /// Users who currently like this entry
    pub liked_by: Vec<Uuid>,

    /// When the entry was submitted
    pub created_at: DateTime<Utc>,
}

/// Input for creating a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmission {
    /// Challenge this entry belongs to
    pub challenge_id: Uuid,

    /// Submitting user
    pub user_id: Uuid,

    /// Stored image path
    pub image_file: String,

    /// Entry title
    pub title: String,

    /// Optional entry description
    pub description: Option<String>,
}

const SUBMISSION_COLUMNS: &str =
    "id, challenge_id, user_id, image_file, title, description, liked_by, created_at";

impl Submission {
    /// Creates a submission
    ///
    /// The submission window check happens before this call; the insert
    /// itself only enforces the foreign keys.
    pub async fn create(pool: &PgPool, data: CreateSubmission) -> Result<Self, sqlx::Error> {
        let submission = sqlx::query_as::<_, Submission>(&format!(
            r#"
            INSERT INTO submissions (challenge_id, user_id, image_file, title, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SUBMISSION_COLUMNS}
            "#,
        ))
        .bind(data.challenge_id)
        .bind(data.user_id)
        .bind(data.image_file)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(submission)
    }

    /// Finds a submission by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let submission = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(submission)
    }

    /// Lists a challenge's submissions, newest first
    pub async fn list_for_challenge(
        pool: &PgPool,
        challenge_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let submissions = sqlx::query_as::<_, Submission>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE challenge_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(challenge_id)
        .fetch_all(pool)
        .await?;

        Ok(submissions)
    }

    /// Toggles a like by one user in a single atomic statement
    ///
    /// # Returns
    ///
    /// The new like status if the submission exists, None otherwise
    pub async fn toggle_like(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LikeStatus>, sqlx::Error> {
        let status = sqlx::query_as::<_, LikeStatus>(
            r#"
            UPDATE submissions
            SET liked_by = CASE WHEN $2 = ANY(liked_by)
                                THEN array_remove(liked_by, $2)
                                ELSE array_append(liked_by, $2)
                           END
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
