/// Weekly challenge model and database operations
///
/// A challenge is keyed by its ISO week and ISO year, so "the current
/// challenge" is a plain lookup on `(week, year)` computed from the clock.
/// Whether submissions are accepted is a pure function of the row and a
/// timestamp, which keeps the decision testable and consistent between the
/// list endpoint and the submission guard.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE challenges (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     category challenge_category NOT NULL,
///     week INTEGER NOT NULL,
///     year INTEGER NOT NULL,
///     is_submissions_open BOOLEAN NOT NULL DEFAULT TRUE,
///     submission_end_date TIMESTAMPTZ NOT NULL,
///     UNIQUE (week, year)
/// );
/// ```

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Challenge disciplines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "challenge_category")]
pub enum ChallengeCategory {
    Sketching,
    Painting,
}

/// Weekly art challenge
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Unique challenge ID (UUID v4)
    pub id: Uuid,

    /// Challenge prompt title
    pub title: String,

    /// Full prompt description
    pub description: String,

    /// Discipline for this week
    pub category: ChallengeCategory,

    /// ISO week number (1-53)
    pub week: i32,

    /// ISO year the week belongs to
    ///
    /// Differs from the calendar year around New Year, so both values come
    /// from the same ISO week computation.
    pub year: i32,

    /// Manual on/off switch for submissions
    pub is_submissions_open: bool,

    /// Hard deadline after which submissions are rejected regardless of the
    /// switch
    pub submission_end_date: DateTime<Utc>,
}

/// Input for creating a challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChallenge {
    /// Challenge prompt title
    pub title: String,

    /// Full prompt description
    pub description: String,

    /// Discipline
    pub category: ChallengeCategory,

    /// ISO week number
    pub week: i32,

    /// ISO year
    pub year: i32,

    /// Submission deadline
    pub submission_end_date: DateTime<Utc>,
}

const CHALLENGE_COLUMNS: &str = "id, title, description, category, week, year, \
                                 is_submissions_open, submission_end_date";

impl Challenge {
    /// Whether submissions are accepted at the given instant
    ///
    /// Both conditions must hold: the switch is on and the deadline has not
    /// passed.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.is_submissions_open && now < self.submission_end_date
    }

    /// Creates a challenge
    ///
    /// Used by seeding and tests; challenges are provisioned ahead of time
    /// rather than created through the API.
    ///
    /// # Errors
    ///
    /// Returns an error if a challenge already exists for the same
    /// (week, year) pair
    pub async fn create(pool: &PgPool, data: CreateChallenge) -> Result<Self, sqlx::Error> {
        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            r#"
            INSERT INTO challenges (title, description, category, week, year, submission_end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CHALLENGE_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.category)
        .bind(data.week)
        .bind(data.year)
        .bind(data.submission_end_date)
        .fetch_one(pool)
        .await?;

        Ok(challenge)
    }

    /// Finds a challenge by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(challenge)
    }

    /// Finds the challenge for the ISO week containing the given instant
    pub async fn find_current(
        pool: &PgPool,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let iso = now.iso_week();

        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE week = $1 AND year = $2",
        ))
        .bind(iso.week() as i32)
        .bind(iso.year())
        .fetch_optional(pool)
        .await?;

        Ok(challenge)
    }

    /// Lists all challenges, most recent week first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let challenges = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges ORDER BY year DESC, week DESC",
        ))
        .fetch_all(pool)
        .await?;

        Ok(challenges)
    }
}
