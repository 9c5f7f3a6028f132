/// Comment model and database operations
///
/// One table serves both commentable resources: forum posts and challenge
/// submissions. A comment belongs to exactly one parent, identified by
/// `(parent_kind, parent_id)`; all queries filter on that pair so a comment
/// id is only ever resolved in the context of its parent.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE comment_parent AS ENUM ('forum_post', 'submission');
///
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     parent_kind comment_parent NOT NULL,
///     parent_id UUID NOT NULL,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     liked_by UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::LikeStatus;

/// Kind of resource a comment is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "comment_parent", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommentParent {
    ForumPost,
    Submission,
}

/// Comment on a forum post or challenge submission
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique comment ID (UUID v4)
    pub id: Uuid,

    /// Kind of the parent resource
    pub parent_kind: CommentParent,

    /// ID of the parent resource
    pub parent_id: Uuid,

    /// Authoring user
    pub author_id: Uuid,

    /// Comment text
    pub content: String,

    /// Users who currently like this comment
    pub liked_by: Vec<Uuid>,

    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    /// Kind of the parent resource
    pub parent_kind: CommentParent,

    /// ID of the parent resource
    pub parent_id: Uuid,

    /// Authoring user
    pub author_id: Uuid,

    /// Comment text
    pub content: String,
}

const COMMENT_COLUMNS: &str = "id, parent_kind, parent_id, author_id, content, liked_by, created_at";

impl Comment {
    /// Creates a comment
    ///
    /// Parent existence and lock state are the caller's responsibility; this
    /// only inserts the row.
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (parent_kind, parent_id, author_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING {COMMENT_COLUMNS}
            "#,
        ))
        .bind(data.parent_kind)
        .bind(data.parent_id)
        .bind(data.author_id)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Lists a parent's comments, oldest first
    pub async fn list_for_parent(
        pool: &PgPool,
        parent_kind: CommentParent,
        parent_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE parent_kind = $1 AND parent_id = $2
            ORDER BY created_at ASC
            "#,
        ))
        .bind(parent_kind)
        .bind(parent_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Finds one comment scoped to its parent
    ///
    /// Returns None when the comment doesn't exist or belongs to a different
    /// parent.
    pub async fn find_for_parent(
        pool: &PgPool,
        id: Uuid,
        parent_kind: CommentParent,
        parent_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE id = $1 AND parent_kind = $2 AND parent_id = $3
            "#,
        ))
        .bind(id)
        .bind(parent_kind)
        .bind(parent_id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Toggles a like by one user in a single atomic statement
    ///
    /// # Returns
    ///
    /// The new like status if the comment exists, None otherwise
    pub async fn toggle_like(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LikeStatus>, sqlx::Error> {
        let status = sqlx::query_as::<_, LikeStatus>(
            r#"
            UPDATE comments
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

    /// Deletes a comment
    ///
    /// # Returns
    ///
    /// True if the comment was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts comments per parent for a batch of parent ids
    ///
    /// Parents with zero comments are absent from the returned map.
    pub async fn counts_for_parents(
        pool: &PgPool,
        parent_kind: CommentParent,
        parent_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, i64>, sqlx::Error> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT parent_id, COUNT(*)
            FROM comments
            WHERE parent_kind = $1 AND parent_id = ANY($2)
            GROUP BY parent_id
            "#,
        )
        .bind(parent_kind)
        .bind(parent_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
