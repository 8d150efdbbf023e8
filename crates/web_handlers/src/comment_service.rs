use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use auth_services::types::SessionUser;

use crate::types::{Comment, CommentAuthor, WebError};

const COMMENT_COLUMNS: &str = "id, body, author_id, author_username, author_avatar, created_at";

/// Service for comment persistence operations.
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    /// Creates a new instance of `CommentService` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a comment by id, returning `None` if absent.
    pub async fn find(&self, id: &Uuid) -> Result<Option<Comment>, WebError> {
        let row = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(comment_from_row))
    }

    /// Resolves an ordered reference collection into comments.
    ///
    /// Dangling references (deleted comments never pruned from the parent's
    /// collection) simply produce no row and are skipped.
    pub async fn find_referenced(&self, comment_ids: &[Uuid]) -> Result<Vec<Comment>, WebError> {
        if comment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ANY($1) \
             ORDER BY array_position($1, id)"
        ))
        .bind(comment_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    /// Persists a new comment with the actor's identity snapshotted as author.
    ///
    /// First write of the two-step creation; the caller appends the returned
    /// id to the campground's reference collection afterwards.
    pub async fn create(&self, body: &str, author: &SessionUser) -> Result<Comment, WebError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO comments (id, body, author_id, author_username, author_avatar)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(body)
        .bind(author.id)
        .bind(&author.username)
        .bind(&author.avatar)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment_from_row(&row))
    }

    /// Replaces the comment body.
    pub async fn update(&self, id: &Uuid, body: &str) -> Result<(), WebError> {
        sqlx::query("UPDATE comments SET body = $1 WHERE id = $2")
            .bind(body)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Hard-deletes the comment row.
    ///
    /// The parent campground's comment_ids is NOT pruned here; the reference
    /// dangles until the campground itself is deleted. Inherited behavior,
    /// tolerated by `find_referenced`.
    pub async fn delete(&self, id: &Uuid) -> Result<(), WebError> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        body: row.get("body"),
        author: CommentAuthor {
            id: row.get("author_id"),
            username: row.get("author_username"),
            avatar: row.get("author_avatar"),
        },
        created_at: row.get("created_at"),
    }
}
