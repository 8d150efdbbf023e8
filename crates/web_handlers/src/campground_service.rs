use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use auth_services::types::SessionUser;
use media_services::UploadedImage;

use crate::types::{Author, Campground, WebError};

const CAMPGROUND_COLUMNS: &str = "id, name, price, description, image_url, image_id, \
     author_id, author_username, comment_ids, created_at";

/// Turns raw search input into a pattern that only matches it literally.
/// Regular-expression metacharacters in the query are escaped before the
/// text reaches the database's case-insensitive regex operator.
pub fn literal_pattern(query: &str) -> String {
    regex::escape(query.trim())
}

/// Service for campground persistence operations.
pub struct CampgroundService {
    pool: PgPool,
}

impl CampgroundService {
    /// Creates a new instance of `CampgroundService` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists campgrounds, optionally fuzzy-filtered by name.
    ///
    /// The filter is a literal, case-insensitive substring match; results keep
    /// insertion order. An empty or absent query returns everything.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Campground>, WebError> {
        let rows = match search.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => {
                sqlx::query(&format!(
                    "SELECT {CAMPGROUND_COLUMNS} FROM campgrounds WHERE name ~* $1 ORDER BY created_at"
                ))
                .bind(literal_pattern(query))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {CAMPGROUND_COLUMNS} FROM campgrounds ORDER BY created_at"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(campground_from_row).collect())
    }

    /// Retrieves a campground by id, returning `None` if absent.
    pub async fn find(&self, id: &Uuid) -> Result<Option<Campground>, WebError> {
        let row = sqlx::query(&format!(
            "SELECT {CAMPGROUND_COLUMNS} FROM campgrounds WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(campground_from_row))
    }

    /// Lists the campgrounds authored by the given user, newest last.
    pub async fn by_author(&self, author_id: &Uuid) -> Result<Vec<Campground>, WebError> {
        let rows = sqlx::query(&format!(
            "SELECT {CAMPGROUND_COLUMNS} FROM campgrounds WHERE author_id = $1 ORDER BY created_at"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(campground_from_row).collect())
    }

    /// Persists a new campground with the actor's identity snapshotted as author.
    pub async fn create(
        &self,
        name: &str,
        price: f64,
        description: &str,
        image: &UploadedImage,
        author: &SessionUser,
    ) -> Result<Campground, WebError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO campgrounds (
                id, name, price, description, image_url, image_id,
                author_id, author_username
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {CAMPGROUND_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(price)
        .bind(description)
        .bind(&image.url)
        .bind(&image.public_id)
        .bind(author.id)
        .bind(&author.username)
        .fetch_one(&self.pool)
        .await?;

        Ok(campground_from_row(&row))
    }

    /// Mutates name, price, and description in place; other fields untouched.
    pub async fn update_details(
        &self,
        id: &Uuid,
        name: &str,
        price: f64,
        description: &str,
    ) -> Result<(), WebError> {
        sqlx::query("UPDATE campgrounds SET name = $1, price = $2, description = $3 WHERE id = $4")
            .bind(name)
            .bind(price)
            .bind(description)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Points the campground at a replacement hosted image.
    pub async fn set_image(&self, id: &Uuid, image: &UploadedImage) -> Result<(), WebError> {
        sqlx::query("UPDATE campgrounds SET image_url = $1, image_id = $2 WHERE id = $3")
            .bind(&image.url)
            .bind(&image.public_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Deletes the campground row. Releasing the remote image is the caller's
    /// concern; comment rows are left behind (see `comment_service`).
    pub async fn delete(&self, id: &Uuid) -> Result<(), WebError> {
        sqlx::query("DELETE FROM campgrounds WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Appends a comment reference to the campground's ordered collection.
    ///
    /// Second write of the two-step comment creation; there is no transaction
    /// spanning it and the comment insert, so a crash in between leaves a
    /// comment row no campground references.
    pub async fn push_comment_ref(
        &self,
        campground_id: &Uuid,
        comment_id: &Uuid,
    ) -> Result<(), WebError> {
        sqlx::query(
            "UPDATE campgrounds SET comment_ids = array_append(comment_ids, $1) WHERE id = $2",
        )
        .bind(comment_id)
        .bind(campground_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn campground_from_row(row: &PgRow) -> Campground {
    Campground {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        image_id: row.get("image_id"),
        author: Author {
            id: row.get("author_id"),
            username: row.get("author_username"),
        },
        comment_ids: row.get("comment_ids"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern_escapes_metacharacters() {
        assert_eq!(literal_pattern("A+B"), r"A\+B");
        assert_eq!(literal_pattern("lake (south)"), r"lake \(south\)");
        assert_eq!(literal_pattern(".*"), r"\.\*");
        assert_eq!(literal_pattern("plain"), "plain");
    }

    #[test]
    fn test_literal_pattern_matches_literally() {
        // Mirror of the database's case-insensitive regex operator
        let matches = |query: &str, name: &str| {
            regex::Regex::new(&format!("(?i){}", literal_pattern(query)))
                .unwrap()
                .is_match(name)
        };

        assert!(matches("A+B", "Camp A+B Riverside"));
        assert!(!matches("A+B", "Camp AAB Riverside"));
        assert!(matches("yosemite", "YOSEMITE VALLEY"));
        assert!(!matches("yosemite", "yellowstone"));
    }

    #[test]
    fn test_literal_pattern_trims_whitespace() {
        assert_eq!(literal_pattern("  pines  "), "pines");
    }
}
