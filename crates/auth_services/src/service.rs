use bcrypt::{DEFAULT_COST, hash, verify};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::types::{AuthError, DEFAULT_AVATAR, RegisterRequest, UpdateProfileRequest, User};

/// A service for handling user account operations such as registration,
/// credential verification, and profile updates.
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    /// Creates a new instance of `AuthService` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a new user with the provided request.
    ///
    /// The password is bcrypt-hashed before storage; the caller decides the
    /// administrator flag (see [`admin_code_matches`]). A blank avatar is
    /// replaced with the default one.
    pub async fn register(
        &self,
        request: &RegisterRequest,
        is_admin: bool,
    ) -> Result<User, AuthError> {
        // Check if the username is already taken
        let existing_user = sqlx::query("SELECT id FROM users WHERE username = $1")
            .bind(request.username.trim())
            .fetch_optional(&self.pool)
            .await?;

        if existing_user.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        // Hash the password
        let password_hash = hash(&request.password, DEFAULT_COST)?;

        let avatar = if request.avatar.trim().is_empty() {
            DEFAULT_AVATAR
        } else {
            request.avatar.trim()
        };

        // Insert the new user
        let row = sqlx::query(
            r#"
            INSERT INTO users (
                id, username, password_hash, avatar,
                first_name, last_name, email, description, is_admin
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id, username, password_hash, avatar,
                first_name, last_name, email, description, is_admin, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.username.trim())
        .bind(&password_hash)
        .bind(avatar)
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(request.email.trim())
        .bind(request.description.trim())
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(&row))
    }

    /// Retrieves a user by their username, returning `None` if not found.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query(
            r#"
            SELECT
                id, username, password_hash, avatar,
                first_name, last_name, email, description, is_admin, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Retrieves a user by their ID, returning `None` if not found.
    pub async fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<User>, AuthError> {
        let row = sqlx::query(
            r#"
            SELECT
                id, username, password_hash, avatar,
                first_name, last_name, email, description, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Verifies the user's password against the stored hash.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = verify(password, &user.password_hash)?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Updates the user's profile information.
    ///
    /// The username is immutable; historical content keeps the snapshot taken
    /// at creation time either way.
    pub async fn update_profile(
        &self,
        user_id: &Uuid,
        request: &UpdateProfileRequest,
    ) -> Result<User, AuthError> {
        let avatar = if request.avatar.trim().is_empty() {
            DEFAULT_AVATAR
        } else {
            request.avatar.trim()
        };

        let row = sqlx::query(
            r#"
            UPDATE users
            SET avatar = $1,
                first_name = $2,
                last_name = $3,
                email = $4,
                description = $5
            WHERE id = $6
            RETURNING
                id, username, password_hash, avatar,
                first_name, last_name, email, description, is_admin, created_at
            "#,
        )
        .bind(avatar)
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(request.email.trim())
        .bind(request.description.trim())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::UserNotFound)?;

        Ok(user_from_row(&row))
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        avatar: row.get("avatar"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        description: row.get("description"),
        is_admin: row.get("is_admin"),
        created_at: row.get("created_at"),
    }
}

/// Compares a submitted admin registration code against the configured secret
/// in constant time, so the comparison does not leak a matching prefix.
pub fn admin_code_matches(submitted: &str, secret: &str) -> bool {
    let submitted = submitted.as_bytes();
    let secret = secret.as_bytes();

    if submitted.len() != secret.len() {
        return false;
    }

    submitted
        .iter()
        .zip(secret)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_code_matches() {
        assert!(admin_code_matches("opensesame", "opensesame"));
        assert!(!admin_code_matches("opensesame", "opensesami"));
        assert!(!admin_code_matches("", "opensesame"));
        assert!(!admin_code_matches("opensesame", ""));
        // Matching prefix with differing length must not match
        assert!(!admin_code_matches("opensesame1", "opensesame"));
    }

    #[test]
    fn test_admin_code_empty_secret() {
        assert!(!admin_code_matches("anything", ""));
    }
}
