use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Avatar assigned at registration when the user does not supply one.
pub const DEFAULT_AVATAR: &str =
    "https://cdn.pixabay.com/photo/2016/08/08/09/17/avatar-1577909_1280.png";

/// Request structure for user registration
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username
    #[validate(length(min = 1, max = 255, message = "Username is required"))]
    pub username: String,

    /// Password for the user account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Avatar URL; blank means the default avatar is assigned
    #[serde(default)]
    pub avatar: String,

    /// First name of the user
    #[serde(default)]
    pub first_name: String,

    /// Last name of the user
    #[serde(default)]
    pub last_name: String,

    /// Email address of the user
    #[serde(default)]
    pub email: String,

    /// Free-text profile description
    #[serde(default)]
    pub description: String,
}

/// Request structure for user login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username of the user
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password for the user account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request structure for updating a user profile
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// Avatar URL shown next to the user's content
    #[serde(default)]
    pub avatar: String,

    /// First name of the user
    #[serde(default)]
    pub first_name: String,

    /// Last name of the user
    #[serde(default)]
    pub last_name: String,

    /// Email address of the user
    #[validate(length(max = 255, message = "Email is too long"))]
    #[serde(default)]
    pub email: String,

    /// Free-text profile description
    #[serde(default)]
    pub description: String,
}

/// User model representing the database schema
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Unique username chosen at registration
    pub username: String,
    /// Hashed password of the user; never exposed to views
    pub password_hash: String,
    /// Avatar URL shown next to the user's content
    pub avatar: String,
    /// First name of the user
    pub first_name: String,
    /// Last name of the user
    pub last_name: String,
    /// Email address of the user
    pub email: String,
    /// Free-text profile description
    pub description: String,
    /// Whether the user may act on any resource
    pub is_admin: bool,
    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

/// Actor snapshot persisted in the session cookie at login.
///
/// Carries just enough identity for display and ownership checks, so a
/// request does not need a user lookup before rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Username at the time the session was established
    pub username: String,
    /// Avatar URL at the time the session was established
    pub avatar: String,
    /// Whether the user may act on any resource
    pub is_admin: bool,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar: user.avatar.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The username is already registered
    #[error("A user with the given username is already registered")]
    UsernameTaken,

    /// The provided credentials are invalid
    #[error("Username or password is incorrect.")]
    InvalidCredentials,

    /// The user was not found in the system
    #[error("User not found")]
    UserNotFound,

    /// An internal server error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error occurred while hashing the password
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// The session cookie could not be read or written
    #[error("Session error: {0}")]
    Session(String),

    /// An error occurred while validating input data
    #[error("Validation error: {0}")]
    Validation(String),
}

impl actix_web::ResponseError for AuthError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            AuthError::UsernameTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
