use actix_multipart::form::{MultipartForm, bytes::Bytes, text::Text};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use auth_services::types::AuthError;
use media_services::MediaError;

/// Settings shared with handlers at startup; never read from the environment
/// after construction.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Registration code that grants the administrator flag
    pub admin_code: String,
}

/// Immutable author snapshot embedded in a campground at creation time.
/// Display-name changes do not propagate to historical content.
#[derive(Debug, Clone)]
pub struct Author {
    /// The author's user id
    pub id: Uuid,
    /// The author's username when the record was created
    pub username: String,
}

/// Immutable author snapshot embedded in a comment at creation time.
#[derive(Debug, Clone)]
pub struct CommentAuthor {
    /// The author's user id
    pub id: Uuid,
    /// The author's username when the comment was created
    pub username: String,
    /// The author's avatar when the comment was created
    pub avatar: String,
}

/// A community-contributed place entry.
#[derive(Debug, Clone)]
pub struct Campground {
    /// Unique identifier for the campground
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Price per night
    pub price: f64,
    /// Free-text description
    pub description: String,
    /// Hosted image URL
    pub image_url: String,
    /// Opaque handle used to release the hosted image
    pub image_id: String,
    /// Snapshot of the creating user
    pub author: Author,
    /// Ordered references to this campground's comments
    pub comment_ids: Vec<Uuid>,
    /// Timestamp when the campground was created
    pub created_at: DateTime<Utc>,
}

/// A free-text remark attached to one campground.
#[derive(Debug, Clone)]
pub struct Comment {
    /// Unique identifier for the comment
    pub id: Uuid,
    /// Comment body
    pub body: String,
    /// Snapshot of the commenting user
    pub author: CommentAuthor,
    /// Timestamp when the comment was created
    pub created_at: DateTime<Utc>,
}

/// Query string for the campground index.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Free-text fuzzy search over campground names
    pub search: Option<String>,
}

/// Multipart form for creating or updating a campground.
#[derive(Debug, MultipartForm)]
pub struct CampgroundUpload {
    /// Display name
    pub name: Text<String>,
    /// Price per night, parsed by the handler so a bad value flashes
    /// instead of failing inside the extractor
    pub price: Text<String>,
    /// Free-text description
    pub description: Text<String>,
    /// Image file; required at creation, optional on update
    #[multipart(limit = "10MB")]
    pub image: Option<Bytes>,
}

/// Form body for creating or updating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    /// Comment body
    #[validate(length(min = 1, message = "Comment text is required"))]
    pub body: String,
}

/// Registration form; everything beyond the credentials is optional.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    /// Desired username
    #[validate(length(min = 1, max = 255, message = "Username is required"))]
    pub username: String,

    /// Password for the new account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Avatar URL; blank gets the default avatar
    #[serde(default)]
    pub avatar: String,

    /// First name
    #[serde(default)]
    pub first_name: String,

    /// Last name
    #[serde(default)]
    pub last_name: String,

    /// Email address
    #[serde(default)]
    pub email: String,

    /// Free-text profile description
    #[serde(default)]
    pub description: String,

    /// Code granting the administrator flag when it matches the server secret
    #[serde(default)]
    pub admin_code: String,
}

/// Errors that escape a handler instead of becoming a flash message.
/// Normal-operation failures are recovered at the handler boundary; these
/// surface only when the session machinery itself breaks.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// A database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An account operation failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The media host failed
    #[error(transparent)]
    Media(#[from] MediaError),
}

impl actix_web::ResponseError for WebError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}
