use serde::Deserialize;

/// Credentials and endpoint for the hosted image store, built once at startup.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Base URL of the media API
    pub api_base: String,
    /// Account name within the media host
    pub cloud_name: String,
    /// API key for the account
    pub api_key: String,
    /// API secret for the account
    pub api_secret: String,
}

/// A stored image as reported by the media host.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    /// Stable URL serving the image
    #[serde(rename = "secure_url")]
    pub url: String,

    /// Opaque handle used to destroy the remote asset later
    pub public_id: String,
}

/// Errors from the media host ("upstream failure" at the handler boundary).
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The media host could not be reached
    #[error("Media host unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The media host rejected the request
    #[error("Media host rejected the request: {0}")]
    Rejected(String),
}
