//! # Media Services
//!
//! This crate provides the client for the hosted image store. Listing images
//! are uploaded there and referenced by URL; deletion happens by the opaque
//! handle returned at upload time.

/// Client for uploading and destroying hosted images.
pub mod service;
/// Types and structures used by the media client.
pub mod types;

pub use service::MediaService;
pub use types::{MediaConfig, MediaError, UploadedImage};
