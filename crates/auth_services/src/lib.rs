//! # Auth Services
//!
//! This crate provides authentication services for the application.
//! It includes the user account service, cookie-session handling with
//! flash messages, and the shared identity types.

/// Service definitions for user registration, login, and profile updates.
pub mod service;
/// Cookie-session wrapper and read-once flash messages.
pub mod session;
/// Types and structures used in authentication services.
pub mod types;
