//! # Web Handlers for the YonderCamp Web Application
//!
//! This crate provides the HTTP handlers for the YonderCamp application:
//! campground and comment lifecycles, user profiles, registration and login,
//! plus the ownership gate and the server-rendered views they share.

/// Campground lifecycle handlers (index/search, create, show, update, delete)
pub mod campground_handlers;

/// Campground persistence service and the fuzzy-search query builder
pub mod campground_service;

/// Comment lifecycle handlers (create, update, delete)
pub mod comment_handlers;

/// Comment persistence service
pub mod comment_service;

/// Method override so HTML forms can reach PUT and DELETE routes
pub mod method_override;

/// Ownership-based authorization gate shared by all resource kinds
pub mod ownership;

/// Registration, login, logout, and the landing page
pub mod session_handlers;

/// Shared record types, form types, and settings
pub mod types;

/// User profile handlers (show, edit, update)
pub mod user_handlers;

/// Server-rendered HTML pages
pub mod views;
