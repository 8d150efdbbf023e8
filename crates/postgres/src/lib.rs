//! # Postgres
//!
//! This crate provides a client for the YonderCamp application to interact with a PostgreSQL database.

/// Database client for the YonderCamp application.
pub mod database;
