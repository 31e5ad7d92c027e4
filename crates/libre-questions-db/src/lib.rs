//! Data layer for Libre Questions (embedded `SQLite`).
//!
//! A single `users` table keyed by session identity holds each visitor's
//! display name and counter. The database runs in write-ahead-log mode so
//! readers never block the single writer, and every mutation is one SQL
//! statement so concurrent requests for the same identity cannot lose
//! updates.
//!
//! # Modules
//!
//! - [`sqlite`] -- connection pool, configuration, and migrations
//! - [`user_store`] -- upsert, increment, and lookup of identity records
//! - [`error`] -- shared error types

pub mod error;
pub mod sqlite;
pub mod user_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use sqlite::{Database, DatabaseConfig};
pub use user_store::{UserRecord, UserStore};
