//! Identity records keyed by session token.
//!
//! Each operation is a single SQL statement. `SQLite` runs a statement
//! atomically under its write lock, so an upsert or an increment can never
//! interleave with another writer touching the same row and no update is
//! lost when a client double-submits.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbError;

/// A visitor's stored state.
///
/// The [`Default`] value (empty id and name, zero total) doubles as the
/// placeholder handed to templates when no row exists for an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserRecord {
    /// Session token, 64 lowercase hex characters.
    pub id: String,
    /// Display name chosen by the visitor.
    pub name: String,
    /// Number of increments so far. Never negative.
    pub total: i64,
}

/// Operations on the `users` table.
pub struct UserStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserStore<'a> {
    /// Create a new user store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert `(id, name, 0)`, or change only the name if `id` exists.
    ///
    /// The stored `total` is never touched by this call.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the statement fails.
    pub async fn upsert_name(&self, id: &str, name: &str) -> Result<UserRecord, DbError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r"INSERT INTO users (id, name, total)
              VALUES (?1, ?2, 0)
              ON CONFLICT (id) DO UPDATE
              SET name = excluded.name
              RETURNING id, name, total",
        )
        .bind(id)
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(id, total = record.total, "Upserted user name");

        Ok(record)
    }

    /// Add one to `total` for an existing row.
    ///
    /// Returns `None` when no row matches `id`; no row is created.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the statement fails.
    pub async fn increment_total(&self, id: &str) -> Result<Option<UserRecord>, DbError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r"UPDATE users
              SET total = total + 1
              WHERE id = ?1
              RETURNING id, name, total",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match &record {
            Some(r) => tracing::debug!(id, total = r.total, "Incremented user total"),
            None => tracing::debug!(id, "Increment matched no user"),
        }

        Ok(record)
    }

    /// Look up a row without modifying it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DbError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r"SELECT id, name, total
              FROM users
              WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Count all stored identities.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn count(&self) -> Result<i64, DbError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(row.0)
    }
}
