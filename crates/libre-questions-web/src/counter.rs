//! Name and counter operations scoped to one visitor.
//!
//! Holds no locks. Correctness under concurrent requests for the same
//! identity comes from each store operation being a single statement.

use libre_questions_db::{Database, DbError, UserRecord, UserStore};

use crate::session::SessionId;

/// Errors returned by [`CounterService`].
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    /// The submitted name was empty. Nothing was written.
    #[error("name must not be empty")]
    EmptyName,

    /// The store rejected the operation.
    #[error("{operation} failed: {source}")]
    Store {
        /// Which operation failed.
        operation: &'static str,
        /// The underlying database error.
        source: DbError,
    },
}

/// "Set name" and "increment" against the identity store.
#[derive(Debug, Clone)]
pub struct CounterService {
    db: Database,
}

impl CounterService {
    /// Create a service over an opened, migrated database.
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// The database backing this service.
    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// Set the visitor's display name, creating the record if needed.
    ///
    /// An existing `total` is preserved; a new record starts at zero.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::EmptyName`] without touching the store when
    /// `name` is empty, or [`CounterError::Store`] if the upsert fails.
    pub async fn set_name(&self, id: &SessionId, name: &str) -> Result<UserRecord, CounterError> {
        if name.is_empty() {
            return Err(CounterError::EmptyName);
        }

        UserStore::new(self.db.pool())
            .upsert_name(id.as_str(), name)
            .await
            .map_err(|source| CounterError::Store {
                operation: "upsert user name",
                source,
            })
    }

    /// Add one to the visitor's counter.
    ///
    /// A visitor without a record is left without one and gets the
    /// zero-value [`UserRecord`] back.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::Store`] if the update fails.
    pub async fn increment(&self, id: &SessionId) -> Result<UserRecord, CounterError> {
        let record = UserStore::new(self.db.pool())
            .increment_total(id.as_str())
            .await
            .map_err(|source| CounterError::Store {
                operation: "update total",
                source,
            })?;

        Ok(record.unwrap_or_default())
    }

    /// The visitor's current record, or the zero-value record if none.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::Store`] if the lookup fails.
    pub async fn current(&self, id: &SessionId) -> Result<UserRecord, CounterError> {
        let record = UserStore::new(self.db.pool())
            .find_by_id(id.as_str())
            .await
            .map_err(|source| CounterError::Store {
                operation: "find user",
                source,
            })?;

        Ok(record.unwrap_or_default())
    }
}
