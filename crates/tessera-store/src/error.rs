//! Error types for the persistence layer.
//!
//! The placement engine retries a bounded number of times on failures
//! that [`StoreError::is_retryable`] reports as transient; everything
//! else is surfaced immediately.

use tessera_types::BoardId;

/// Errors that can occur in the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An insert targeted an id that already exists.
    #[error("board {0} already exists")]
    AlreadyExists(BoardId),

    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The persisted pixel log could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored enum column held a value no variant matches.
    #[error("corrupt column {column}: {value:?}")]
    CorruptColumn {
        /// The offending column name.
        column: &'static str,
        /// The value found there.
        value: String,
    },

    /// A configuration error (e.g. an unparsable database URL).
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether retrying the same operation could plausibly succeed.
    ///
    /// Connection-level failures are transient; constraint violations,
    /// corrupt data, and serialization failures are not.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Postgres(source) => matches!(
                source,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::WorkerCrashed
            ),
            Self::AlreadyExists(_)
            | Self::Migration(_)
            | Self::Serialization(_)
            | Self::CorruptColumn { .. }
            | Self::Config(_) => false,
        }
    }
}
