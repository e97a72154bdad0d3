//! Error types for the data layer.
//!
//! Store adapters report failures via [`DbError`], which wraps the
//! underlying [`sqlx`] and [`fred`] errors. Repositories translate them
//! into the [`RepositoryError`](crate::RepositoryError) surface.

use scorebook_events::CodecError;
use uuid::Uuid;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An event could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// The stream is not at the version the writer expected. Nothing was
    /// appended.
    #[error("concurrency conflict on stream {stream_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The stream being appended to.
        stream_id: Uuid,
        /// Version the writer expected.
        expected: u64,
        /// Version the store is at.
        actual: u64,
    },

    /// A stored row cannot be turned back into an envelope.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
