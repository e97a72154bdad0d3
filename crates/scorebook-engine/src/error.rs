//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and command execution.

use scorebook_types::AggregateKind;
use uuid::Uuid;

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: scorebook_core::ConfigError,
    },

    /// Connecting to or migrating a store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying data-layer error.
        #[from]
        source: scorebook_db::DbError,
    },

    /// Loading or saving an aggregate failed.
    #[error("repository error: {source}")]
    Repository {
        /// The underlying repository error.
        #[from]
        source: scorebook_db::RepositoryError,
    },

    /// A command was rejected by the domain rules.
    #[error("domain error: {source}")]
    Domain {
        /// The underlying domain error.
        #[from]
        source: scorebook_core::DomainError,
    },

    /// The requested stream has no events.
    #[error("no {kind} stream with id {id}")]
    NotFound {
        /// Aggregate kind that was asked for.
        kind: AggregateKind,
        /// Stream id that was asked for.
        id: Uuid,
    },

    /// A command asked for snapshots while they are disabled.
    #[error("snapshots are disabled in the configuration")]
    SnapshotsDisabled,

    /// Rendering output failed.
    #[error("output error: {source}")]
    Output {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
