//! Data layer for the Scorebook live game tracker (`PostgreSQL` + `Dragonfly`).
//!
//! `PostgreSQL` holds the append-only event log and, optionally, the latest
//! snapshot of each aggregate. `Dragonfly` can serve as a faster snapshot
//! cache instead. In-memory adapters of both ports back tests and local
//! runs.
//!
//! # Architecture
//!
//! ```text
//! EventSourcedRepository<A>
//!     |
//!     +-- append / read streams --> dyn EventStore
//!     |                              |-- InMemoryEventStore
//!     |                              +-- PgEventStore          (events table)
//!     |
//!     +-- optional snapshots ----> dyn SnapshotStore
//!                                    |-- InMemorySnapshotStore
//!                                    |-- PgSnapshotStore       (snapshots table)
//!                                    +-- DragonflySnapshotStore (snapshot:{kind}:{id})
//! ```
//!
//! # Modules
//!
//! - [`event_store`] -- The [`EventStore`] port and [`InMemoryEventStore`]
//! - [`snapshot_store`] -- The [`SnapshotStore`] port, [`InMemorySnapshotStore`],
//!   and [`PgSnapshotStore`]
//! - [`postgres`] -- `PostgreSQL` connection pool and [`PgEventStore`]
//! - [`dragonfly`] -- `Dragonfly` connection and [`DragonflySnapshotStore`]
//! - [`repository`] -- [`EventSourcedRepository`] and its error surface
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod event_store;
pub mod postgres;
pub mod repository;
pub mod snapshot_store;

// Re-export primary types for convenience.
pub use dragonfly::{DragonflyPool, DragonflySnapshotStore};
pub use error::DbError;
pub use event_store::{EventStore, InMemoryEventStore};
pub use postgres::{EventRow, PgEventStore, PostgresConfig, PostgresPool};
pub use repository::{
    EventSourcedRepository, RepositoryError, RepositoryErrorKind, SnapshotPolicy,
};
pub use snapshot_store::{InMemorySnapshotStore, PgSnapshotStore, SnapshotStore};
