//! Store wiring: picks the event and snapshot adapters the configuration
//! asks for and hands out repositories over them.

use std::sync::Arc;

use scorebook_core::{Aggregate, ScorebookConfig, SnapshotBackend};
use scorebook_db::{
    DragonflyPool, EventSourcedRepository, EventStore, PgSnapshotStore, PostgresConfig,
    PostgresPool, SnapshotPolicy, SnapshotStore,
};
use tracing::info;

use crate::error::EngineError;

/// The connected stores of one engine run.
pub struct Stores {
    events: Arc<dyn EventStore>,
    snapshots: Option<(Arc<dyn SnapshotStore>, SnapshotPolicy)>,
    postgres: Option<PostgresPool>,
}

impl Stores {
    /// Connect to `PostgreSQL`, apply migrations, and open the configured
    /// snapshot backend.
    pub async fn connect(config: &ScorebookConfig) -> Result<Self, EngineError> {
        let infra = &config.infrastructure;
        let pg_config =
            PostgresConfig::new(&infra.postgres_url).with_max_connections(infra.max_connections);
        let pool = PostgresPool::connect(&pg_config).await?;
        pool.run_migrations().await?;

        let snapshots: Option<(Arc<dyn SnapshotStore>, SnapshotPolicy)> =
            if config.snapshots.enabled {
                let policy = SnapshotPolicy::every(config.snapshots.every_n_events);
                let store: Arc<dyn SnapshotStore> = match config.snapshots.backend {
                    SnapshotBackend::Postgres => Arc::new(PgSnapshotStore::new(pool.pool().clone())),
                    SnapshotBackend::Dragonfly => {
                        let dragonfly = DragonflyPool::connect(&infra.dragonfly_url).await?;
                        Arc::new(dragonfly.snapshot_store())
                    }
                };
                info!(
                    backend = ?config.snapshots.backend,
                    every_n_events = policy.every_n_events(),
                    "Snapshot store ready"
                );
                Some((store, policy))
            } else {
                info!("Snapshots disabled");
                None
            };

        Ok(Self {
            events: Arc::new(pool.event_store()),
            snapshots,
            postgres: Some(pool),
        })
    }

    /// Process-local stores, with in-memory snapshots when `policy` is set.
    #[cfg(test)]
    pub fn in_memory(policy: Option<SnapshotPolicy>) -> Self {
        Self {
            events: Arc::new(scorebook_db::InMemoryEventStore::new()),
            snapshots: policy.map(|policy| {
                let store: Arc<dyn SnapshotStore> =
                    Arc::new(scorebook_db::InMemorySnapshotStore::new());
                (store, policy)
            }),
            postgres: None,
        }
    }

    /// The event store.
    pub fn events(&self) -> &dyn EventStore {
        self.events.as_ref()
    }

    /// A repository for aggregates of type `A` over these stores.
    pub fn repository<A: Aggregate>(&self) -> EventSourcedRepository<A> {
        let repository =
            EventSourcedRepository::new(Arc::clone(&self.events)).with_source("scorebook-engine");
        match &self.snapshots {
            Some((store, policy)) => repository.with_snapshots(Arc::clone(store), *policy),
            None => repository,
        }
    }

    /// Close the `PostgreSQL` pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.postgres {
            pool.close().await;
        }
    }
}
