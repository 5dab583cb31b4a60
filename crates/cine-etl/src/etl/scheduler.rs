//! Sync scheduler
//!
//! Runs one pipeline task per entity kind each cycle, waits for all of
//! them, sleeps the refresh interval and goes again. Kinds are fully
//! independent: a failing pipeline is logged and retried next cycle
//! without touching the others.

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::filmwork::Filmwork;
use super::genre::Genre;
use super::kind::EntityKind;
use super::person::Person;
use super::pipeline::Pipeline;
use crate::config::EtlConfig;
use crate::search::SearchClient;
use crate::state::SyncState;

/// Drives the per-kind pipelines on a fixed interval
pub struct Scheduler {
    config: EtlConfig,
    pool: PgPool,
    search: SearchClient,
    state: SyncState,
}

impl Scheduler {
    /// Create a new scheduler over already-established backends
    pub fn new(config: EtlConfig, pool: PgPool, search: SearchClient, state: SyncState) -> Self {
        Self {
            config,
            pool,
            search,
            state,
        }
    }

    /// Run sync cycles forever
    pub async fn run_forever(&self) {
        let interval = Duration::from_secs(self.config.sync.refresh_interval_secs);
        info!(
            refresh_interval_secs = self.config.sync.refresh_interval_secs,
            "scheduler started"
        );

        loop {
            self.run_cycle().await;
            tokio::time::sleep(interval).await;
        }
    }

    /// Run every kind's pipeline once, concurrently, and wait for all
    pub async fn run_cycle(&self) {
        info!("starting sync cycle");

        let handles = [
            self.spawn_pipeline::<Filmwork>(),
            self.spawn_pipeline::<Genre>(),
            self.spawn_pipeline::<Person>(),
        ];

        for handle in handles {
            if let Err(join_error) = handle.await {
                // A panicked pipeline task is isolated like an erroring one.
                error!(error = %join_error, "pipeline task aborted");
            }
        }

        info!("sync cycle finished");
    }

    /// Launch one kind's pipeline as its own task
    ///
    /// Pipelines share the pool, search client and state handles, each of
    /// which is safe to use from concurrent tasks; the per-kind state keys
    /// never overlap.
    fn spawn_pipeline<K: EntityKind>(&self) -> JoinHandle<()> {
        let pipeline = Pipeline::<K>::new(
            self.pool.clone(),
            self.search.clone(),
            self.state.clone(),
            self.config.sync.batch_size,
        );

        tokio::spawn(async move {
            if let Err(error) = pipeline.execute().await {
                error!(
                    kind = K::KIND,
                    error = %error,
                    "sync run failed; the watermark stays put and the next cycle retries"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::MemoryStorage;

    #[tokio::test]
    async fn test_scheduler_creation() {
        let config = EtlConfig::default();
        let pool = PgPool::connect_lazy(&config.database.url).unwrap();
        let search = SearchClient::new(&config.search).unwrap();
        let state = SyncState::new(Arc::new(MemoryStorage::new()));

        let scheduler = Scheduler::new(config.clone(), pool, search, state);
        assert_eq!(
            scheduler.config.sync.batch_size,
            config.sync.batch_size
        );
    }
}
