//! Application state shared by handlers.

use crate::middleware::RequestMetrics;
use crate::server::ServerConfig;
use ffdraft_data::{
    Database, PgProjectionStore, ProjectionStore, StaticProjectionStore, StoreError, seed_if_empty,
};
use ffdraft_simulation::cache::{MemoryCache, SimulationCache};
use ffdraft_simulation::orchestrator::SimulationOrchestrator;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProjectionStore>,
    pub engine: SimulationOrchestrator,
    pub metrics: Arc<RequestMetrics>,
    pub simulation_timeout: Duration,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ProjectionStore>,
        engine: SimulationOrchestrator,
        simulation_timeout: Duration,
    ) -> Self {
        Self {
            store,
            engine,
            metrics: Arc::new(RequestMetrics::new()),
            simulation_timeout,
            started_at: Instant::now(),
        }
    }

    /// Wires the store, cache and engine described by `config`: PostgreSQL
    /// for both when a database URL is set (an empty player table is first
    /// seeded from the CSV catalog), otherwise the CSV catalog with an
    /// in-memory cache.
    ///
    /// # Errors
    /// Returns an error if the database is unreachable, migrations fail, or
    /// the catalog file is invalid.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, StoreError> {
        let (store, cache): (Arc<dyn ProjectionStore>, Arc<dyn SimulationCache>) =
            match &config.database_url {
                Some(url) => {
                    let db = Database::connect(url).await?;
                    db.migrate().await?;
                    seed_if_empty(&db.players(), &config.players_csv).await?;
                    info!("Using PostgreSQL catalog and cache");
                    (
                        Arc::new(PgProjectionStore::new(db.players())),
                        Arc::new(db.simulation_cache()),
                    )
                }
                None => {
                    let store = StaticProjectionStore::from_csv(&config.players_csv)?;
                    info!(path = %config.players_csv.display(), "Using CSV catalog and in-memory cache");
                    (
                        Arc::new(store),
                        Arc::new(MemoryCache::new(config.cache_max_entries)),
                    )
                }
            };

        let engine = SimulationOrchestrator::new(cache, config.engine_config());
        Ok(Self::new(store, engine, config.simulation_timeout))
    }

    /// Server uptime in seconds.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
