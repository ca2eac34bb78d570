//! Server configuration and startup.

use crate::routes::create_router;
use crate::state::AppState;
use ffdraft_simulation::cache::DEFAULT_PURGE_INTERVAL;
use ffdraft_simulation::monte_carlo::RandomSource;
use ffdraft_simulation::orchestrator::{DEFAULT_BATCH_THRESHOLD, EngineConfig};
use ffdraft_simulation::sampler::SamplerStrategy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Server configuration, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// PostgreSQL connection string. Without it the CSV catalog and the
    /// in-memory cache are used.
    pub database_url: Option<String>,
    /// Catalog file used when no database is configured.
    pub players_csv: PathBuf,
    pub cache_ttl: Duration,
    pub cache_max_entries: u64,
    /// Period between sweeps of expired cache entries.
    pub cache_purge_interval: Duration,
    /// Longest a `/simulate` caller waits before a 504.
    pub simulation_timeout: Duration,
    pub batch_threshold: usize,
    /// `auto`, `scalar` or `batched`.
    pub sampler_strategy: SamplerStrategy,
    /// Fixed seed for reproducible runs.
    pub simulation_seed: Option<u64>,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            database_url: None,
            players_csv: PathBuf::from("data/players.csv"),
            cache_ttl: Duration::from_secs(300),
            cache_max_entries: 1_000,
            cache_purge_interval: DEFAULT_PURGE_INTERVAL,
            simulation_timeout: Duration::from_secs(30),
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
            sampler_strategy: SamplerStrategy::Auto,
            simulation_seed: None,
            cors_origins: vec!["http://localhost:5173".into()],
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl ServerConfig {
    /// Create config from environment variables. Unset or unparsable
    /// values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT").unwrap_or(defaults.port),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            players_csv: std::env::var("PLAYERS_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.players_csv),
            cache_ttl: env_parse("CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_max_entries: env_parse("CACHE_MAX_ENTRIES")
                .unwrap_or(defaults.cache_max_entries),
            cache_purge_interval: env_parse("CACHE_PURGE_INTERVAL_SECS")
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_purge_interval),
            simulation_timeout: env_parse("SIMULATION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.simulation_timeout),
            batch_threshold: env_parse("BATCH_THRESHOLD").unwrap_or(defaults.batch_threshold),
            sampler_strategy: env_parse("SAMPLER_STRATEGY").unwrap_or(defaults.sampler_strategy),
            simulation_seed: env_parse("SIMULATION_SEED"),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.cors_origins),
        }
    }

    /// Get bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Engine settings derived from this configuration.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        let source = self
            .simulation_seed
            .map_or(RandomSource::Entropy, RandomSource::Seeded);
        EngineConfig::default()
            .with_cache_ttl(self.cache_ttl)
            .with_batch_threshold(self.batch_threshold)
            .with_strategy(self.sampler_strategy)
            .with_random_source(source)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Serves the API until Ctrl-C, sweeping expired cache entries meanwhile.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let purger = state.engine.spawn_cache_purger(config.cache_purge_interval);
    let router = create_router(state, &config.cors_origins);
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "API server listening");
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await;
    purger.abort();
    served
}
