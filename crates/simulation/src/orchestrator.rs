//! Request orchestration: validation, cache lookup, single-flight
//! computation and cache population.

use crate::aggregator::{BOOM_MULTIPLIER, BUST_MULTIPLIER};
use crate::cache::{CacheError, DEFAULT_CACHE_TTL, SimulationCache, spawn_purger};
use crate::cache_key::{Fingerprint, derive_cache_key};
use crate::catalog::Catalog;
use crate::monte_carlo::{MonteCarloRunner, RandomSource};
use crate::params::SimulationParameters;
use crate::sampler::{BatchedSampler, Sampler, SamplerStrategy, ScalarSampler};
use crate::scoring::ScoringTable;
use crate::single_flight::{Flight, SingleFlight};
use ffdraft_domain::{SimulationError, SimulationMetadata, SimulationRequest, SimulationResponse};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const CACHE_PING_KEY: &str = "sim:ping";

type FlightResult = Result<(SimulationResponse, CacheStatus), SimulationError>;

/// Default `players × trials` size at which the batched sampler kicks in.
pub const DEFAULT_BATCH_THRESHOLD: usize = 50_000;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lifetime of cached responses.
    pub cache_ttl: Duration,
    /// Sampler selection policy.
    pub strategy: SamplerStrategy,
    /// Size at which `SamplerStrategy::Auto` switches to batched sampling.
    pub batch_threshold: usize,
    pub random_source: RandomSource,
    pub scoring: ScoringTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            strategy: SamplerStrategy::default(),
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
            random_source: RandomSource::default(),
            scoring: ScoringTable::default(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: SamplerStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_batch_threshold(mut self, threshold: usize) -> Self {
        self.batch_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_random_source(mut self, source: RandomSource) -> Self {
        self.random_source = source;
        self
    }

    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringTable) -> Self {
        self.scoring = scoring;
        self
    }

    /// Hash of every setting that changes simulated results.
    #[must_use]
    pub fn model_fingerprint(&self) -> String {
        let mut fp = Fingerprint::new("model");
        fp.f64(BOOM_MULTIPLIER).f64(BUST_MULTIPLIER);
        self.scoring.fingerprint_into(&mut fp);
        fp.finish()
    }
}

/// The two sampling paths the engine can pick between.
#[derive(Clone)]
pub struct SamplerSet {
    pub scalar: Arc<dyn Sampler>,
    pub batched: Arc<dyn Sampler>,
}

impl Default for SamplerSet {
    fn default() -> Self {
        Self {
            scalar: Arc::new(ScalarSampler),
            batched: Arc::new(BatchedSampler),
        }
    }
}

impl SamplerSet {
    fn pick(&self, config: &EngineConfig, players: usize, trials: usize) -> Arc<dyn Sampler> {
        if config
            .strategy
            .use_batched(players, trials, config.batch_threshold)
        {
            Arc::clone(&self.batched)
        } else {
            Arc::clone(&self.scalar)
        }
    }
}

/// How a response was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from the cache.
    Hit,
    /// Computed and stored.
    Miss,
    /// Computed while the cache was failing; not stored.
    Bypassed,
}

impl CacheStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Bypassed => "bypass",
        }
    }
}

/// A response plus how it was served.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub response: SimulationResponse,
    pub cache_status: CacheStatus,
}

/// Running engine counters.
#[derive(Debug, Default)]
pub struct EngineStats {
    computations: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_bypassed: AtomicU64,
    coalesced: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStatsSnapshot {
    pub computations: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_bypassed: u64,
    pub coalesced: u64,
    pub failures: u64,
}

impl EngineStats {
    #[must_use]
    pub fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            computations: self.computations.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_bypassed: self.cache_bypassed.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn record(&self, status: CacheStatus) {
        let counter = match status {
            CacheStatus::Hit => &self.cache_hits,
            CacheStatus::Miss => &self.cache_misses,
            CacheStatus::Bypassed => &self.cache_bypassed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Entry point for running simulations.
///
/// Identical requests against the same catalog snapshot and engine model
/// share a cache key. Concurrent requests for one key compute once and all
/// receive that computation's response, whether or not the cache is
/// reachable; later callers read the stored response. A computation that has started runs
/// to completion and populates the cache even if its caller goes away.
#[derive(Clone)]
pub struct SimulationOrchestrator {
    cache: Arc<dyn SimulationCache>,
    config: Arc<EngineConfig>,
    samplers: SamplerSet,
    flights: SingleFlight<FlightResult>,
    model_fingerprint: Arc<str>,
    stats: Arc<EngineStats>,
}

impl SimulationOrchestrator {
    pub fn new(cache: Arc<dyn SimulationCache>, config: EngineConfig) -> Self {
        let model_fingerprint = Arc::from(config.model_fingerprint());
        Self {
            cache,
            config: Arc::new(config),
            samplers: SamplerSet::default(),
            flights: SingleFlight::new(),
            model_fingerprint,
            stats: Arc::new(EngineStats::default()),
        }
    }

    /// Replaces the sampling implementations.
    #[must_use]
    pub fn with_samplers(mut self, samplers: SamplerSet) -> Self {
        self.samplers = samplers;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn model_fingerprint(&self) -> &str {
        &self.model_fingerprint
    }

    #[must_use]
    pub fn cache_backend(&self) -> &'static str {
        self.cache.name()
    }

    #[must_use]
    pub fn stats(&self) -> EngineStatsSnapshot {
        self.stats.snapshot()
    }

    /// Starts sweeping expired cache entries every `every`.
    pub fn spawn_cache_purger(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        spawn_purger(Arc::clone(&self.cache), every)
    }

    /// Reads a sentinel key to check that the cache backend answers.
    ///
    /// # Errors
    /// The backend's error when the read fails.
    pub async fn ping_cache(&self) -> Result<(), CacheError> {
        self.cache.get(CACHE_PING_KEY).await.map(|_| ())
    }

    /// Validates `request` against `catalog` and returns per-player results.
    ///
    /// # Errors
    /// `Validation` or `UnknownPlayer` for bad input, `Computation` when the
    /// run itself fails. Cache failures are never surfaced.
    pub async fn simulate(
        &self,
        catalog: Arc<Catalog>,
        request: &SimulationRequest,
    ) -> Result<SimulationOutcome, SimulationError> {
        let params = SimulationParameters::validate(request, &catalog)?;
        let key = derive_cache_key(catalog.version(), &self.model_fingerprint, &params);

        let cache_usable = match self.cache.get(&key).await {
            Ok(Some(response)) => return Ok(self.served(response, CacheStatus::Hit)),
            Ok(None) => true,
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Cache read failed, computing without cache");
                false
            }
        };

        loop {
            match self.flights.join(&key) {
                Flight::Follower(waiter) => {
                    self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!(cache_key = %key, "Joined in-flight simulation");
                    let Some(result) = waiter.wait().await else {
                        debug!(cache_key = %key, "In-flight simulation abandoned, rejoining");
                        continue;
                    };
                    let (response, status) = result?;
                    // A stored response reaches followers as a hit.
                    let status = match status {
                        CacheStatus::Miss => CacheStatus::Hit,
                        other => other,
                    };
                    return Ok(self.served(response, status));
                }
                Flight::Leader(leader) => {
                    // The task owns the flight, so it completes and stores
                    // the response even if this future is dropped.
                    let engine = self.clone();
                    let catalog = Arc::clone(&catalog);
                    let params = params.clone();
                    let task = tokio::spawn(async move {
                        let key = leader.key().to_string();
                        let result = engine.lead(catalog, params, key, cache_usable).await;
                        leader.complete(result.clone());
                        result
                    });

                    let (response, status) = task.await.map_err(|e| {
                        SimulationError::computation(format!("simulation task failed: {e}"))
                    })??;
                    return Ok(self.served(response, status));
                }
            }
        }
    }

    /// Work done by the flight leader: a second cache read, the computation
    /// and the cache write.
    async fn lead(
        &self,
        catalog: Arc<Catalog>,
        params: SimulationParameters,
        key: String,
        cache_usable: bool,
    ) -> FlightResult {
        let mut store = cache_usable;
        if cache_usable {
            match self.cache.get(&key).await {
                Ok(Some(response)) => return Ok((response, CacheStatus::Hit)),
                Ok(None) => {}
                Err(e) => {
                    warn!(cache_key = %key, error = %e, "Cache read failed, computing without cache");
                    store = false;
                }
            }
        }

        let response = self.compute_detached(catalog, params, key.clone()).await?;
        if !store {
            return Ok((response, CacheStatus::Bypassed));
        }
        match self.cache.put(&key, &response, self.config.cache_ttl).await {
            Ok(()) => Ok((response, CacheStatus::Miss)),
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Cache write failed");
                Ok((response, CacheStatus::Bypassed))
            }
        }
    }

    fn served(&self, response: SimulationResponse, status: CacheStatus) -> SimulationOutcome {
        self.stats.record(status);
        debug!(
            cache_key = %response.metadata.cache_key,
            cache = status.as_str(),
            "Simulation served"
        );
        SimulationOutcome {
            response,
            cache_status: status,
        }
    }

    async fn compute_detached(
        &self,
        catalog: Arc<Catalog>,
        params: SimulationParameters,
        key: String,
    ) -> Result<SimulationResponse, SimulationError> {
        let config = Arc::clone(&self.config);
        let sampler = self.samplers.pick(
            &config,
            catalog.len(),
            params.num_simulations() as usize,
        );
        let stats = Arc::clone(&self.stats);

        let result = tokio::task::spawn_blocking(move || {
            compute(&catalog, &params, &config, sampler.as_ref(), key)
        })
        .await
        .map_err(|e| SimulationError::computation(format!("simulation worker failed: {e}")))
        .and_then(|r| r);

        match &result {
            Ok(_) => stats.computations.fetch_add(1, Ordering::Relaxed),
            Err(_) => stats.failures.fetch_add(1, Ordering::Relaxed),
        };
        result
    }
}

fn compute(
    catalog: &Catalog,
    params: &SimulationParameters,
    config: &EngineConfig,
    sampler: &dyn Sampler,
    cache_key: String,
) -> Result<SimulationResponse, SimulationError> {
    let started = Instant::now();
    let mut rng = config.random_source.rng();
    let output = MonteCarloRunner::new(catalog, params, &config.scoring).run(sampler, &mut rng)?;

    info!(
        players = catalog.len(),
        trials = params.num_simulations(),
        scoring_format = %params.scoring_format(),
        sampler = sampler.name(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Simulation computed"
    );

    let metadata = SimulationMetadata {
        num_simulations: params.num_simulations(),
        num_players: output.results.len(),
        scoring_format: params.scoring_format(),
        budget: params.budget(),
        cache_key,
        optimized: output.optimized,
    };
    Ok(SimulationResponse::new(output.results, metadata))
}
