//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use ffdraft_simulation::prelude::*;
//! ```

// Aggregation
pub use crate::aggregator::{BOOM_MULTIPLIER, BUST_MULTIPLIER, PlayerStats, Thresholds};

// Caching
pub use crate::cache::{
    CacheError, DEFAULT_CACHE_TTL, DEFAULT_PURGE_INTERVAL, MemoryCache, SimulationCache, spawn_purger,
};
pub use crate::cache_key::{CACHE_KEY_PREFIX, derive_cache_key};

// Catalog
pub use crate::catalog::Catalog;

// Monte Carlo
pub use crate::monte_carlo::{MonteCarloRunner, RandomSource, RunOutput};

// Orchestration
pub use crate::orchestrator::{
    CacheStatus, EngineConfig, EngineStatsSnapshot, SamplerSet, SimulationOrchestrator,
    SimulationOutcome,
};

// Parameters
pub use crate::params::{
    DEFAULT_BUDGET, DEFAULT_NUM_SIMULATIONS, MAX_BUDGET, MAX_SIMULATIONS, SimulationParameters,
};

// Sampling
pub use crate::sampler::{BatchedSampler, PlayerDraw, Sampler, SamplerStrategy, ScalarSampler};

// Scoring
pub use crate::scoring::{ScoringAdjustment, ScoringTable};
