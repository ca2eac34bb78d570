//! Monte Carlo draft simulation engine.
//!
//! The crate turns a catalog snapshot and a validated request into
//! per-player outcome distributions:
//! - [`params`] validates raw requests
//! - [`cache_key`] derives deterministic cache keys
//! - [`sampler`] draws trials (scalar and batched paths)
//! - [`aggregator`] reduces trials to mean, spread and boom/bust rates
//! - [`orchestrator`] ties caching, single-flight and computation together

/// Per-player trial aggregation.
pub mod aggregator;
/// Cache collaborator trait and in-memory backend.
pub mod cache;
/// Canonical fingerprints and cache keys.
pub mod cache_key;
/// Catalog snapshots.
pub mod catalog;
/// Sampling and aggregation over a whole catalog.
pub mod monte_carlo;
/// Request orchestration.
pub mod orchestrator;
/// Request validation.
pub mod params;
/// Convenient re-exports.
pub mod prelude;
/// Outcome samplers.
pub mod sampler;
/// Scoring-format adjustments.
pub mod scoring;
/// Per-key locking.
pub mod single_flight;
