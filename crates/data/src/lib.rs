//! Catalog and cache persistence for the draft simulator.
//!
//! Provides CSV import, projection stores and the PostgreSQL repositories
//! backing the catalog and the shared simulation cache.

/// Store error types.
pub mod error;
/// CSV catalog import.
pub mod import;
/// Database repositories.
pub mod repositories;
/// Projection catalog sources.
pub mod store;

pub use error::StoreError;
pub use import::{load_players_csv, read_players};
pub use repositories::{Database, PgSimulationCache, PlayerRecord, PlayerRepository};
pub use store::{
    PgProjectionStore, PlayerTable, ProjectionStore, StaticProjectionStore, seed_if_empty,
};
