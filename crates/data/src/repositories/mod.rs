//! Repository implementations for database persistence.
//!
//! This module provides the projection catalog tables and the shared
//! simulation cache.

mod player_repository;
mod simulation_cache_repository;

pub use player_repository::{PlayerRecord, PlayerRepository};
pub use simulation_cache_repository::PgSimulationCache;

use sqlx::PgPool;
use std::sync::Arc;

/// Database connection wrapper for repositories.
#[derive(Clone)]
pub struct Database {
    pool: Arc<PgPool>,
}

impl Database {
    /// Creates a new Database wrapper from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Creates a new database connection from a connection string.
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a PlayerRepository instance.
    #[must_use]
    pub fn players(&self) -> PlayerRepository {
        PlayerRepository::new(self.pool.clone())
    }

    /// Creates a PgSimulationCache instance.
    #[must_use]
    pub fn simulation_cache(&self) -> PgSimulationCache {
        PgSimulationCache::new(self.pool.clone())
    }

    /// Runs database migrations.
    ///
    /// # Errors
    /// Returns an error if migrations fail.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(include_str!("../../migrations/001_initial_schema.sql"))
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
