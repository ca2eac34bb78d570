//! PostgreSQL-backed simulation cache.

use async_trait::async_trait;
use ffdraft_domain::SimulationResponse;
use ffdraft_simulation::cache::{CacheError, SimulationCache};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cache entries in the `simulation_cache` table.
///
/// A live row is never overwritten; an expired row is replaced on the next
/// write for its key or deleted by the next purge.
#[derive(Clone)]
pub struct PgSimulationCache {
    pool: Arc<PgPool>,
}

impl PgSimulationCache {
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn unavailable(e: sqlx::Error) -> CacheError {
    CacheError::Unavailable(e.to_string())
}

#[async_trait]
impl SimulationCache for PgSimulationCache {
    async fn get(&self, key: &str) -> Result<Option<SimulationResponse>, CacheError> {
        let row = sqlx::query(
            "SELECT result FROM simulation_cache WHERE cache_key = $1 AND expires_at > NOW()",
        )
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(unavailable)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let body: String = row.try_get("result").map_err(unavailable)?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    async fn put(
        &self,
        key: &str,
        value: &SimulationResponse,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let body =
            serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CacheError::Serialization(format!("ttl out of range: {e}")))?;
        let expires_at = chrono::Utc::now() + ttl;

        sqlx::query(
            r#"
            INSERT INTO simulation_cache (cache_key, result, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (cache_key) DO UPDATE
                SET result = EXCLUDED.result,
                    created_at = NOW(),
                    expires_at = EXCLUDED.expires_at
                WHERE simulation_cache.expires_at <= NOW()
            "#,
        )
        .bind(key)
        .bind(body)
        .bind(expires_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(unavailable)?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM simulation_cache WHERE expires_at <= NOW()")
            .execute(self.pool.as_ref())
            .await
            .map_err(unavailable)?;
        debug!(removed = result.rows_affected(), "Purged expired cache rows");
        Ok(result.rows_affected())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
