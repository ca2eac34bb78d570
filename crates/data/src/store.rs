//! Projection catalog sources.

use crate::error::StoreError;
use crate::import::load_players_csv;
use crate::repositories::{PlayerRecord, PlayerRepository};
use async_trait::async_trait;
use ffdraft_domain::{PlayerProjection, Position};
use ffdraft_simulation::catalog::Catalog;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Supplies read-only catalog snapshots.
#[async_trait]
pub trait ProjectionStore: Send + Sync {
    /// Current snapshot. Unchanged data yields the same catalog version.
    async fn snapshot(&self) -> Result<Arc<Catalog>, StoreError>;

    /// One player by id.
    async fn player(&self, player_id: &str) -> Result<Option<PlayerProjection>, StoreError> {
        Ok(self.snapshot().await?.get(player_id).cloned())
    }

    /// Players at `position`, in id order.
    async fn players_at(&self, position: Position) -> Result<Vec<PlayerProjection>, StoreError> {
        Ok(self.snapshot().await?.by_position(position).cloned().collect())
    }

    fn name(&self) -> &'static str;
}

/// Writable player table.
#[async_trait]
pub trait PlayerTable: Send + Sync {
    async fn count(&self) -> Result<i64, StoreError>;

    /// Replaces every stored player with `players`.
    async fn replace_all(&self, players: &[PlayerProjection]) -> Result<u64, StoreError>;
}

/// Loads the catalog at `csv` into `table` when the table is empty and
/// returns how many players were inserted. A populated table is left alone
/// and the file is not read.
///
/// # Errors
/// Import errors for the file, or the table's own errors.
pub async fn seed_if_empty(table: &dyn PlayerTable, csv: &Path) -> Result<u64, StoreError> {
    let existing = table.count().await?;
    if existing > 0 {
        debug!(existing, "Player table already populated");
        return Ok(0);
    }
    let players = load_players_csv(csv)?;
    let inserted = table.replace_all(&players).await?;
    info!(path = %csv.display(), inserted, "Seeded empty player table");
    Ok(inserted)
}

/// Catalog fixed at construction, usually from a CSV file.
pub struct StaticProjectionStore {
    catalog: Arc<Catalog>,
}

impl StaticProjectionStore {
    /// # Errors
    /// `StoreError::Catalog` for invalid or duplicate players.
    pub fn new(players: Vec<PlayerProjection>) -> Result<Self, StoreError> {
        Ok(Self {
            catalog: Arc::new(Catalog::new(players)?),
        })
    }

    /// # Errors
    /// Any import error from [`load_players_csv`].
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::new(load_players_csv(path)?)
    }
}

#[async_trait]
impl ProjectionStore for StaticProjectionStore {
    async fn snapshot(&self) -> Result<Arc<Catalog>, StoreError> {
        Ok(Arc::clone(&self.catalog))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Catalog read from the `players` table on every snapshot.
///
/// The previous snapshot is reused while the table content is unchanged.
pub struct PgProjectionStore {
    players: PlayerRepository,
    current: RwLock<Option<Arc<Catalog>>>,
}

impl PgProjectionStore {
    #[must_use]
    pub fn new(players: PlayerRepository) -> Self {
        Self {
            players,
            current: RwLock::new(None),
        }
    }
}

#[async_trait]
impl ProjectionStore for PgProjectionStore {
    async fn snapshot(&self) -> Result<Arc<Catalog>, StoreError> {
        let players = self
            .players
            .find_all()
            .await?
            .into_iter()
            .map(|record| record.into_projection())
            .collect::<Result<Vec<_>, _>>()?;
        let fresh = Catalog::new(players)?;

        let mut current = self.current.write().await;
        if let Some(existing) = current.as_ref() {
            if existing.version() == fresh.version() {
                return Ok(Arc::clone(existing));
            }
        }
        info!(
            players = fresh.len(),
            version = %fresh.version(),
            "Catalog snapshot refreshed"
        );
        let fresh = Arc::new(fresh);
        *current = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    async fn player(&self, player_id: &str) -> Result<Option<PlayerProjection>, StoreError> {
        self.players
            .find_by_id(player_id)
            .await?
            .map(PlayerRecord::into_projection)
            .transpose()
    }

    async fn players_at(&self, position: Position) -> Result<Vec<PlayerProjection>, StoreError> {
        self.players
            .find_by_position(position)
            .await?
            .into_iter()
            .map(PlayerRecord::into_projection)
            .collect()
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
