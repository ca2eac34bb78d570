//! Player repository for projection catalog persistence.

use crate::error::StoreError;
use crate::store::PlayerTable;
use async_trait::async_trait;
use ffdraft_domain::{PlayerProjection, Position};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

/// Database record for a projected player.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    /// Surrogate key.
    pub id: i64,
    /// External player identifier.
    pub player_id: String,
    pub name: String,
    /// Position code (QB, RB, WR, TE, K, DST).
    pub position: String,
    /// Projected season points.
    pub points_proj: f64,
    /// Standard deviation of projected points.
    pub std_dev: f64,
    /// Auction cost.
    pub adp_cost: i32,
    /// Record creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Record update timestamp.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PlayerRecord {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            player_id: row.try_get("player_id")?,
            name: row.try_get("name")?,
            position: row.try_get("position")?,
            points_proj: row.try_get("points_proj")?,
            std_dev: row.try_get("std_dev")?,
            adp_cost: row.try_get("adp_cost")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Converts the stored row into a domain projection.
    ///
    /// # Errors
    /// `StoreError::InvalidRecord` for an unknown position or a
    /// non-positive cost.
    pub fn into_projection(self) -> Result<PlayerProjection, StoreError> {
        let invalid = |reason: String| StoreError::InvalidRecord {
            player_id: self.player_id.clone(),
            reason,
        };
        let position: Position = self
            .position
            .parse()
            .map_err(|e| invalid(format!("{e}")))?;
        let cost = u32::try_from(self.adp_cost)
            .ok()
            .filter(|c| *c > 0)
            .ok_or_else(|| invalid(format!("adp_cost {} is not positive", self.adp_cost)))?;

        Ok(PlayerProjection::new(
            self.player_id,
            self.name,
            position,
            self.points_proj,
            self.std_dev,
            cost,
        ))
    }
}

/// Repository for player catalog operations.
#[derive(Clone)]
pub struct PlayerRepository {
    pool: Arc<PgPool>,
}

impl PlayerRepository {
    /// Creates a new PlayerRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Finds all players ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_all(&self) -> Result<Vec<PlayerRecord>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM players ORDER BY player_id")
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter().map(PlayerRecord::from_row).collect()
    }

    /// Finds a player by external id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, player_id: &str) -> Result<Option<PlayerRecord>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM players WHERE player_id = $1")
            .bind(player_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(PlayerRecord::from_row).transpose()
    }

    /// Finds every player at a position, in id order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_position(
        &self,
        position: Position,
    ) -> Result<Vec<PlayerRecord>, sqlx::Error> {
        let rows =
            sqlx::query("SELECT * FROM players WHERE position = $1 ORDER BY player_id")
                .bind(position.as_str())
                .fetch_all(self.pool.as_ref())
                .await?;
        rows.iter().map(PlayerRecord::from_row).collect()
    }

    /// Counts stored players.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM players")
            .fetch_one(self.pool.as_ref())
            .await?;
        row.try_get("count")
    }

    /// Replaces the whole catalog in one transaction.
    ///
    /// # Errors
    /// `StoreError::InvalidRecord` when a cost does not fit the column, or a
    /// database error; nothing is changed in either case.
    pub async fn replace_all(&self, players: &[PlayerProjection]) -> Result<u64, StoreError> {
        let costs = players
            .iter()
            .map(stored_cost)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM players").execute(&mut *tx).await?;

        let mut inserted = 0;
        for (player, cost) in players.iter().zip(costs) {
            inserted += sqlx::query(
                r#"
                INSERT INTO players (player_id, name, position, points_proj, std_dev, adp_cost)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&player.player_id)
            .bind(&player.name)
            .bind(player.position.as_str())
            .bind(player.points_mean)
            .bind(player.points_std)
            .bind(cost)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

#[async_trait]
impl PlayerTable for PlayerRepository {
    async fn count(&self) -> Result<i64, StoreError> {
        Ok(PlayerRepository::count(self).await?)
    }

    async fn replace_all(&self, players: &[PlayerProjection]) -> Result<u64, StoreError> {
        PlayerRepository::replace_all(self, players).await
    }
}

/// `adp_cost` as stored in the INTEGER column.
fn stored_cost(player: &PlayerProjection) -> Result<i32, StoreError> {
    i32::try_from(player.acquisition_cost).map_err(|_| StoreError::InvalidRecord {
        player_id: player.player_id.clone(),
        reason: format!("adp_cost {} exceeds the stored range", player.acquisition_cost),
    })
}
