use crate::enums::Position;
use serde::{Deserialize, Serialize};

/// Projected season performance and auction price for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProjection {
    pub player_id: String,
    pub name: String,
    pub position: Position,
    /// Expected fantasy points.
    pub points_mean: f64,
    /// Standard deviation of fantasy points.
    pub points_std: f64,
    /// Auction cost in budget units.
    pub acquisition_cost: u32,
}

impl PlayerProjection {
    pub fn new(
        player_id: impl Into<String>,
        name: impl Into<String>,
        position: Position,
        points_mean: f64,
        points_std: f64,
        acquisition_cost: u32,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            name: name.into(),
            position,
            points_mean,
            points_std,
            acquisition_cost,
        }
    }

    /// Checks the numeric invariants a projection must hold before it can be
    /// simulated. Returns the name of the first violated field.
    pub fn check(&self) -> Result<(), &'static str> {
        if self.player_id.trim().is_empty() {
            return Err("player_id");
        }
        if !self.points_mean.is_finite() || self.points_mean < 0.0 {
            return Err("points_mean");
        }
        if !self.points_std.is_finite() || self.points_std < 0.0 {
            return Err("points_std");
        }
        if self.acquisition_cost == 0 {
            return Err("acquisition_cost");
        }
        Ok(())
    }
}
