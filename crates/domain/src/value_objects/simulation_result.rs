use crate::enums::{Position, ScoringFormat};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Presented summary of one player's simulated outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub player_id: String,
    pub name: String,
    pub position: Position,
    /// Mean simulated points, 2 decimals.
    pub mean: f64,
    /// Population standard deviation of simulated points, 2 decimals.
    pub std: f64,
    /// Percentage of boom trials, 1 decimal.
    pub boom_pct: f64,
    /// Percentage of bust trials, 1 decimal.
    pub bust_pct: f64,
    /// Acquisition cost after ADP overrides.
    pub cost: u32,
    /// Simulated points per budget unit, 2 decimals.
    pub value_per_dollar: f64,
    /// Share of the budget the player costs, 1 decimal.
    pub budget_pct: f64,
}

impl SimulationResult {
    /// Response ordering: mean descending, then player id ascending.
    pub fn ranking(a: &Self, b: &Self) -> Ordering {
        b.mean
            .partial_cmp(&a.mean)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.player_id.cmp(&b.player_id))
    }
}

/// Run metadata returned alongside the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetadata {
    pub num_simulations: u32,
    pub num_players: usize,
    pub scoring_format: ScoringFormat,
    pub budget: u32,
    pub cache_key: String,
    /// Whether the batched sampler produced the trials.
    pub optimized: bool,
}

/// Full simulation response, cached verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub results: Vec<SimulationResult>,
    pub metadata: SimulationMetadata,
}

impl SimulationResponse {
    /// Builds a response, ordering `results` by [`SimulationResult::ranking`].
    #[must_use]
    pub fn new(mut results: Vec<SimulationResult>, metadata: SimulationMetadata) -> Self {
        results.sort_by(SimulationResult::ranking);
        Self { results, metadata }
    }

    /// Looks up the result for a player.
    #[must_use]
    pub fn result_for(&self, player_id: &str) -> Option<&SimulationResult> {
        self.results.iter().find(|r| r.player_id == player_id)
    }
}
