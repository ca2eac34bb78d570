//! Parameter validation.

use crate::catalog::Catalog;
use ffdraft_domain::{PlayerProjection, ScoringFormat, SimulationError, SimulationRequest};
use std::collections::BTreeMap;

/// Default auction budget.
pub const DEFAULT_BUDGET: u32 = 200;
/// Largest accepted auction budget.
pub const MAX_BUDGET: u32 = 1_000;
/// Default number of trials per player.
pub const DEFAULT_NUM_SIMULATIONS: u32 = 1_000;
/// Largest accepted number of trials per player.
pub const MAX_SIMULATIONS: u32 = 10_000;

/// Validated, immutable experiment configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationParameters {
    budget: u32,
    scoring_format: ScoringFormat,
    num_simulations: u32,
    adp_overrides: BTreeMap<String, u32>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            scoring_format: ScoringFormat::default(),
            num_simulations: DEFAULT_NUM_SIMULATIONS,
            adp_overrides: BTreeMap::new(),
        }
    }
}

impl SimulationParameters {
    /// Validates a raw request against the catalog it will run on.
    ///
    /// # Errors
    /// `SimulationError::Validation` naming the offending field, or
    /// `SimulationError::UnknownPlayer` for an override on a player that is
    /// not in `catalog` (the first such id in sorted order).
    pub fn validate(
        request: &SimulationRequest,
        catalog: &Catalog,
    ) -> Result<Self, SimulationError> {
        let budget = bounded(
            "budget",
            request.budget.unwrap_or(i64::from(DEFAULT_BUDGET)),
            MAX_BUDGET,
        )?;
        let num_simulations = bounded(
            "num_simulations",
            request
                .num_simulations
                .unwrap_or(i64::from(DEFAULT_NUM_SIMULATIONS)),
            MAX_SIMULATIONS,
        )?;

        let scoring_format = match request.scoring_format.as_deref() {
            None => ScoringFormat::default(),
            Some(raw) => raw.parse().map_err(|_| {
                SimulationError::validation(
                    "scoring_format",
                    format!("must be one of standard, ppr, half_ppr; got {raw:?}"),
                )
            })?,
        };

        let mut adp_overrides = BTreeMap::new();
        if let Some(raw) = &request.adp_overrides {
            let sorted: BTreeMap<&String, f64> = raw.iter().map(|(k, v)| (k, *v)).collect();
            for (player_id, cost) in sorted {
                if !catalog.contains(player_id) {
                    return Err(SimulationError::UnknownPlayer {
                        player_id: player_id.clone(),
                    });
                }
                adp_overrides.insert(player_id.clone(), override_cost(player_id, cost)?);
            }
        }

        Ok(Self {
            budget,
            scoring_format,
            num_simulations,
            adp_overrides,
        })
    }

    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    #[must_use]
    pub fn scoring_format(&self) -> ScoringFormat {
        self.scoring_format
    }

    #[must_use]
    pub fn num_simulations(&self) -> u32 {
        self.num_simulations
    }

    /// Overrides keyed by player id, in sorted order.
    #[must_use]
    pub fn adp_overrides(&self) -> &BTreeMap<String, u32> {
        &self.adp_overrides
    }

    /// Acquisition cost of `player` after applying overrides.
    #[must_use]
    pub fn effective_cost(&self, player: &PlayerProjection) -> u32 {
        self.adp_overrides
            .get(&player.player_id)
            .copied()
            .unwrap_or(player.acquisition_cost)
    }
}

fn bounded(field: &str, value: i64, max: u32) -> Result<u32, SimulationError> {
    if value < 1 || value > i64::from(max) {
        return Err(SimulationError::validation(
            field,
            format!("must be between 1 and {max}, got {value}"),
        ));
    }
    // Range checked above.
    Ok(value as u32)
}

fn override_cost(player_id: &str, cost: f64) -> Result<u32, SimulationError> {
    if !cost.is_finite() || cost.fract() != 0.0 || cost < 1.0 || cost > f64::from(u32::MAX) {
        return Err(SimulationError::validation(
            format!("adp_overrides.{player_id}"),
            format!("cost must be a positive integer, got {cost}"),
        ));
    }
    Ok(cost as u32)
}
