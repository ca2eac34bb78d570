use crate::aggregator::{PlayerStats, Thresholds, aggregate};
use crate::catalog::Catalog;
use crate::params::SimulationParameters;
use crate::sampler::{PlayerDraw, Sampler};
use crate::scoring::ScoringTable;
use ffdraft_domain::value_objects::round_half_away;
use ffdraft_domain::{PlayerProjection, SimulationError, SimulationResult};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// Where a run's randomness comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomSource {
    /// Seeded from the operating system for every run.
    #[default]
    Entropy,
    /// Fixed seed; every run draws the same stream.
    Seeded(u64),
}

impl RandomSource {
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self {
            Self::Entropy => StdRng::from_os_rng(),
            Self::Seeded(seed) => StdRng::seed_from_u64(*seed),
        }
    }
}

/// Output of one Monte Carlo run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// One result per catalog player, in catalog order.
    pub results: Vec<SimulationResult>,
    /// Unrounded statistics, parallel to `results`.
    pub stats: Vec<PlayerStats>,
    /// Whether the batched sampler produced the trials.
    pub optimized: bool,
}

/// Runs sampling and aggregation for every player of a catalog.
pub struct MonteCarloRunner<'a> {
    pub catalog: &'a Catalog,
    pub params: &'a SimulationParameters,
    pub scoring: &'a ScoringTable,
}

impl<'a> MonteCarloRunner<'a> {
    pub fn new(
        catalog: &'a Catalog,
        params: &'a SimulationParameters,
        scoring: &'a ScoringTable,
    ) -> Self {
        Self {
            catalog,
            params,
            scoring,
        }
    }

    /// Scoring-adjusted sampling distribution for every player.
    ///
    /// # Errors
    /// `SimulationError::Computation` for a degenerate distribution.
    pub fn draws(&self) -> Result<Vec<PlayerDraw>, SimulationError> {
        let format = self.params.scoring_format();
        self.catalog
            .players()
            .iter()
            .map(|player| {
                let (mean, std) = self
                    .scoring
                    .lookup(format, player.position)
                    .apply(player.points_mean, player.points_std);
                PlayerDraw::new(mean, std).map_err(|e| {
                    SimulationError::computation(format!("player {}: {e}", player.player_id))
                })
            })
            .collect()
    }

    /// Samples and aggregates. Either every player gets a result or the run
    /// fails as a whole.
    ///
    /// # Errors
    /// `SimulationError::Computation` for an empty catalog or any numeric
    /// failure in sampling or aggregation.
    pub fn run(&self, sampler: &dyn Sampler, rng: &mut StdRng) -> Result<RunOutput, SimulationError> {
        if self.catalog.is_empty() {
            return Err(SimulationError::computation(
                "no players available for simulation",
            ));
        }

        let draws = self.draws()?;
        let trials = self.params.num_simulations() as usize;
        let matrix = sampler.sample(&draws, trials, rng)?;
        if matrix.players() != draws.len() || matrix.trials() != trials {
            return Err(SimulationError::computation(format!(
                "{} sampler returned a {}x{} matrix, expected {}x{}",
                sampler.name(),
                matrix.players(),
                matrix.trials(),
                draws.len(),
                trials
            )));
        }

        let stats: Vec<PlayerStats> = if sampler.is_batched() {
            matrix
                .par_rows()
                .zip(draws.par_iter())
                .map(|(row, draw)| aggregate(row, Thresholds::for_draw(draw)))
                .collect::<Result<_, _>>()?
        } else {
            matrix
                .rows()
                .zip(draws.iter())
                .map(|(row, draw)| aggregate(row, Thresholds::for_draw(draw)))
                .collect::<Result<_, _>>()?
        };

        let results = self
            .catalog
            .players()
            .iter()
            .zip(&stats)
            .map(|(player, stats)| self.present(player, stats))
            .collect();

        Ok(RunOutput {
            results,
            stats,
            optimized: sampler.is_batched(),
        })
    }

    fn present(&self, player: &PlayerProjection, stats: &PlayerStats) -> SimulationResult {
        let cost = self.params.effective_cost(player);
        SimulationResult {
            player_id: player.player_id.clone(),
            name: player.name.clone(),
            position: player.position,
            mean: round_half_away(stats.mean, 2),
            std: round_half_away(stats.std, 2),
            boom_pct: round_half_away(stats.boom_pct, 1),
            bust_pct: round_half_away(stats.bust_pct, 1),
            cost,
            value_per_dollar: round_half_away(stats.mean / f64::from(cost), 2),
            budget_pct: round_half_away(
                f64::from(cost) / f64::from(self.params.budget()) * 100.0,
                1,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{BatchedSampler, ScalarSampler};
    use ffdraft_domain::{Position, SimulationRequest};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            PlayerProjection::new("p1", "One", Position::Rb, 20.0, 5.0, 10),
            PlayerProjection::new("p2", "Steady", Position::K, 8.0, 0.0, 1),
            PlayerProjection::new("p3", "Three", Position::Wr, 14.0, 6.0, 25),
        ])
        .unwrap()
    }

    fn params(request: SimulationRequest) -> SimulationParameters {
        SimulationParameters::validate(&request, &catalog()).unwrap()
    }

    #[test]
    fn test_one_result_per_player() {
        let catalog = catalog();
        let params = params(SimulationRequest::default().with_num_simulations(500));
        let table = ScoringTable::default();
        let runner = MonteCarloRunner::new(&catalog, &params, &table);

        for sampler in [&ScalarSampler as &dyn Sampler, &BatchedSampler] {
            let output = runner.run(sampler, &mut RandomSource::Seeded(1).rng()).unwrap();
            let mut ids: Vec<&str> = output.results.iter().map(|r| r.player_id.as_str()).collect();
            ids.sort_unstable();
            assert_eq!(ids, vec!["p1", "p2", "p3"]);
            assert_eq!(output.stats.len(), 3);
            assert_eq!(output.optimized, sampler.is_batched());
        }
    }

    #[test]
    fn test_zero_volatility_player_is_exact() {
        let catalog = catalog();
        let params = params(SimulationRequest::default());
        let table = ScoringTable::default();
        let output = MonteCarloRunner::new(&catalog, &params, &table)
            .run(&ScalarSampler, &mut RandomSource::Seeded(5).rng())
            .unwrap();
        let steady = &output.stats[1];
        assert_eq!(steady.mean, 8.0);
        assert_eq!(steady.std, 0.0);
        assert_eq!(steady.boom_pct, 0.0);
        assert_eq!(steady.bust_pct, 0.0);
    }

    #[test]
    fn test_override_and_budget_feed_value_metrics() {
        let catalog = catalog();
        let params = params(
            SimulationRequest::default()
                .with_budget(100)
                .with_override("p2", 4.0),
        );
        let table = ScoringTable::default();
        let output = MonteCarloRunner::new(&catalog, &params, &table)
            .run(&ScalarSampler, &mut RandomSource::Seeded(5).rng())
            .unwrap();
        let steady = output.results.iter().find(|r| r.player_id == "p2").unwrap();
        assert_eq!(steady.cost, 4);
        assert_eq!(steady.value_per_dollar, 2.0);
        assert_eq!(steady.budget_pct, 4.0);
    }

    #[test]
    fn test_scoring_format_shifts_receivers() {
        let catalog = catalog();
        let table = ScoringTable::default();
        let standard = params(SimulationRequest::default().with_num_simulations(5_000));
        let ppr = params(
            SimulationRequest::default()
                .with_num_simulations(5_000)
                .with_scoring_format("ppr"),
        );
        let a = MonteCarloRunner::new(&catalog, &standard, &table)
            .run(&BatchedSampler, &mut RandomSource::Seeded(8).rng())
            .unwrap();
        let b = MonteCarloRunner::new(&catalog, &ppr, &table)
            .run(&BatchedSampler, &mut RandomSource::Seeded(8).rng())
            .unwrap();
        // Kicker is untouched by reception scoring, receiver is lifted.
        assert_eq!(a.stats[1].mean, b.stats[1].mean);
        assert!(b.stats[2].mean > a.stats[2].mean);
    }

    #[test]
    fn test_empty_catalog_is_computation_error() {
        let catalog = Catalog::empty();
        let params = SimulationParameters::default();
        let table = ScoringTable::default();
        let err = MonteCarloRunner::new(&catalog, &params, &table)
            .run(&ScalarSampler, &mut RandomSource::Seeded(1).rng())
            .unwrap_err();
        assert!(matches!(err, SimulationError::Computation(_)));
    }
}
