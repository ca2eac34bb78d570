//! Per-player aggregation of simulated trials.
//!
//! Boom and bust are measured against the player's own scoring-adjusted
//! projection: a boom trial is strictly above `mean + BOOM_MULTIPLIER * std`
//! and a bust trial strictly below `mean - BUST_MULTIPLIER * std`, where
//! `mean` and `std` are the projection's, not the sample's. Spread is the
//! population standard deviation (divide by N).

use crate::sampler::PlayerDraw;
use ffdraft_domain::SimulationError;

/// Projection standard deviations above the mean that count as a boom.
pub const BOOM_MULTIPLIER: f64 = 1.0;
/// Projection standard deviations below the mean that count as a bust.
pub const BUST_MULTIPLIER: f64 = 1.0;

/// Boom and bust cutoffs for one player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub boom: f64,
    pub bust: f64,
}

impl Thresholds {
    /// Cutoffs around the draw's mean, floored at zero like the draws
    /// themselves.
    #[must_use]
    pub fn for_draw(draw: &PlayerDraw) -> Self {
        let center = draw.mean().max(0.0);
        Self {
            boom: center + BOOM_MULTIPLIER * draw.std(),
            bust: center - BUST_MULTIPLIER * draw.std(),
        }
    }
}

/// Unrounded summary statistics for one player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    pub mean: f64,
    pub std: f64,
    /// Boom trials as a percentage in `[0, 100]`.
    pub boom_pct: f64,
    /// Bust trials as a percentage in `[0, 100]`.
    pub bust_pct: f64,
}

/// Reduces one player's trials.
///
/// # Errors
/// `SimulationError::Computation` when `trials` is empty or holds a
/// non-finite value.
pub fn aggregate(trials: &[f64], thresholds: Thresholds) -> Result<PlayerStats, SimulationError> {
    let Some(&first) = trials.first() else {
        return Err(SimulationError::computation("no trials to aggregate"));
    };
    if trials.iter().any(|v| !v.is_finite()) {
        return Err(SimulationError::computation(
            "non-finite value in simulated trials",
        ));
    }

    let n = trials.len() as f64;
    let (mean, std) = if trials.iter().all(|&v| v == first) {
        (first, 0.0)
    } else {
        let mean = trials.iter().sum::<f64>() / n;
        let variance = trials.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, variance.sqrt())
    };

    let booms = trials.iter().filter(|&&v| v > thresholds.boom).count();
    let busts = trials.iter().filter(|&&v| v < thresholds.bust).count();

    Ok(PlayerStats {
        mean,
        std,
        boom_pct: booms as f64 / n * 100.0,
        bust_pct: busts as f64 / n * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn thresholds(mean: f64, std: f64) -> Thresholds {
        Thresholds::for_draw(&PlayerDraw::new(mean, std).unwrap())
    }

    #[test]
    fn test_multipliers_define_thresholds() {
        let t = thresholds(20.0, 5.0);
        assert_eq!(t.boom, 20.0 + BOOM_MULTIPLIER * 5.0);
        assert_eq!(t.bust, 20.0 - BUST_MULTIPLIER * 5.0);
    }

    #[test]
    fn test_constant_trials_are_exact() {
        let trials = vec![12.3; 1_000];
        let stats = aggregate(&trials, thresholds(12.3, 0.0)).unwrap();
        assert_eq!(stats.mean, 12.3);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.boom_pct, 0.0);
        assert_eq!(stats.bust_pct, 0.0);
    }

    #[test]
    fn test_negative_mean_without_spread_is_neither_boom_nor_bust() {
        let draw = PlayerDraw::new(-3.0, 0.0).unwrap();
        let mut row = vec![f64::NAN; 200];
        draw.fill(&mut row, &mut StdRng::seed_from_u64(1));
        let stats = aggregate(&row, Thresholds::for_draw(&draw)).unwrap();
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.boom_pct, 0.0);
        assert_eq!(stats.bust_pct, 0.0);
    }

    #[test]
    fn test_population_std_and_strict_thresholds() {
        // mean 5, population std 2
        let trials = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = aggregate(&trials, thresholds(5.0, 2.0)).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std, 2.0);
        // Only 9 is strictly above 7; 2 is strictly below 3.
        assert_eq!(stats.boom_pct, 12.5);
        assert_eq!(stats.bust_pct, 12.5);
    }

    #[test]
    fn test_values_on_threshold_do_not_count() {
        let trials = [3.0, 7.0, 5.0, 5.0];
        let stats = aggregate(&trials, thresholds(5.0, 2.0)).unwrap();
        assert_eq!(stats.boom_pct, 0.0);
        assert_eq!(stats.bust_pct, 0.0);
    }

    #[test]
    fn test_empty_and_non_finite_inputs_fail() {
        assert!(aggregate(&[], thresholds(1.0, 1.0)).is_err());
        assert!(aggregate(&[1.0, f64::NAN], thresholds(1.0, 1.0)).is_err());
    }

    #[test]
    fn test_percentages_stay_in_range() {
        let trials: Vec<f64> = (0..=100).map(f64::from).collect();
        let stats = aggregate(&trials, thresholds(50.0, 10.0)).unwrap();
        assert!(stats.boom_pct + stats.bust_pct <= 100.0);
        assert!(stats.mean >= 0.0 && stats.std >= 0.0);
    }
}
