//! Trial samplers.
//!
//! A [`Sampler`] turns one [`PlayerDraw`] per player into a players × trials
//! matrix of simulated points. Two implementations share the same
//! statistical semantics:
//!
//! - [`ScalarSampler`] walks trial by trial, player by player, from a single
//!   RNG stream. It is the reference implementation.
//! - [`BatchedSampler`] fills whole player rows in bulk, rows in parallel,
//!   each from its own stream seeded by the run's RNG.
//!
//! Draws are floored at zero in both paths.

use ffdraft_domain::SimulationError;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

/// Sampling distribution for one player, after scoring adjustments.
#[derive(Debug, Clone, Copy)]
pub struct PlayerDraw {
    mean: f64,
    std: f64,
    normal: Option<Normal<f64>>,
}

impl PlayerDraw {
    /// # Errors
    /// `SimulationError::Computation` when `mean` or `std` is not finite or
    /// `std` is negative.
    pub fn new(mean: f64, std: f64) -> Result<Self, SimulationError> {
        if !mean.is_finite() || !std.is_finite() || std < 0.0 {
            return Err(SimulationError::computation(format!(
                "degenerate distribution: mean={mean}, std={std}"
            )));
        }
        let normal = if std == 0.0 {
            None
        } else {
            Some(Normal::new(mean, std).map_err(|e| {
                SimulationError::computation(format!("invalid distribution: {e}"))
            })?)
        };
        Ok(Self { mean, std, normal })
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    #[must_use]
    pub fn std(&self) -> f64 {
        self.std
    }

    /// One clamped draw.
    #[inline]
    pub fn draw<R: RngCore + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.normal {
            Some(normal) => normal.sample(rng).max(0.0),
            None => self.mean.max(0.0),
        }
    }

    /// Fills `row` with clamped draws.
    pub fn fill<R: RngCore + ?Sized>(&self, row: &mut [f64], rng: &mut R) {
        match &self.normal {
            Some(normal) => {
                row.iter_mut().for_each(|slot| *slot = normal.sample(rng));
                row.iter_mut().for_each(|slot| *slot = slot.max(0.0));
            }
            None => row.fill(self.mean.max(0.0)),
        }
    }
}

/// Row-major players × trials matrix of simulated points.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialMatrix {
    players: usize,
    trials: usize,
    data: Vec<f64>,
}

impl TrialMatrix {
    #[must_use]
    pub fn zeroed(players: usize, trials: usize) -> Self {
        Self {
            players,
            trials,
            data: vec![0.0; players * trials],
        }
    }

    #[must_use]
    pub fn players(&self) -> usize {
        self.players
    }

    #[must_use]
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Trials for the player at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index * self.trials..(index + 1) * self.trials]
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, f64> {
        self.data.chunks(self.trials.max(1))
    }

    pub fn par_rows(&self) -> rayon::slice::Chunks<'_, f64> {
        self.data.par_chunks(self.trials.max(1))
    }

    /// Sets one cell.
    pub fn set(&mut self, player: usize, trial: usize, value: f64) {
        self.data[player * self.trials + trial] = value;
    }

    fn par_rows_mut(&mut self) -> rayon::slice::ChunksMut<'_, f64> {
        self.data.par_chunks_mut(self.trials.max(1))
    }
}

/// Draws simulated outcomes for a set of players.
pub trait Sampler: Send + Sync {
    /// Samples `trials` outcomes for every draw.
    ///
    /// # Errors
    /// `SimulationError::Computation` when `trials` is zero.
    fn sample(
        &self,
        draws: &[PlayerDraw],
        trials: usize,
        rng: &mut StdRng,
    ) -> Result<TrialMatrix, SimulationError>;

    /// Whether this sampler is the batched path.
    fn is_batched(&self) -> bool;

    fn name(&self) -> &'static str;
}

fn ensure_trials(trials: usize) -> Result<(), SimulationError> {
    if trials == 0 {
        return Err(SimulationError::computation(
            "cannot sample zero trials",
        ));
    }
    Ok(())
}

/// Reference sampler: one draw at a time from a single stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarSampler;

impl Sampler for ScalarSampler {
    fn sample(
        &self,
        draws: &[PlayerDraw],
        trials: usize,
        rng: &mut StdRng,
    ) -> Result<TrialMatrix, SimulationError> {
        ensure_trials(trials)?;
        let mut matrix = TrialMatrix::zeroed(draws.len(), trials);
        for trial in 0..trials {
            for (player, draw) in draws.iter().enumerate() {
                matrix.set(player, trial, draw.draw(rng));
            }
        }
        Ok(matrix)
    }

    fn is_batched(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "scalar"
    }
}

/// Bulk sampler: whole rows per player, rows filled in parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchedSampler;

impl Sampler for BatchedSampler {
    fn sample(
        &self,
        draws: &[PlayerDraw],
        trials: usize,
        rng: &mut StdRng,
    ) -> Result<TrialMatrix, SimulationError> {
        ensure_trials(trials)?;
        // Seeds are taken in player order so a seeded run is reproducible
        // regardless of how rayon schedules the rows.
        let seeds: Vec<u64> = draws.iter().map(|_| rng.next_u64()).collect();

        let mut matrix = TrialMatrix::zeroed(draws.len(), trials);
        matrix
            .par_rows_mut()
            .zip(draws.par_iter().zip(seeds.par_iter()))
            .for_each(|(row, (draw, seed))| {
                let mut row_rng = StdRng::seed_from_u64(*seed);
                draw.fill(row, &mut row_rng);
            });
        Ok(matrix)
    }

    fn is_batched(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "batched"
    }
}

/// How the engine picks a sampler for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerStrategy {
    /// Batched when `players × trials` reaches the batch threshold.
    #[default]
    Auto,
    /// Always the scalar path.
    Scalar,
    /// Always the batched path.
    Batched,
}

impl SamplerStrategy {
    /// Whether the batched path should run for a problem of this size.
    #[must_use]
    pub fn use_batched(&self, players: usize, trials: usize, threshold: usize) -> bool {
        match self {
            Self::Auto => players.saturating_mul(trials) >= threshold,
            Self::Scalar => false,
            Self::Batched => true,
        }
    }
}

impl std::str::FromStr for SamplerStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "scalar" => Ok(Self::Scalar),
            "batched" => Ok(Self::Batched),
            other => Err(format!("unknown sampler strategy: {other}")),
        }
    }
}
