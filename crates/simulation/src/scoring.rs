//! Scoring-format adjustments.
//!
//! Projections are stored in standard scoring. Other formats are expressed
//! as a per-position linear transform looked up in a [`ScoringTable`], so a
//! new format is a table entry rather than a code change.

use crate::cache_key::Fingerprint;
use ffdraft_domain::{Position, ScoringFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Linear transform applied to a projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringAdjustment {
    /// Multiplier on projected points.
    pub mean_scale: f64,
    /// Points added after scaling.
    #[serde(default)]
    pub mean_shift: f64,
    /// Multiplier on projected volatility.
    pub std_scale: f64,
}

impl ScoringAdjustment {
    pub const IDENTITY: Self = Self {
        mean_scale: 1.0,
        mean_shift: 0.0,
        std_scale: 1.0,
    };

    /// Scales mean and volatility by the same factor.
    #[must_use]
    pub fn proportional(scale: f64) -> Self {
        Self {
            mean_scale: scale,
            mean_shift: 0.0,
            std_scale: scale,
        }
    }

    /// Returns the adjusted `(mean, std)` pair.
    #[must_use]
    pub fn apply(&self, mean: f64, std: f64) -> (f64, f64) {
        (
            mean * self.mean_scale + self.mean_shift,
            (std * self.std_scale).abs(),
        )
    }
}

impl Default for ScoringAdjustment {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Lookup from `(format, position)` to an adjustment.
///
/// Missing entries fall back to [`ScoringAdjustment::IDENTITY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringTable {
    entries: BTreeMap<ScoringFormat, BTreeMap<Position, ScoringAdjustment>>,
}

impl ScoringTable {
    /// A table where every format is the identity.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Sets the adjustment for one `(format, position)` pair.
    #[must_use]
    pub fn with(
        mut self,
        format: ScoringFormat,
        position: Position,
        adjustment: ScoringAdjustment,
    ) -> Self {
        self.entries
            .entry(format)
            .or_default()
            .insert(position, adjustment);
        self
    }

    #[must_use]
    pub fn lookup(&self, format: ScoringFormat, position: Position) -> ScoringAdjustment {
        self.entries
            .get(&format)
            .and_then(|by_position| by_position.get(&position))
            .copied()
            .unwrap_or(ScoringAdjustment::IDENTITY)
    }

    /// Writes every non-identity entry into `fp` in sorted order.
    pub fn fingerprint_into(&self, fp: &mut Fingerprint) {
        for (format, by_position) in &self.entries {
            for (position, adj) in by_position {
                if *adj == ScoringAdjustment::IDENTITY {
                    continue;
                }
                fp.str(format.as_str())
                    .str(position.as_str())
                    .f64(adj.mean_scale)
                    .f64(adj.mean_shift)
                    .f64(adj.std_scale);
            }
        }
    }
}

impl Default for ScoringTable {
    /// Reception-weighted defaults: PPR lifts pass catchers, half-PPR lifts
    /// them by half as much. QB, K and DST are unaffected.
    fn default() -> Self {
        let lifts = [
            (Position::Rb, 0.12),
            (Position::Wr, 0.18),
            (Position::Te, 0.15),
        ];
        lifts
            .into_iter()
            .fold(Self::identity(), |table, (position, lift)| {
                table
                    .with(
                        ScoringFormat::Ppr,
                        position,
                        ScoringAdjustment::proportional(1.0 + lift),
                    )
                    .with(
                        ScoringFormat::HalfPpr,
                        position,
                        ScoringAdjustment::proportional(1.0 + lift / 2.0),
                    )
            })
    }
}
