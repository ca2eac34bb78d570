//! Read-only catalog snapshots.

use crate::cache_key::Fingerprint;
use ffdraft_domain::{PlayerProjection, Position, SimulationError};
use std::collections::HashMap;

/// An immutable snapshot of the projection catalog.
///
/// Players are kept sorted by id. The snapshot carries a content hash
/// (`version`) so cache keys derived from it change whenever any projection
/// changes.
#[derive(Debug, Clone)]
pub struct Catalog {
    players: Vec<PlayerProjection>,
    index: HashMap<String, usize>,
    version: String,
}

impl Catalog {
    /// Builds a snapshot, rejecting invalid projections and duplicate ids.
    ///
    /// # Errors
    /// Returns `SimulationError::Computation` naming the offending player.
    pub fn new(mut players: Vec<PlayerProjection>) -> Result<Self, SimulationError> {
        players.sort_by(|a, b| a.player_id.cmp(&b.player_id));

        let mut index = HashMap::with_capacity(players.len());
        for (i, player) in players.iter().enumerate() {
            if let Err(field) = player.check() {
                return Err(SimulationError::computation(format!(
                    "player {} has invalid {}",
                    player.player_id, field
                )));
            }
            if index.insert(player.player_id.clone(), i).is_some() {
                return Err(SimulationError::computation(format!(
                    "duplicate player id {}",
                    player.player_id
                )));
            }
        }

        let version = Self::content_hash(&players);
        Ok(Self {
            players,
            index,
            version,
        })
    }

    /// An empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            players: Vec::new(),
            index: HashMap::new(),
            version: Self::content_hash(&[]),
        }
    }

    fn content_hash(players: &[PlayerProjection]) -> String {
        let mut fp = Fingerprint::new("catalog");
        fp.u64(players.len() as u64);
        for p in players {
            fp.str(&p.player_id)
                .str(&p.name)
                .str(p.position.as_str())
                .f64(p.points_mean)
                .f64(p.points_std)
                .u64(u64::from(p.acquisition_cost));
        }
        fp.finish()
    }

    /// Content hash of the snapshot.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerProjection] {
        &self.players
    }

    #[must_use]
    pub fn get(&self, player_id: &str) -> Option<&PlayerProjection> {
        self.index.get(player_id).map(|&i| &self.players[i])
    }

    #[must_use]
    pub fn contains(&self, player_id: &str) -> bool {
        self.index.contains_key(player_id)
    }

    /// Players at `position`, in id order.
    pub fn by_position(&self, position: Position) -> impl Iterator<Item = &PlayerProjection> {
        self.players.iter().filter(move |p| p.position == position)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
