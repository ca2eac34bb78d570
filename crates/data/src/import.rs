//! CSV catalog import.
//!
//! Expected header: `player_id,name,position,points_proj,std_dev,adp_cost`.
//! Extra columns are ignored. Every row is validated and all failures are
//! collected before the import is rejected, so one pass over a bad file
//! reports its first few problems together.

use crate::error::StoreError;
use ffdraft_domain::{PlayerProjection, Position};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Columns a catalog file must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "player_id",
    "name",
    "position",
    "points_proj",
    "std_dev",
    "adp_cost",
];

#[derive(Debug, Deserialize)]
struct CsvPlayer {
    player_id: String,
    name: String,
    position: String,
    points_proj: f64,
    std_dev: f64,
    adp_cost: f64,
}

impl CsvPlayer {
    fn into_projection(self) -> Result<PlayerProjection, String> {
        let position: Position = self
            .position
            .parse()
            .map_err(|_| format!("unknown position {:?}", self.position))?;
        if self.name.trim().is_empty() {
            return Err("name is empty".to_string());
        }
        if !self.adp_cost.is_finite()
            || self.adp_cost.fract() != 0.0
            || self.adp_cost < 1.0
            || self.adp_cost > f64::from(u32::MAX)
        {
            return Err(format!(
                "adp_cost must be a positive integer, got {}",
                self.adp_cost
            ));
        }

        let player = PlayerProjection::new(
            self.player_id.trim(),
            self.name.trim(),
            position,
            self.points_proj,
            self.std_dev,
            self.adp_cost as u32,
        );
        player
            .check()
            .map_err(|field| format!("invalid {field}"))?;
        Ok(player)
    }
}

/// Reads and validates a catalog file.
///
/// # Errors
/// `StoreError::Io` when the file cannot be opened, otherwise as
/// [`read_players`].
pub fn load_players_csv(path: impl AsRef<Path>) -> Result<Vec<PlayerProjection>, StoreError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let players = read_players(file)?;
    info!(path = %path.display(), players = players.len(), "Loaded player catalog");
    Ok(players)
}

/// Parses and validates catalog rows from any reader.
///
/// # Errors
/// `MissingColumns` for a bad header, `InvalidRows` when any row fails
/// (first five reported), `Empty` when there are no rows.
pub fn read_players<R: Read>(reader: R) -> Result<Vec<PlayerProjection>, StoreError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| (*column).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StoreError::MissingColumns(missing));
    }

    let mut players = Vec::new();
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, record) in csv.deserialize::<CsvPlayer>().enumerate() {
        let row = index + 1;
        let parsed = record
            .map_err(|e| e.to_string())
            .and_then(CsvPlayer::into_projection);
        match parsed {
            Ok(player) if !seen.insert(player.player_id.clone()) => {
                errors.push(format!("row {row}: duplicate player_id {}", player.player_id));
            }
            Ok(player) => players.push(player),
            Err(reason) => {
                warn!(row, %reason, "Invalid catalog row");
                errors.push(format!("row {row}: {reason}"));
            }
        }
    }

    if !errors.is_empty() {
        return Err(StoreError::invalid_rows(errors));
    }
    if players.is_empty() {
        return Err(StoreError::Empty);
    }
    Ok(players)
}
