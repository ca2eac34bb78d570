//! Store error types.

use ffdraft_domain::SimulationError;

/// Most row errors reported in a failed import.
pub const MAX_REPORTED_ROW_ERRORS: usize = 5;

/// Errors raised while loading or persisting the projection catalog.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Malformed CSV framing or header.
    #[error("invalid csv: {0}")]
    Csv(#[from] csv::Error),
    /// Header lacks required columns.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    /// One or more rows failed validation.
    #[error("found {count} invalid rows; first errors: {}", .first.join("; "))]
    InvalidRows { count: usize, first: Vec<String> },
    /// The source held no players.
    #[error("catalog is empty")]
    Empty,
    /// A stored record cannot be turned into a projection.
    #[error("invalid stored player {player_id}: {reason}")]
    InvalidRecord { player_id: String, reason: String },
    /// Catalog construction failed.
    #[error(transparent)]
    Catalog(#[from] SimulationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Builds an `InvalidRows` error from every collected row error.
    #[must_use]
    pub fn invalid_rows(errors: Vec<String>) -> Self {
        Self::InvalidRows {
            count: errors.len(),
            first: errors.into_iter().take(MAX_REPORTED_ROW_ERRORS).collect(),
        }
    }
}
