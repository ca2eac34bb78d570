//! Simulation error taxonomy.

/// Errors produced while validating or running a simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// A request field is malformed or out of range.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Offending field, e.g. `num_simulations` or `adp_overrides.p1`.
        field: String,
        /// Human readable reason.
        reason: String,
    },
    /// An ADP override references a player missing from the catalog.
    #[error("unknown player in adp_overrides: {player_id}")]
    UnknownPlayer {
        /// The unknown player id.
        player_id: String,
    },
    /// Non-recoverable numeric or runtime failure.
    #[error("simulation failed: {0}")]
    Computation(String),
}

impl SimulationError {
    /// Creates a validation error for `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a computation error.
    pub fn computation(reason: impl Into<String>) -> Self {
        Self::Computation(reason.into())
    }

    /// Whether the error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::UnknownPlayer { .. })
    }
}
