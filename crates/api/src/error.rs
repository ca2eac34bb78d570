//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ffdraft_data::StoreError;
use ffdraft_domain::SimulationError;
use serde::Serialize;
use std::time::Duration;
use tracing::error;

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
    pub code: u16,
}

/// Errors surfaced by handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or out-of-range input (400).
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Override for a player that is not in the catalog (400).
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    /// Body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Simulation did not finish in time (504).
    #[error("simulation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Catalog source unavailable (503).
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Internal failure (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::UnknownPlayer(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let code = self.status().as_u16();
        let (error, detail) = match self {
            Self::Validation { field, reason } => {
                (format!("invalid {field}"), Some(reason.clone()))
            }
            Self::UnknownPlayer(player_id) => (
                "unknown player".to_string(),
                Some(format!("player {player_id} is not in the catalog")),
            ),
            Self::BadRequest(detail) => ("bad request".to_string(), Some(detail.clone())),
            Self::NotFound(what) => (format!("{what} not found"), None),
            Self::Timeout(limit) => (
                "simulation timed out".to_string(),
                Some(format!("no result within {}s", limit.as_secs())),
            ),
            Self::Unavailable(_) => ("service unavailable".to_string(), None),
            // Internal details stay in the logs.
            Self::Internal(_) => ("internal server error".to_string(), None),
        };
        ErrorBody {
            error,
            detail,
            code,
        }
    }
}

impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::Validation { field, reason } => Self::Validation { field, reason },
            SimulationError::UnknownPlayer { player_id } => Self::UnknownPlayer(player_id),
            SimulationError::Computation(reason) => Self::Internal(reason),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
