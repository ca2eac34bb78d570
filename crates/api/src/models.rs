//! API request/response models.

use crate::middleware::RequestMetricsSnapshot;
use ffdraft_domain::PlayerProjection;
use ffdraft_simulation::orchestrator::EngineStatsSnapshot;
use serde::{Deserialize, Serialize};

/// A catalog player as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerResponse {
    pub player_id: String,
    pub name: String,
    pub position: String,
    /// Projected points.
    pub points_proj: f64,
    /// Projection standard deviation.
    pub std_dev: f64,
    /// Auction cost.
    pub adp_cost: u32,
}

impl From<&PlayerProjection> for PlayerResponse {
    fn from(player: &PlayerProjection) -> Self {
        Self {
            player_id: player.player_id.clone(),
            name: player.name.clone(),
            position: player.position.as_str().to_string(),
            points_proj: player.points_mean,
            std_dev: player.points_std,
            adp_cost: player.acquisition_cost,
        }
    }
}

/// Query string of `GET /players`.
#[derive(Debug, Default, Deserialize)]
pub struct PlayersQuery {
    pub position: Option<String>,
}

/// Status of one dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyHealth {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`.
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub uptime_secs: u64,
    pub catalog: DependencyHealth,
    pub cache: DependencyHealth,
}

/// Body of `GET /metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    pub service: &'static str,
    pub timestamp: String,
    pub requests: RequestMetricsSnapshot,
    pub engine: EngineStatsSnapshot,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub health: &'static str,
    pub endpoints: IndexEndpoints,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexEndpoints {
    pub players: &'static str,
    pub simulate: &'static str,
    pub metrics: &'static str,
}
