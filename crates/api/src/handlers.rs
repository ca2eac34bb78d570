//! Request handlers.

use crate::error::{ApiError, ApiResult};
use crate::middleware::sanitize_id;
use crate::models::{
    DependencyHealth, HealthResponse, IndexEndpoints, IndexResponse, MetricsResponse,
    PlayerResponse, PlayersQuery,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, StatusCode};
use axum::response::IntoResponse;
use ffdraft_domain::{Position, SimulationRequest};
use tracing::{info, warn};

/// Name reported by the service endpoints.
pub const SERVICE_NAME: &str = "ffdraft-api";

/// Header carrying the cache status of a simulation.
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// `GET /`
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Draft simulation API is running",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        health: "/health",
        endpoints: IndexEndpoints {
            players: "/players",
            simulate: "/simulate",
            metrics: "/metrics",
        },
    })
}

/// `GET /players`, optionally filtered with `?position=`.
pub async fn list_players(
    State(state): State<AppState>,
    Query(query): Query<PlayersQuery>,
) -> ApiResult<Json<Vec<PlayerResponse>>> {
    let position = query
        .position
        .as_deref()
        .map(str::parse::<Position>)
        .transpose()
        .map_err(|e| ApiError::Validation {
            field: "position".into(),
            reason: e.to_string(),
        })?;

    let players: Vec<PlayerResponse> = match position {
        Some(position) => state
            .store
            .players_at(position)
            .await?
            .iter()
            .map(Into::into)
            .collect(),
        None => state
            .store
            .snapshot()
            .await?
            .players()
            .iter()
            .map(Into::into)
            .collect(),
    };
    info!(count = players.len(), position = ?position, "Listed players");
    Ok(Json(players))
}

/// `GET /players/{player_id}`
pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> ApiResult<Json<PlayerResponse>> {
    let safe_id = sanitize_id(&player_id);
    info!(player_id = %safe_id, "Fetching player");

    state
        .store
        .player(&player_id)
        .await?
        .map(|player| Json((&player).into()))
        .ok_or_else(|| ApiError::NotFound("player".into()))
}

/// `POST /simulate`
pub async fn simulate(
    State(state): State<AppState>,
    payload: Result<Json<SimulationRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    info!(
        budget = ?request.budget,
        scoring_format = ?request.scoring_format.as_deref().map(sanitize_id),
        num_simulations = ?request.num_simulations,
        overrides = request.adp_overrides.as_ref().map_or(0, |o| o.len()),
        "Simulation requested"
    );

    let catalog = state.store.snapshot().await?;
    let outcome = tokio::time::timeout(
        state.simulation_timeout,
        state.engine.simulate(catalog, &request),
    )
    .await
    .map_err(|_| {
        warn!(
            timeout_secs = state.simulation_timeout.as_secs(),
            "Simulation exceeded timeout"
        );
        ApiError::Timeout(state.simulation_timeout)
    })??;

    info!(
        players = outcome.response.results.len(),
        cache = outcome.cache_status.as_str(),
        "Simulation completed"
    );
    Ok((
        [(CACHE_STATUS_HEADER, outcome.cache_status.as_str())],
        Json(outcome.response),
    ))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = match state.store.snapshot().await {
        Ok(catalog) => DependencyHealth {
            status: "healthy".into(),
            backend: state.store.name().into(),
            player_count: Some(catalog.len()),
            catalog_version: Some(catalog.version().to_string()),
            error: None,
        },
        Err(e) => DependencyHealth {
            status: "unhealthy".into(),
            backend: state.store.name().into(),
            player_count: None,
            catalog_version: None,
            error: Some(e.to_string()),
        },
    };
    let cache = match state.engine.ping_cache().await {
        Ok(()) => DependencyHealth {
            status: "healthy".into(),
            backend: state.engine.cache_backend().into(),
            player_count: None,
            catalog_version: None,
            error: None,
        },
        Err(e) => DependencyHealth {
            status: "unhealthy".into(),
            backend: state.engine.cache_backend().into(),
            player_count: None,
            catalog_version: None,
            error: Some(e.to_string()),
        },
    };

    let healthy = catalog.status == "healthy" && cache.status == "healthy";
    let status = if healthy {
        StatusCode::OK
    } else {
        warn!(catalog = %catalog.status, cache = %cache.status, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.into(),
        service: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: now(),
        uptime_secs: state.uptime_secs(),
        catalog,
        cache,
    };
    (status, Json(body))
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        service: SERVICE_NAME,
        timestamp: now(),
        requests: state.metrics.snapshot(),
        engine: state.engine.stats(),
    })
}
