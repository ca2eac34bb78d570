use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use ffdraft_api::{AppState, ErrorBody, create_router};
use ffdraft_data::StaticProjectionStore;
use ffdraft_domain::{PlayerProjection, Position, SimulationResponse};
use ffdraft_simulation::prelude::*;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tower::ServiceExt;

fn players() -> Vec<PlayerProjection> {
    vec![
        PlayerProjection::new("p1", "Lead Back", Position::Rb, 20.0, 5.0, 45),
        PlayerProjection::new("p2", "Deep Threat", Position::Wr, 15.0, 6.0, 30),
        PlayerProjection::new("p3", "Game Manager", Position::Qb, 18.0, 4.0, 12),
        PlayerProjection::new("p4", "Automatic", Position::K, 8.0, 0.0, 1),
    ]
}

fn state_with(
    cache: Arc<dyn SimulationCache>,
    samplers: Option<SamplerSet>,
    timeout: Duration,
) -> AppState {
    let store = Arc::new(StaticProjectionStore::new(players()).unwrap());
    let mut engine = SimulationOrchestrator::new(
        cache,
        EngineConfig::default().with_random_source(RandomSource::Seeded(21)),
    );
    if let Some(samplers) = samplers {
        engine = engine.with_samplers(samplers);
    }
    AppState::new(store, engine, timeout)
}

fn app() -> Router {
    let state = state_with(
        Arc::new(MemoryCache::default()),
        None,
        Duration::from_secs(30),
    );
    create_router(state, &["*".to_string()])
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cache = response
        .headers()
        .get("x-cache")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, cache, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let (status, _, body) = send(&app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["simulate"], "/simulate");
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let app = app();
    for request in [get("/"), get("/players/nobody"), post_json("/simulate", json!({"budget": 0}))] {
        let response = app.clone().oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["content-security-policy"], "default-src 'self'");
        assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
        assert!(headers.contains_key("strict-transport-security"));
    }
}

#[tokio::test]
async fn test_list_players_and_filter() {
    let app = app();
    let (status, _, body) = send(&app, get("/players")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
    assert_eq!(body[0]["player_id"], "p1");
    assert_eq!(body[0]["points_proj"], 20.0);
    assert_eq!(body[0]["adp_cost"], 45);

    let (status, _, body) = send(&app, get("/players?position=wr")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["position"], "WR");

    let (status, _, body) = send(&app, get("/players?position=LB")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid position");
}

#[tokio::test]
async fn test_get_player_and_not_found() {
    let app = app();
    let (status, _, body) = send(&app, get("/players/p3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Game Manager");

    let long_id = "x".repeat(80);
    let (status, _, body) = send(&app, get(&format!("/players/{long_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorBody = serde_json::from_value(body).unwrap();
    assert_eq!(error.code, 404);
    assert_eq!(error.error, "player not found");
}

#[tokio::test]
async fn test_simulate_then_cache_hit() {
    let app = app();
    let request = json!({"num_simulations": 500, "scoring_format": "ppr"});

    let (status, cache, first) = send(&app, post_json("/simulate", request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("miss"));
    let first: SimulationResponse = serde_json::from_value(first).unwrap();
    assert_eq!(first.results.len(), 4);
    assert_eq!(first.metadata.num_simulations, 500);
    assert!(first.metadata.cache_key.starts_with(CACHE_KEY_PREFIX));

    let (status, cache, second) = send(&app, post_json("/simulate", request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("hit"));
    let second: SimulationResponse = serde_json::from_value(second).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_equivalent_bodies_share_a_key() {
    let app = app();
    let a = json!({"adp_overrides": {"p1": 50, "p2": 20}, "budget": 150});
    let b = json!({"budget": 150, "adp_overrides": {"p2": 20.0, "p1": 50.0}});

    let (_, _, first) = send(&app, post_json("/simulate", a)).await;
    let (_, cache, second) = send(&app, post_json("/simulate", b)).await;
    assert_eq!(cache.as_deref(), Some("hit"));
    assert_eq!(first["metadata"]["cache_key"], second["metadata"]["cache_key"]);
    assert_eq!(first["metadata"]["budget"], 150);
}

#[tokio::test]
async fn test_simulate_rejects_bad_input() {
    let app = app();

    let (status, _, body) = send(&app, post_json("/simulate", json!({"num_simulations": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid num_simulations");

    let (status, _, body) = send(
        &app,
        post_json("/simulate", json!({"adp_overrides": {"ghost": 10}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("ghost"));

    let (status, _, body) = send(
        &app,
        post_json("/simulate", json!({"scoring_format": "six_point_passing_td"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid scoring_format");

    let (status, _, body) = send(&app, post_json("/simulate", json!({"budget": "lots"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

/// Blocks every draw until released, so a request can never finish
/// before the handler's timeout.
struct HeldSampler {
    released: Arc<AtomicBool>,
}

impl Sampler for HeldSampler {
    fn sample(
        &self,
        draws: &[PlayerDraw],
        trials: usize,
        rng: &mut StdRng,
    ) -> Result<ffdraft_simulation::sampler::TrialMatrix, ffdraft_domain::SimulationError> {
        while !self.released.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(1));
        }
        ScalarSampler.sample(draws, trials, rng)
    }

    fn is_batched(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "held"
    }
}

#[tokio::test]
async fn test_slow_simulation_times_out() {
    let released = Arc::new(AtomicBool::new(false));
    let held: Arc<dyn Sampler> = Arc::new(HeldSampler {
        released: Arc::clone(&released),
    });
    let state = state_with(
        Arc::new(MemoryCache::default()),
        Some(SamplerSet {
            scalar: held.clone(),
            batched: held,
        }),
        Duration::from_millis(50),
    );
    let app = create_router(state, &[]);

    let (status, _, body) = send(&app, post_json("/simulate", json!({}))).await;
    released.store(true, Ordering::SeqCst);
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], 504);
}

struct DownCache;

#[async_trait]
impl SimulationCache for DownCache {
    async fn get(&self, _key: &str) -> Result<Option<SimulationResponse>, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn put(
        &self,
        _key: &str,
        _value: &SimulationResponse,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

#[tokio::test]
async fn test_cache_outage_still_serves_and_reports_unhealthy() {
    let state = state_with(Arc::new(DownCache), None, Duration::from_secs(30));
    let app = create_router(state, &[]);

    let (status, cache, body) =
        send(&app, post_json("/simulate", json!({"num_simulations": 100}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("bypass"));
    assert_eq!(body["results"].as_array().unwrap().len(), 4);

    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["catalog"]["status"], "healthy");
    assert_eq!(body["cache"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = app();
    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["catalog"]["player_count"], 4);
    assert_eq!(body["cache"]["backend"], "memory");

    send(&app, post_json("/simulate", json!({"num_simulations": 50}))).await;
    send(&app, post_json("/simulate", json!({"num_simulations": 50}))).await;
    send(&app, get("/players/nobody")).await;

    let (status, _, body) = send(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["engine"]["computations"], 1);
    assert_eq!(body["engine"]["cache_hits"], 1);
    assert_eq!(body["engine"]["cache_misses"], 1);
    assert_eq!(body["requests"]["request_count"], 4);
    assert_eq!(body["requests"]["error_count"], 1);
}
