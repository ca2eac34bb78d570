//! Request metrics middleware and log sanitizing helpers.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Number of recent response times kept for latency statistics.
pub const RESPONSE_TIME_WINDOW: usize = 1_000;

/// Longest identifier echoed into logs.
pub const MAX_LOGGED_ID_LEN: usize = 20;

#[derive(Debug, Default)]
struct Counters {
    requests: u64,
    errors: u64,
    response_times: VecDeque<f64>,
}

/// Request and error counts plus a sliding window of response times.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    inner: Mutex<Counters>,
}

/// Point-in-time view of [`RequestMetrics`]. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequestMetricsSnapshot {
    pub request_count: u64,
    pub error_count: u64,
    /// Errors as a percentage of requests.
    pub error_rate: f64,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
}

impl RequestMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished request. Status codes of 400 and above count
    /// as errors.
    pub fn record(&self, seconds: f64, status: u16) {
        let mut counters = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        counters.requests += 1;
        if status >= 400 {
            counters.errors += 1;
        }
        counters.response_times.push_back(seconds);
        if counters.response_times.len() > RESPONSE_TIME_WINDOW {
            counters.response_times.pop_front();
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> RequestMetricsSnapshot {
        let counters = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let times = &counters.response_times;
        let (avg, min, max) = if times.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let sum: f64 = times.iter().sum();
            let min = times.iter().copied().fold(f64::INFINITY, f64::min);
            let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (sum / times.len() as f64, min, max)
        };
        let error_rate = if counters.requests == 0 {
            0.0
        } else {
            counters.errors as f64 / counters.requests as f64 * 100.0
        };
        RequestMetricsSnapshot {
            request_count: counters.requests,
            error_count: counters.errors,
            error_rate: round_to(error_rate, 2),
            avg_response_time: round_to(avg, 3),
            min_response_time: round_to(min, 3),
            max_response_time: round_to(max, 3),
        }
    }
}

fn round_to(value: f64, dp: i32) -> f64 {
    let scale = 10f64.powi(dp);
    (value * scale).round() / scale
}

/// Times every request, records it, and sets `X-Process-Time`.
pub async fn track_requests(
    State(metrics): State<Arc<RequestMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = started.elapsed().as_secs_f64();
    metrics.record(elapsed, response.status().as_u16());
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.6}")) {
        response.headers_mut().insert("x-process-time", value);
    }
    response
}

/// Caps an identifier before it is logged.
#[must_use]
pub fn sanitize_id(id: &str) -> String {
    id.chars().take(MAX_LOGGED_ID_LEN).collect()
}
