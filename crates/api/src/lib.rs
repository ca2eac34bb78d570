//! REST API server and endpoints.
//!
//! This crate exposes the draft simulator over HTTP:
//! - Player catalog listing and lookup
//! - Cached Monte Carlo simulations
//! - Health and request metrics

/// Error types.
pub mod error;
/// Request handlers.
pub mod handlers;
/// Middleware components.
pub mod middleware;
/// API request/response models.
pub mod models;
/// Route definitions.
pub mod routes;
/// Server configuration and startup.
pub mod server;
/// Application state.
pub mod state;

pub use error::{ApiError, ApiResult, ErrorBody};
pub use routes::create_router;
pub use server::{ServerConfig, serve};
pub use state::AppState;
