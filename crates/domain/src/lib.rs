//! Core domain types for the draft simulator.
//!
//! This crate holds the value types shared by every layer:
//! - Player projections and positions
//! - Scoring formats
//! - Simulation requests, per-player results and response envelopes
//! - The simulation error taxonomy

/// Player entities.
pub mod entities;
/// Domain enumerations.
pub mod enums;
/// Error types.
pub mod error;
/// Value objects.
pub mod value_objects;

pub use entities::PlayerProjection;
pub use enums::{Position, ScoringFormat};
pub use error::SimulationError;
pub use value_objects::{
    SimulationMetadata, SimulationRequest, SimulationResponse, SimulationResult,
};
