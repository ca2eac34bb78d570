pub mod rounding;
pub mod simulation_request;
pub mod simulation_result;

pub use rounding::{round_half_away, to_fixed};
pub use simulation_request::SimulationRequest;
pub use simulation_result::{SimulationMetadata, SimulationResponse, SimulationResult};
