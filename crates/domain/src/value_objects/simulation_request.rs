use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw, unvalidated simulation input as received from a caller.
///
/// Numeric fields are signed and overrides are floats so that bad input
/// (negative counts, fractional costs) reaches the validator and is reported
/// with the offending field instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_simulations: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adp_overrides: Option<HashMap<String, f64>>,
}

impl SimulationRequest {
    #[must_use]
    pub fn with_budget(mut self, budget: i64) -> Self {
        self.budget = Some(budget);
        self
    }

    #[must_use]
    pub fn with_scoring_format(mut self, format: impl Into<String>) -> Self {
        self.scoring_format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_num_simulations(mut self, num_simulations: i64) -> Self {
        self.num_simulations = Some(num_simulations);
        self
    }

    /// Adds one ADP override.
    #[must_use]
    pub fn with_override(mut self, player_id: impl Into<String>, cost: f64) -> Self {
        self.adp_overrides
            .get_or_insert_with(HashMap::new)
            .insert(player_id.into(), cost);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_deserializes_to_defaults() {
        let request: SimulationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, SimulationRequest::default());
    }

    #[test]
    fn test_negative_values_survive_deserialization() {
        let request: SimulationRequest =
            serde_json::from_str(r#"{"num_simulations": -5, "adp_overrides": {"p1": 15.5}}"#)
                .unwrap();
        assert_eq!(request.num_simulations, Some(-5));
        assert_eq!(request.adp_overrides.unwrap()["p1"], 15.5);
    }

    #[test]
    fn test_builder_accumulates_overrides() {
        let request = SimulationRequest::default()
            .with_override("p1", 10.0)
            .with_override("p2", 20.0);
        assert_eq!(request.adp_overrides.map(|o| o.len()), Some(2));
    }
}
