//! Deterministic fingerprints for catalogs, engine models and simulation
//! parameters.
//!
//! Every input is fed to BLAKE3 through a length-prefixed canonical encoding,
//! so keys depend only on logical values: override maps are walked in sorted
//! order and floats are hashed by their bit patterns.

use crate::params::SimulationParameters;

/// Namespace prepended to every simulation cache key.
pub const CACHE_KEY_PREFIX: &str = "sim:v1:";

/// Incremental canonical hasher.
pub struct Fingerprint {
    hasher: blake3::Hasher,
}

impl Fingerprint {
    /// Starts a fingerprint in the given domain. Different domains never
    /// collide even for identical field sequences.
    #[must_use]
    pub fn new(domain: &str) -> Self {
        let mut fp = Self {
            hasher: blake3::Hasher::new(),
        };
        fp.str(domain);
        fp
    }

    pub fn str(&mut self, value: &str) -> &mut Self {
        self.u64(value.len() as u64);
        self.hasher.update(value.as_bytes());
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn f64(&mut self, value: f64) -> &mut Self {
        // -0.0 and 0.0 are the same projection.
        let normalized = if value == 0.0 { 0.0 } else { value };
        self.u64(normalized.to_bits())
    }

    /// Hex digest of everything written so far.
    #[must_use]
    pub fn finish(&self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}

/// Derives the cache key for one simulation.
///
/// `catalog_version` is the content hash of the catalog snapshot and
/// `model_fingerprint` covers engine configuration that changes results
/// (scoring table, boom/bust rule).
#[must_use]
pub fn derive_cache_key(
    catalog_version: &str,
    model_fingerprint: &str,
    params: &SimulationParameters,
) -> String {
    let mut fp = Fingerprint::new("simulation");
    fp.str(catalog_version)
        .str(model_fingerprint)
        .u64(u64::from(params.budget()))
        .str(params.scoring_format().as_str())
        .u64(u64::from(params.num_simulations()));

    let overrides = params.adp_overrides();
    fp.u64(overrides.len() as u64);
    for (player_id, cost) in overrides {
        fp.str(player_id).u64(u64::from(*cost));
    }

    format!("{CACHE_KEY_PREFIX}{}", fp.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use ffdraft_domain::{PlayerProjection, Position, SimulationRequest};
    use std::collections::HashMap;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            PlayerProjection::new("p1", "One", Position::Rb, 20.0, 5.0, 10),
            PlayerProjection::new("p2", "Two", Position::Wr, 15.0, 4.0, 8),
            PlayerProjection::new("p3", "Three", Position::Te, 9.0, 3.0, 4),
        ])
        .unwrap()
    }

    fn key_for(request: &SimulationRequest) -> String {
        let catalog = catalog();
        let params = SimulationParameters::validate(request, &catalog).unwrap();
        derive_cache_key(catalog.version(), "model", &params)
    }

    #[test]
    fn test_key_is_stable_and_prefixed() {
        let request = SimulationRequest::default().with_budget(150);
        let a = key_for(&request);
        let b = key_for(&request);
        assert_eq!(a, b);
        assert!(a.starts_with(CACHE_KEY_PREFIX));
        assert_eq!(a.len(), CACHE_KEY_PREFIX.len() + 64);
    }

    #[test]
    fn test_override_insertion_order_does_not_matter() {
        let mut forward = HashMap::new();
        forward.insert("p1".to_string(), 12.0);
        forward.insert("p2".to_string(), 30.0);
        forward.insert("p3".to_string(), 2.0);

        let mut backward = HashMap::with_capacity(16);
        backward.insert("p3".to_string(), 2.0);
        backward.insert("p2".to_string(), 30.0);
        backward.insert("p1".to_string(), 12.0);

        let a = SimulationRequest {
            adp_overrides: Some(forward),
            ..Default::default()
        };
        let b = SimulationRequest {
            adp_overrides: Some(backward),
            ..Default::default()
        };
        assert_eq!(key_for(&a), key_for(&b));
    }

    #[test]
    fn test_equivalent_json_bodies_share_a_key() {
        let compact: SimulationRequest =
            serde_json::from_str(r#"{"budget":200,"adp_overrides":{"p1":15,"p2":9}}"#).unwrap();
        let spaced: SimulationRequest = serde_json::from_str(
            r#"{ "adp_overrides" : { "p2" : 9.0 , "p1" : 15 } ,
                 "budget" : 200 }"#,
        )
        .unwrap();
        assert_eq!(key_for(&compact), key_for(&spaced));
        // Defaults spelled out explicitly match omitted fields.
        let explicit = SimulationRequest::default()
            .with_budget(200)
            .with_num_simulations(1000)
            .with_scoring_format("standard")
            .with_override("p1", 15.0)
            .with_override("p2", 9.0);
        assert_eq!(key_for(&compact), key_for(&explicit));
    }

    #[test]
    fn test_every_computational_field_changes_the_key() {
        let base = SimulationRequest::default().with_override("p1", 15.0);
        let base_key = key_for(&base);

        let variants = [
            base.clone().with_budget(201),
            base.clone().with_scoring_format("ppr"),
            base.clone().with_num_simulations(1001),
            base.clone().with_override("p1", 16.0),
            base.clone().with_override("p2", 8.0),
            SimulationRequest::default(),
        ];
        for variant in &variants {
            assert_ne!(key_for(variant), base_key, "{variant:?}");
        }
    }

    #[test]
    fn test_catalog_and_model_feed_the_key() {
        let catalog = catalog();
        let params =
            SimulationParameters::validate(&SimulationRequest::default(), &catalog).unwrap();
        let a = derive_cache_key(catalog.version(), "model-a", &params);
        let b = derive_cache_key(catalog.version(), "model-b", &params);
        let c = derive_cache_key("other-catalog", "model-a", &params);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fingerprint_length_prefix_separates_fields() {
        let mut a = Fingerprint::new("t");
        a.str("ab").str("c");
        let mut b = Fingerprint::new("t");
        b.str("a").str("bc");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_fingerprint_treats_signed_zero_alike() {
        let mut a = Fingerprint::new("t");
        a.f64(0.0);
        let mut b = Fingerprint::new("t");
        b.f64(-0.0);
        assert_eq!(a.finish(), b.finish());
    }
}
