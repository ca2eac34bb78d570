use ffdraft_data::{ProjectionStore, StaticProjectionStore, StoreError, read_players};
use ffdraft_domain::SimulationRequest;
use ffdraft_simulation::prelude::*;
use std::io::Write;
use std::sync::Arc;

const CATALOG: &str = "\
player_id,name,position,points_proj,std_dev,adp_cost
qb1,Pocket Passer,QB,310.0,38.0,32
rb1,Workhorse Back,RB,255.0,45.0,58
wr1,Alpha Receiver,WR,240.0,42.0,55
te1,Move Tight End,TE,150.0,30.0,18
k1,Steady Kicker,K,130.0,0.0,1
";

#[tokio::test]
async fn test_csv_catalog_feeds_simulation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    let store = StaticProjectionStore::from_csv(file.path()).unwrap();
    let catalog = store.snapshot().await.unwrap();

    let engine = SimulationOrchestrator::new(
        Arc::new(MemoryCache::default()),
        EngineConfig::default().with_random_source(RandomSource::Seeded(17)),
    );
    let request = SimulationRequest::default()
        .with_scoring_format("half_ppr")
        .with_num_simulations(2_000)
        .with_override("rb1", 61.0);
    let outcome = engine.simulate(catalog, &request).await.unwrap();
    let response = outcome.response;

    assert_eq!(response.results.len(), 5);
    assert_eq!(response.metadata.num_players, 5);
    let kicker = response.result_for("k1").unwrap();
    assert_eq!(kicker.mean, 130.0);
    assert_eq!(kicker.std, 0.0);
    assert_eq!(response.result_for("rb1").unwrap().cost, 61);
    assert_eq!(response.results[0].player_id, "qb1");
}

#[tokio::test]
async fn test_catalog_version_tracks_file_content() {
    let a = StaticProjectionStore::new(read_players(CATALOG.as_bytes()).unwrap()).unwrap();
    let edited = CATALOG.replace("310.0", "311.0");
    let b = StaticProjectionStore::new(read_players(edited.as_bytes()).unwrap()).unwrap();

    let va = a.snapshot().await.unwrap().version().to_string();
    let vb = b.snapshot().await.unwrap().version().to_string();
    assert_ne!(va, vb);
}

#[test]
fn test_invalid_file_reports_row_numbers() {
    let bad = CATALOG.replace("TE,150.0", "LB,150.0");
    match read_players(bad.as_bytes()) {
        Err(StoreError::InvalidRows { count, first }) => {
            assert_eq!(count, 1);
            assert!(first[0].starts_with("row 4:"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}
