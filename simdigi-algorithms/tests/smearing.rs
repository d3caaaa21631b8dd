//! Hit smearing on a loaded detector.

use std::sync::Arc;

use glam::DVec3;
use simdigi_algorithms::{HitSmearing, HitSmearingConfig, SimSourceLinkContainer};
use simdigi_core::{
    Algorithm, AlgorithmContext, GeometryContext, GeometryId, ProcessCode, RandomNumbers,
    WhiteBoard,
};
use simdigi_geometry::{sim_hits_from_unsorted, SimHit, TrackingGeometry};

const TILTED: &str = r#"{
    "modules": [
        { "volume": 2, "layer": 2, "sensitive": 7,
          "translation": [25.0, 0.0, 0.0],
          "rotation": [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
          "alignments": [ { "epoch": 1, "translation": [25.0, 0.5, 0.0],
                            "rotation": [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]] } ] }
    ]
}"#;

fn links(epoch: u64, sigma: f64) -> SimSourceLinkContainer {
    let geometry = TrackingGeometry::from_json(TILTED).unwrap();
    let surface = geometry
        .find_surface(GeometryId::sensitive_module(2, 2, 7))
        .unwrap();
    let hits = sim_hits_from_unsorted([SimHit::new(
        Arc::clone(surface),
        DVec3::new(25.0, 1.0, 2.0),
        DVec3::X,
        1.0,
        0.0,
        1,
    )]);

    let config = HitSmearingConfig::new("hits", "links")
        .with_resolution(sigma, sigma)
        .with_random_numbers(Arc::new(RandomNumbers::new(3)));
    let algorithm = HitSmearing::new(config).unwrap();

    let mut store = WhiteBoard::new();
    store.add("hits", hits).unwrap();
    let mut ctx = AlgorithmContext::new(0, 0, &mut store)
        .with_geo_context(GeometryContext::new(epoch));
    assert_eq!(algorithm.execute(&mut ctx).unwrap(), ProcessCode::Success);
    store
        .get::<SimSourceLinkContainer>("links")
        .unwrap()
        .clone()
}

#[test]
fn test_measurement_in_rotated_frame() {
    let nominal = links(0, 0.0);
    let link = &nominal.as_slice()[0].1;
    assert_eq!(link.hit_index, 0);
    assert_eq!(link.geometry_id, GeometryId::sensitive_module(2, 2, 7));
    // local x runs along global y, local y along global z
    approx::assert_relative_eq!(link.values.x, 1.0, epsilon = 1e-12);
    approx::assert_relative_eq!(link.values.y, 2.0, epsilon = 1e-12);
}

#[test]
fn test_measurement_follows_alignment() {
    let aligned = links(1, 0.0);
    approx::assert_relative_eq!(aligned.as_slice()[0].1.values.x, 0.5, epsilon = 1e-12);
}

#[test]
fn test_smearing_stays_near_truth() {
    let smeared = links(0, 0.01);
    let values = smeared.as_slice()[0].1.values;
    assert!((values.x - 1.0).abs() < 0.1);
    assert!((values.y - 2.0).abs() < 0.1);
    assert_ne!(values.x, 1.0);
}
