//! Map factor penalties applied by the likelihood-field scanners.

mod common;

use approx::assert_relative_eq;
use common::*;
use drishti_amcl::core::{Beam, Pose2D, SensorObservation};
use drishti_amcl::map::{DistanceField, OccupancyMap};
use drishti_amcl::sensors::{LikelihoodFieldParams, MapFactors, PlanarScanner, SensorModel};

const NFSF: f64 = 0.2;
const RADIUS: f64 = 0.2;

fn scanner() -> PlanarScanner<OccupancyMap> {
    init_logger();
    let mut scanner = PlanarScanner::new(90, shared_room());
    scanner
        .set_model_likelihood_field(LikelihoodFieldParams::default())
        .unwrap();
    scanner
        .set_map_factors(MapFactors {
            off_map_factor: 0.05,
            non_free_space_factor: NFSF,
            non_free_space_radius: RADIUS,
            global_localization_off_map_factor: 0.0,
            global_localization_non_free_space_factor: 0.0,
        })
        .unwrap();
    scanner
}

/// Score relative to the same scan from a free-space pose, so the scan
/// itself cancels out. Max-range beams contribute nothing, leaving the
/// factor alone.
fn factor_at(scanner: &mut PlanarScanner<OccupancyMap>, pose: Pose2D) -> f64 {
    let obs = SensorObservation::planar(vec![Beam::new(10.0, 0.0)], 10.0);
    scanner.score_pose(pose, &obs)
}

#[test]
fn test_free_space_factor_is_one() {
    let mut scanner = scanner();
    assert_relative_eq!(factor_at(&mut scanner, true_pose()), 1.0);
}

#[test]
fn test_off_map_factor() {
    let mut scanner = scanner();
    assert_relative_eq!(factor_at(&mut scanner, Pose2D::new(-1.0, 1.0, 0.0)), 0.05);
}

#[test]
fn test_non_free_interpolation_end_points_and_linearity() {
    let mut scanner = scanner();
    let map = room();

    // Pillar spans cells 50..60 in x; walk into it along its middle row
    let row_y = 1.025;
    let mut readings = Vec::new();
    for cx in 50..55 {
        let pose = Pose2D::new(cx as f64 * RESOLUTION + 0.025, row_y, 0.0);
        let d = map.distance_to_free_space(pose.position());
        readings.push((d, factor_at(&mut scanner, pose)));
    }

    // Edge cell: one cell from free space
    let (d0, f0) = readings[0];
    assert_relative_eq!(d0, RESOLUTION, epsilon = 1e-9);
    assert_relative_eq!(f0, NFSF + (1.0 - NFSF) * d0 / RADIUS, epsilon = 1e-9);

    // Linear in distance until the radius, then saturated at 1
    for &(d, f) in &readings {
        let expected = NFSF + (1.0 - NFSF) * (d / RADIUS).min(1.0);
        assert_relative_eq!(f, expected, epsilon = 1e-9);
    }
    let deepest = readings.last().unwrap();
    assert!(deepest.0 >= RADIUS);
    assert_relative_eq!(deepest.1, 1.0, epsilon = 1e-9);
}

#[test]
fn test_global_localization_overrides() {
    let mut scanner = scanner();
    let off_map = Pose2D::new(-1.0, 1.0, 0.0);
    let in_wall = Pose2D::new(2.525, 1.025, 0.0);

    scanner.set_global_localization(true);
    assert_relative_eq!(factor_at(&mut scanner, off_map), 0.0);
    assert_relative_eq!(factor_at(&mut scanner, in_wall), 0.0);

    scanner.set_global_localization(false);
    assert_relative_eq!(factor_at(&mut scanner, off_map), 0.05);
    assert_relative_eq!(
        factor_at(&mut scanner, in_wall),
        NFSF + (1.0 - NFSF) * RESOLUTION / RADIUS,
        epsilon = 1e-9
    );
}

#[test]
fn test_rejects_invalid_factors() {
    let mut scanner = scanner();
    let result = scanner.set_map_factors(MapFactors {
        non_free_space_factor: -0.5,
        ..Default::default()
    });
    assert!(result.is_err());
    assert_relative_eq!(scanner.map_factors().non_free_space_factor, NFSF);
}
