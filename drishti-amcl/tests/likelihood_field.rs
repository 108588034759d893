//! Likelihood field scoring through the planar scanner.

mod common;

use approx::assert_relative_eq;
use common::*;
use drishti_amcl::core::math::normal_pdf;
use drishti_amcl::core::{Beam, ParticleSampleSet, Pose2D, SensorObservation};
use drishti_amcl::map::{DistanceField, OccupancyMap};
use drishti_amcl::sensors::likelihood;
use drishti_amcl::sensors::{
    GompertzTransform, LikelihoodFieldParams, MapFactors, PlanarScanner, SensorModel,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn field() -> LikelihoodFieldParams {
    LikelihoodFieldParams {
        z_hit: 0.95,
        z_rand: 0.05,
        sigma_hit: 0.2,
        max_occ_dist: 2.0,
    }
}

fn scanner() -> PlanarScanner<OccupancyMap> {
    init_logger();
    let mut scanner = PlanarScanner::new(90, shared_room());
    scanner.set_model_likelihood_field(field()).unwrap();
    scanner
}

#[test]
fn test_single_beam_on_wall() {
    let mut scanner = scanner();
    // Right wall occupies x in [3.95, 4.0)
    let pose = Pose2D::new(1.025, 1.525, 0.0);
    let obs = SensorObservation::planar(vec![Beam::new(2.95, 0.0)], 10.0);
    let mut set = single(pose);

    assert!(scanner.update(&mut set, &obs));

    let expected = 0.95 / (0.2 * std::f64::consts::TAU.sqrt()) + 0.05 / 10.0;
    assert_relative_eq!(set.samples()[0].weight, expected, epsilon = 1e-9);
    assert_relative_eq!(set.samples()[0].weight, 1.90, epsilon = 1e-3);
}

#[test]
fn test_zero_noise_scan_scores_peak_per_beam() {
    let mut scanner = scanner();
    let map = room();
    // Axis-aligned beams from a cell center end exactly in wall cells
    let pose = Pose2D::new(1.025, 1.525, 0.0);
    let obs = SensorObservation::from_ranges(
        &[2.95, 1.45, 1.0, 1.5],
        0.0,
        std::f64::consts::FRAC_PI_2,
        10.0,
    );
    for beam in obs.beams().unwrap() {
        let end = pose.project(beam.range, beam.bearing);
        assert_relative_eq!(map.distance_to_nearest_obstacle(end), 0.0);
    }

    let score = scanner.score_pose(pose, &obs);
    let per_beam = 0.95 * normal_pdf(0.0, 0.0, 0.2) + 0.005;
    assert_relative_eq!(score, per_beam.powi(4), epsilon = 1e-9);
}

#[test]
fn test_true_pose_outscores_perturbed_poses() {
    let mut scanner = scanner();
    let map = room();
    let truth = true_pose();
    let obs = synthetic_scan(&map, &truth, 90);

    let best = scanner.score_pose(truth, &obs);
    for offset in [
        Pose2D::new(truth.x + 0.15, truth.y, truth.theta),
        Pose2D::new(truth.x - 0.15, truth.y, truth.theta),
        Pose2D::new(truth.x, truth.y + 0.15, truth.theta),
        Pose2D::new(truth.x, truth.y, truth.theta + 0.15),
        Pose2D::new(truth.x + 0.5, truth.y - 0.3, truth.theta - 0.4),
    ] {
        let score = scanner.score_pose(offset, &obs);
        assert!(score < best, "{offset:?} scored {score} >= {best}");
    }
}

#[test]
fn test_score_non_increasing_in_endpoint_distance() {
    let mut scanner = scanner();
    let map = room();
    let pose = true_pose();
    let mut rng = StdRng::seed_from_u64(7);

    let mut samples: Vec<(f64, f64)> = (0..200)
        .map(|_| {
            let beam = Beam::new(rng.random_range(0.1..4.0), rng.random_range(-3.0..3.0));
            let end = pose.project(beam.range, beam.bearing);
            let d = map.distance_to_nearest_obstacle(end).min(2.0);
            let obs = SensorObservation::planar(vec![beam], 10.0);
            (d, scanner.score_pose(pose, &obs))
        })
        .collect();
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));

    for pair in samples.windows(2) {
        assert!(
            pair[1].1 <= pair[0].1 + 1e-12,
            "d {} -> {} raised score {} -> {}",
            pair[0].0,
            pair[1].0,
            pair[0].1,
            pair[1].1
        );
    }
}

#[test]
fn test_max_range_and_nan_readings_ignored() {
    let mut scanner = scanner();
    let pose = Pose2D::new(1.025, 1.525, 0.0);
    let wall = SensorObservation::planar(vec![Beam::new(2.95, 0.0)], 10.0);
    let noisy = SensorObservation::planar(
        vec![
            Beam::new(2.95, 0.0),
            Beam::new(10.0, 1.0),
            Beam::new(f64::NAN, 2.0),
        ],
        10.0,
    );
    assert_relative_eq!(
        scanner.score_pose(pose, &wall),
        scanner.score_pose(pose, &noisy),
        epsilon = 1e-12
    );
}

#[test]
fn test_degenerate_observation_leaves_weights() {
    let mut scanner = scanner();
    let mut set = particle_cloud(&true_pose(), 20, 0.1, 1);
    let before = weights(&set);

    let all_nan = SensorObservation::from_ranges(&[f64::NAN; 8], 0.0, 0.1, 10.0);
    assert!(!scanner.update(&mut set, &all_nan));
    let empty = SensorObservation::planar(Vec::new(), 10.0);
    assert!(!scanner.update(&mut set, &empty));

    assert_eq!(weights(&set), before);
}

#[test]
fn test_subsampling_caps_beam_count() {
    let mut scanner = scanner();
    scanner.set_max_beams(3);
    let pose = Pose2D::new(1.025, 1.525, 0.0);
    // Strided picks are beams 0, 3 and 6, all on the wall; the rest miss badly
    let mut beams = vec![Beam::new(0.3, 0.0); 9];
    for i in [0, 3, 6] {
        beams[i] = Beam::new(2.95, 0.0);
    }
    let obs = SensorObservation::planar(beams, 10.0);
    let per_beam = 0.95 * normal_pdf(0.0, 0.0, 0.2) + 0.005;
    assert_relative_eq!(scanner.score_pose(pose, &obs), per_beam.powi(3), epsilon = 1e-9);
}

#[test]
fn test_apply_is_idempotent() {
    let mut scanner = scanner();
    let map = room();
    let obs = synthetic_scan(&map, &true_pose(), 90);
    let set = particle_cloud(&true_pose(), 50, 0.2, 3);

    let mut first = set.clone();
    let mut second = set.clone();
    let total_a = scanner.apply_model_to_sample_set(&obs, &mut first);
    let total_b = scanner.apply_model_to_sample_set(&obs, &mut second);

    assert!(total_a > 0.0);
    assert_relative_eq!(total_a, total_b);
    assert_eq!(weights(&first), weights(&second));
}

#[test]
fn test_all_zero_weights_report_zero_total() {
    let mut scanner = scanner();
    scanner
        .set_map_factors(MapFactors {
            off_map_factor: 0.0,
            ..Default::default()
        })
        .unwrap();
    let obs = SensorObservation::planar(vec![Beam::new(1.0, 0.0)], 10.0);
    let mut set = ParticleSampleSet::from_poses([
        Pose2D::new(-5.0, 0.0, 0.0),
        Pose2D::new(20.0, 20.0, 1.0),
    ]);

    let total = scanner.apply_model_to_sample_set(&obs, &mut set);
    assert_eq!(total, 0.0);
    assert!(weights(&set).iter().all(|&w| w == 0.0));
}

#[test]
fn test_gompertz_reshapes_normalized_score() {
    let mut scanner = scanner();
    let gompertz = GompertzTransform {
        a: 1.0,
        b: 2.0,
        c: 6.0,
        input_shift: -0.5,
        input_scale: 1.0,
        output_shift: 0.01,
    };
    scanner
        .set_model_likelihood_field_gompertz(field(), gompertz)
        .unwrap();

    let map = room();
    let pose = true_pose();
    let obs = synthetic_scan(&map, &pose, 30);
    let beams = obs.subsampled_beams(90);
    let expected = gompertz.apply(likelihood::scan_score(
        &map, &pose, &beams, 10.0, &field(), true,
    ));

    let mut set = single(pose);
    assert!(scanner.update(&mut set, &obs));
    assert_relative_eq!(set.samples()[0].weight, expected, epsilon = 1e-12);
}
