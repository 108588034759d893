//! Test utilities for drishti-amcl integration tests.
//!
//! Builds rooms, synthetic scans and particle clouds.

#![allow(dead_code)]

use std::sync::Arc;

use drishti_amcl::core::{
    Beam, ParticleSample, ParticleSampleSet, Point2D, Point3D, Pose2D, SensorObservation,
};
use drishti_amcl::map::{OccupancyMap, RangeCaster, VoxelMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const RESOLUTION: f64 = 0.05;
pub const RANGE_MAX: f64 = 10.0;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// ASCII rows for a walled rectangle of `width` x `height` cells.
pub fn room_rows(width: usize, height: usize) -> Vec<String> {
    (0..height)
        .map(|row| {
            if row == 0 || row == height - 1 {
                "#".repeat(width)
            } else {
                format!("#{}#", ".".repeat(width - 2))
            }
        })
        .collect()
}

/// 4m x 3m walled room with a pillar, so poses are distinguishable.
pub fn room() -> OccupancyMap {
    let mut rows = room_rows(80, 60);
    // 0.5m square pillar centered on (2.75, 1.0)
    for row in rows.iter_mut().skip(35).take(10) {
        row.replace_range(50..60, &"#".repeat(10));
    }
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    OccupancyMap::from_ascii(&refs, RESOLUTION, Point2D::new(0.0, 0.0), 1.0)
        .expect("room map")
}

pub fn shared_room() -> Arc<OccupancyMap> {
    Arc::new(room())
}

/// The room extruded to 1m tall.
pub fn voxel_room() -> Arc<VoxelMap> {
    Arc::new(VoxelMap::extrude(&room(), 20, 0.0).expect("voxel room"))
}

/// Pose at the center of a free cell, facing +X.
pub fn true_pose() -> Pose2D {
    Pose2D::new(1.025, 1.525, 0.3)
}

/// Noise-free scan as a perfect sensor at `pose` would report it.
pub fn synthetic_scan<M: RangeCaster>(map: &M, pose: &Pose2D, beams: usize) -> SensorObservation {
    let increment = std::f64::consts::TAU / beams as f64;
    let ranges: Vec<Beam> = (0..beams)
        .map(|i| {
            let bearing = -std::f64::consts::PI + i as f64 * increment;
            let range = map.cast_range(pose.position(), pose.theta + bearing, RANGE_MAX);
            Beam::new(range, bearing)
        })
        .collect();
    SensorObservation::planar(ranges, RANGE_MAX)
}

/// Point cloud of wall hits at several scanner-frame heights.
pub fn synthetic_cloud<M: RangeCaster>(
    map: &M,
    pose: &Pose2D,
    beams: usize,
    heights: &[f64],
) -> SensorObservation {
    let mut points = Vec::new();
    let increment = std::f64::consts::TAU / beams as f64;
    for i in 0..beams {
        let bearing = -std::f64::consts::PI + i as f64 * increment;
        let range = map.cast_range(pose.position(), pose.theta + bearing, RANGE_MAX);
        if range >= RANGE_MAX {
            continue;
        }
        for &z in heights {
            points.push(Point3D::new(range * bearing.cos(), range * bearing.sin(), z));
        }
    }
    SensorObservation::point_cloud(points, RANGE_MAX)
}

/// Particles scattered uniformly within `spread` meters / radians of `center`.
pub fn particle_cloud(center: &Pose2D, n: usize, spread: f64, seed: u64) -> ParticleSampleSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let poses = (0..n).map(|_| {
        Pose2D::new(
            center.x + rng.random_range(-spread..spread),
            center.y + rng.random_range(-spread..spread),
            center.theta + rng.random_range(-spread..spread),
        )
    });
    let mut set = ParticleSampleSet::from_poses(poses.collect::<Vec<_>>());
    set.set_converged(true);
    set
}

/// One particle at `pose` with unit weight.
pub fn single(pose: Pose2D) -> ParticleSampleSet {
    ParticleSampleSet::new(vec![ParticleSample::new(pose)])
}

pub fn weights(set: &ParticleSampleSet) -> Vec<f64> {
    set.samples().iter().map(|s| s.weight).collect()
}
