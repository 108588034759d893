//! Sensor observations handed to the scanners.
//!
//! A [`SensorObservation`] is built once per cycle from the raw driver output
//! and stays immutable while every particle is scored against it.
//!
//! ```text
//! planar:  [(range, bearing), (range, bearing), ...]  + range_max
//! cloud:   [(x, y, z), (x, y, z), ...]                + range_max
//! ```

use serde::{Deserialize, Serialize};

use super::pose::Point3D;

/// One planar range reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Measured range in meters (NaN = no reading)
    pub range: f64,
    /// Bearing in the scanner frame, radians CCW from +X
    pub bearing: f64,
}

impl Beam {
    #[inline]
    pub fn new(range: f64, bearing: f64) -> Self {
        Self { range, bearing }
    }
}

/// Payload of an observation.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationData {
    /// Planar scan as (range, bearing) tuples, in scan order.
    Beams(Vec<Beam>),
    /// 3D points in the scanner frame.
    Points(Vec<Point3D>),
}

/// A normalized range-sensor reading for one update cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorObservation {
    data: ObservationData,
    range_max: f64,
}

impl SensorObservation {
    /// Planar observation from (range, bearing) tuples.
    pub fn planar(beams: Vec<Beam>, range_max: f64) -> Self {
        Self {
            data: ObservationData::Beams(beams),
            range_max,
        }
    }

    /// Planar observation from a uniformly spaced range array.
    pub fn from_ranges(
        ranges: &[f64],
        angle_min: f64,
        angle_increment: f64,
        range_max: f64,
    ) -> Self {
        let beams = ranges
            .iter()
            .enumerate()
            .map(|(i, &range)| Beam::new(range, angle_min + i as f64 * angle_increment))
            .collect();
        Self::planar(beams, range_max)
    }

    /// Point cloud observation.
    pub fn point_cloud(points: Vec<Point3D>, range_max: f64) -> Self {
        Self {
            data: ObservationData::Points(points),
            range_max,
        }
    }

    /// Maximum sensor range in meters.
    #[inline]
    pub fn range_max(&self) -> f64 {
        self.range_max
    }

    #[inline]
    pub fn data(&self) -> &ObservationData {
        &self.data
    }

    /// Planar beams, or `None` for a point cloud.
    pub fn beams(&self) -> Option<&[Beam]> {
        match &self.data {
            ObservationData::Beams(beams) => Some(beams),
            ObservationData::Points(_) => None,
        }
    }

    /// Cloud points, or `None` for a planar scan.
    pub fn points(&self) -> Option<&[Point3D]> {
        match &self.data {
            ObservationData::Points(points) => Some(points),
            ObservationData::Beams(_) => None,
        }
    }

    /// Number of raw readings.
    pub fn len(&self) -> usize {
        match &self.data {
            ObservationData::Beams(beams) => beams.len(),
            ObservationData::Points(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Beams retained for scoring: an even-stride subsample capped at
    /// `max_beams`, with NaN ranges dropped.
    ///
    /// Returns an empty vector for point clouds.
    pub fn subsampled_beams(&self, max_beams: usize) -> Vec<Beam> {
        self.beams()
            .map(|beams| {
                subsample(beams, max_beams)
                    .filter(|beam| !beam.range.is_nan())
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Points retained for scoring, subsampled like [`subsampled_beams`](Self::subsampled_beams).
    pub fn subsampled_points(&self, max_points: usize) -> Vec<Point3D> {
        self.points()
            .map(|points| {
                subsample(points, max_points)
                    .filter(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Stride that spreads `max` selections evenly over `count` readings.
///
/// ```text
/// count = 10, max = 3  →  step 3  →  indices 0, 3, 6
/// count = 4,  max = 8  →  step 1  →  indices 0, 1, 2, 3
/// ```
#[inline]
pub fn subsample_step(count: usize, max: usize) -> usize {
    if max == 0 { 1 } else { (count / max).max(1) }
}

fn subsample<T>(items: &[T], max: usize) -> impl Iterator<Item = &T> {
    items
        .iter()
        .step_by(subsample_step(items.len(), max))
        .take(max)
}
