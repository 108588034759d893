//! Likelihood field scoring.
//!
//! Beam endpoints are projected from the sensor pose and looked up in the
//! precomputed obstacle distance field, so no ray casting is needed:
//!
//! ```text
//! p(d) = z_hit · N(d; 0, σ_hit) + z_rand / range_max
//!
//! normalized:  p(d) / p(0)        ∈ (0, 1]
//! ```
//!
//! Per-beam probabilities are summed in log space, in beam order, and
//! exponentiated once per particle.

use super::params::LikelihoodFieldParams;
use crate::core::math::normal_pdf;
use crate::core::{Beam, Pose2D};
use crate::map::DistanceField;

/// Density of the uniform random-reading component.
#[inline]
pub(crate) fn uniform_density(z_rand: f64, range_max: f64) -> f64 {
    if range_max > 0.0 { z_rand / range_max } else { 0.0 }
}

/// Whether a reading contributes to the field score. Max-range and
/// non-finite readings carry no endpoint information.
#[inline]
pub fn is_scored(range: f64, range_max: f64) -> bool {
    range.is_finite() && range < range_max
}

/// Per-beam probability at obstacle distance `d`.
#[inline]
pub fn field_probability(d: f64, range_max: f64, params: &LikelihoodFieldParams) -> f64 {
    params.z_hit * normal_pdf(d, 0.0, params.sigma_hit) + uniform_density(params.z_rand, range_max)
}

/// Per-beam probability scaled so that a beam ending on an obstacle scores 1.
#[inline]
pub fn normalized_field_probability(d: f64, range_max: f64, params: &LikelihoodFieldParams) -> f64 {
    let peak = field_probability(0.0, range_max, params);
    if peak > 0.0 {
        field_probability(d, range_max, params) / peak
    } else {
        0.0
    }
}

/// Clamped obstacle distance of a beam endpoint seen from `sensor`.
#[inline]
pub fn endpoint_distance<M: DistanceField + ?Sized>(
    map: &M,
    sensor: &Pose2D,
    beam: &Beam,
    max_occ_dist: f64,
) -> f64 {
    let endpoint = sensor.project(beam.range, beam.bearing);
    map.distance_to_nearest_obstacle(endpoint).min(max_occ_dist)
}

/// Sum of log-probabilities over endpoint distances.
pub fn log_likelihood(
    distances: impl IntoIterator<Item = f64>,
    range_max: f64,
    params: &LikelihoodFieldParams,
    normalized: bool,
) -> f64 {
    distances
        .into_iter()
        .map(|d| {
            let p = if normalized {
                normalized_field_probability(d, range_max, params)
            } else {
                field_probability(d, range_max, params)
            };
            p.ln()
        })
        .sum()
}

/// Field score of a planar scan seen from `sensor`, without map factor.
pub fn scan_score<M: DistanceField + ?Sized>(
    map: &M,
    sensor: &Pose2D,
    beams: &[Beam],
    range_max: f64,
    params: &LikelihoodFieldParams,
    normalized: bool,
) -> f64 {
    let distances = beams
        .iter()
        .filter(|beam| is_scored(beam.range, range_max))
        .map(|beam| endpoint_distance(map, sensor, beam, params.max_occ_dist));
    log_likelihood(distances, range_max, params, normalized).exp()
}
