//! Physical beam mixture model.
//!
//! Each measured range `z` is compared against the range `z*` a perfect
//! sensor would report, found by casting a ray through the map:
//!
//! | Component | Density | Active when |
//! |-----------|---------|-------------|
//! | hit | `z_hit · N(z; z*, σ_hit)` | `z < range_max` |
//! | short | `z_short · η · λ · exp(-λ z)` | `z < z*` |
//! | max | `z_max` | `z ≥ range_max` |
//! | rand | `z_rand / range_max` | `z < range_max` |
//!
//! with `η = 1 / (1 - exp(-λ z*))` truncating the exponential to `[0, z*]`.
//! This is the most expensive model (one ray cast per beam per particle).

use super::likelihood::uniform_density;
use super::params::BeamParams;
use crate::core::math::normal_pdf;
use crate::core::{Beam, Pose2D};
use crate::map::RangeCaster;

/// Mixture density of one reading.
pub fn beam_probability(z: f64, z_star: f64, range_max: f64, params: &BeamParams) -> f64 {
    if z >= range_max {
        return params.z_max;
    }

    let mut p = params.z_hit * normal_pdf(z, z_star, params.sigma_hit)
        + uniform_density(params.z_rand, range_max);

    if z < z_star && z_star > 0.0 {
        let lambda = params.lambda_short;
        p += if lambda > 0.0 {
            let eta = 1.0 / (1.0 - (-lambda * z_star).exp());
            params.z_short * eta * lambda * (-lambda * z).exp()
        } else {
            // λ → 0 limit: uniform over [0, z*]
            params.z_short / z_star
        };
    }

    p
}

/// Sum of log-densities over the scan seen from `sensor`.
pub fn log_likelihood<M: RangeCaster + ?Sized>(
    map: &M,
    sensor: &Pose2D,
    beams: &[Beam],
    range_max: f64,
    params: &BeamParams,
) -> f64 {
    beams
        .iter()
        .map(|beam| {
            let bearing = sensor.theta + beam.bearing;
            let z_star = map.cast_range(sensor.position(), bearing, range_max);
            beam_probability(beam.range, z_star, range_max, params).ln()
        })
        .sum()
}
