//! Numeric primitives shared by the sensor models.
//!
//! Angle wrapping plus the Gaussian density used by every hit component.

use std::f64::consts::{PI, TAU};

/// Normalize angle to [-π, π].
///
/// # Example
/// ```
/// use drishti_amcl::core::math::normalize_angle;
/// use std::f64::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-9);
/// assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-9);
/// ```
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}

/// Gaussian probability density of `x` under `Normal(mean, std_dev)`.
///
/// ```text
/// N(x; μ, σ) = exp(-(x - μ)² / 2σ²) / (σ √(2π))
/// ```
#[inline]
pub fn normal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    let z = (x - mean) / std_dev;
    (-0.5 * z * z).exp() / (std_dev * TAU.sqrt())
}
