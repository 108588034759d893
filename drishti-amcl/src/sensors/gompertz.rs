//! Gompertz reshaping of a particle's aggregate score.
//!
//! ```text
//! g(p) = a · exp(-b · exp(-c · (p · input_scale + input_shift))) + output_shift
//!
//!   g │            ___________  a + output_shift
//!     │          /
//!     │         /
//!     │   _____/               output_shift (asymptote as p → -∞)
//!     └──────────────────── p
//! ```
//!
//! With positive `a`, `b`, `c` and `input_scale` the curve is monotone
//! increasing, so pose ranking is preserved while the contrast between good
//! and mediocre poses is stretched.

use serde::{Deserialize, Serialize};

use super::params::non_negative;
use crate::error::ConfigError;

/// Six-coefficient Gompertz function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GompertzTransform {
    /// Upper asymptote above `output_shift`.
    #[serde(default = "default_a")]
    pub a: f64,
    /// Displacement along the input axis.
    #[serde(default = "default_b")]
    pub b: f64,
    /// Growth rate.
    #[serde(default = "default_c")]
    pub c: f64,
    #[serde(default)]
    pub input_shift: f64,
    #[serde(default = "default_input_scale")]
    pub input_scale: f64,
    #[serde(default)]
    pub output_shift: f64,
}

impl Default for GompertzTransform {
    fn default() -> Self {
        Self {
            a: default_a(),
            b: default_b(),
            c: default_c(),
            input_shift: 0.0,
            input_scale: default_input_scale(),
            output_shift: 0.0,
        }
    }
}

impl GompertzTransform {
    /// Reshape a score.
    #[inline]
    pub fn apply(&self, p: f64) -> f64 {
        let x = p * self.input_scale + self.input_shift;
        self.a * (-self.b * (-self.c * x).exp()).exp() + self.output_shift
    }

    /// Reject coefficients that can produce non-finite or negative weights.
    ///
    /// Monotonicity is left to the caller; only the lower bound of the curve
    /// is checked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("gompertz_a", self.a),
            ("gompertz_b", self.b),
            ("gompertz_c", self.c),
            ("gompertz_input_shift", self.input_shift),
            ("gompertz_input_scale", self.input_scale),
            ("gompertz_output_shift", self.output_shift),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::invalid(name, "must be finite"));
            }
        }
        non_negative("gompertz_a", self.a)?;
        non_negative("gompertz_b", self.b)?;
        non_negative("gompertz_output_shift", self.output_shift)
    }
}

fn default_a() -> f64 {
    1.0
}
fn default_b() -> f64 {
    1.0
}
fn default_c() -> f64 {
    1.0
}
fn default_input_scale() -> f64 {
    1.0
}
