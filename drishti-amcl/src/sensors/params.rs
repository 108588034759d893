//! Model parameter sets and the closed set of planar models.

use serde::{Deserialize, Serialize};

use super::gompertz::GompertzTransform;
use crate::error::ConfigError;

/// Allowed deviation of a mixture's weights from 1.
pub const MIXTURE_TOLERANCE: f64 = 1e-3;

/// Which planar model a scanner runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Beam,
    #[default]
    LikelihoodField,
    LikelihoodFieldProb,
    LikelihoodFieldGompertz,
}

/// Physical beam mixture parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamParams {
    /// Weight of the Gaussian around the expected range.
    /// Typical: 0.8
    #[serde(default = "default_beam_z_hit")]
    pub z_hit: f64,

    /// Weight of unexpected short readings (people, clutter).
    /// Typical: 0.1
    #[serde(default = "default_z_short")]
    pub z_short: f64,

    /// Weight of max-range readings.
    /// Typical: 0.05
    #[serde(default = "default_z_max")]
    pub z_max: f64,

    /// Weight of uniformly random readings.
    /// Typical: 0.05
    #[serde(default = "default_z_rand")]
    pub z_rand: f64,

    /// Standard deviation of the hit component (meters).
    #[serde(default = "default_sigma_hit")]
    pub sigma_hit: f64,

    /// Decay rate of the short component (1/m).
    #[serde(default = "default_lambda_short")]
    pub lambda_short: f64,
}

impl Default for BeamParams {
    fn default() -> Self {
        Self {
            z_hit: default_beam_z_hit(),
            z_short: default_z_short(),
            z_max: default_z_max(),
            z_rand: default_z_rand(),
            sigma_hit: default_sigma_hit(),
            lambda_short: default_lambda_short(),
        }
    }
}

impl BeamParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("z_hit", self.z_hit)?;
        non_negative("z_short", self.z_short)?;
        non_negative("z_max", self.z_max)?;
        non_negative("z_rand", self.z_rand)?;
        positive("sigma_hit", self.sigma_hit)?;
        non_negative("lambda_short", self.lambda_short)?;
        mixture_sum(self.z_hit + self.z_short + self.z_max + self.z_rand)
    }
}

/// Likelihood field parameters, shared by all three field variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodFieldParams {
    /// Weight of the Gaussian around the nearest obstacle.
    #[serde(default = "default_field_z_hit")]
    pub z_hit: f64,

    /// Weight of uniformly random readings.
    #[serde(default = "default_z_rand")]
    pub z_rand: f64,

    /// Standard deviation of the hit component (meters).
    #[serde(default = "default_sigma_hit")]
    pub sigma_hit: f64,

    /// Obstacle distances are clamped here (meters).
    #[serde(default = "default_max_occ_dist")]
    pub max_occ_dist: f64,
}

impl Default for LikelihoodFieldParams {
    fn default() -> Self {
        Self {
            z_hit: default_field_z_hit(),
            z_rand: default_z_rand(),
            sigma_hit: default_sigma_hit(),
            max_occ_dist: default_max_occ_dist(),
        }
    }
}

impl LikelihoodFieldParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("z_hit", self.z_hit)?;
        non_negative("z_rand", self.z_rand)?;
        positive("sigma_hit", self.sigma_hit)?;
        non_negative("max_occ_dist", self.max_occ_dist)?;
        mixture_sum(self.z_hit + self.z_rand)
    }
}

/// Adaptive beam skipping controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSkipParams {
    #[serde(default)]
    pub do_beamskip: bool,

    /// Endpoint obstacle distance below which a particle agrees with a beam (meters).
    #[serde(default = "default_beam_skip_distance")]
    pub beam_skip_distance: f64,

    /// Fraction of agreeing particles a beam needs to be kept.
    #[serde(default = "default_beam_skip_threshold")]
    pub beam_skip_threshold: f64,

    /// Skipped fraction at which skipping is abandoned for the cycle.
    #[serde(default = "default_beam_skip_error_threshold")]
    pub beam_skip_error_threshold: f64,
}

impl Default for BeamSkipParams {
    fn default() -> Self {
        Self {
            do_beamskip: false,
            beam_skip_distance: default_beam_skip_distance(),
            beam_skip_threshold: default_beam_skip_threshold(),
            beam_skip_error_threshold: default_beam_skip_error_threshold(),
        }
    }
}

impl BeamSkipParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("beam_skip_distance", self.beam_skip_distance)?;
        unit_interval("beam_skip_threshold", self.beam_skip_threshold)?;
        unit_interval("beam_skip_error_threshold", self.beam_skip_error_threshold)
    }
}

/// The active planar model together with its parameters.
///
/// Exactly one model is active per scanner; selecting another replaces it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanarModel {
    Beam(BeamParams),
    LikelihoodField(LikelihoodFieldParams),
    LikelihoodFieldProb {
        field: LikelihoodFieldParams,
        skip: BeamSkipParams,
    },
    LikelihoodFieldGompertz {
        field: LikelihoodFieldParams,
        gompertz: GompertzTransform,
    },
}

impl PlanarModel {
    pub fn model_type(&self) -> ModelType {
        match self {
            PlanarModel::Beam(_) => ModelType::Beam,
            PlanarModel::LikelihoodField(_) => ModelType::LikelihoodField,
            PlanarModel::LikelihoodFieldProb { .. } => ModelType::LikelihoodFieldProb,
            PlanarModel::LikelihoodFieldGompertz { .. } => ModelType::LikelihoodFieldGompertz,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            PlanarModel::Beam(params) => params.validate(),
            PlanarModel::LikelihoodField(field) => field.validate(),
            PlanarModel::LikelihoodFieldProb { field, skip } => {
                field.validate()?;
                skip.validate()
            }
            PlanarModel::LikelihoodFieldGompertz { field, gompertz } => {
                field.validate()?;
                gompertz.validate()
            }
        }
    }
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("must be finite and >= 0, got {value}")))
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("must be finite and > 0, got {value}")))
    }
}

pub(crate) fn unit_interval(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("must lie in [0, 1], got {value}")))
    }
}

fn mixture_sum(sum: f64) -> Result<(), ConfigError> {
    if (sum - 1.0).abs() <= MIXTURE_TOLERANCE {
        Ok(())
    } else {
        Err(ConfigError::MixtureSum(sum))
    }
}

// Default value functions
fn default_beam_z_hit() -> f64 {
    0.8
}
fn default_field_z_hit() -> f64 {
    0.95
}
fn default_z_short() -> f64 {
    0.1
}
fn default_z_max() -> f64 {
    0.05
}
fn default_z_rand() -> f64 {
    0.05
}
fn default_sigma_hit() -> f64 {
    0.2
}
fn default_lambda_short() -> f64 {
    0.1
}
fn default_max_occ_dist() -> f64 {
    2.0
}
fn default_beam_skip_distance() -> f64 {
    0.5
}
fn default_beam_skip_threshold() -> f64 {
    0.3
}
fn default_beam_skip_error_threshold() -> f64 {
    0.9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        BeamParams::default().validate().unwrap();
        LikelihoodFieldParams::default().validate().unwrap();
        BeamSkipParams::default().validate().unwrap();
    }

    #[test]
    fn test_mixture_must_sum_to_one() {
        let params = BeamParams {
            z_hit: 0.95,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(ConfigError::MixtureSum(_))));

        let field = LikelihoodFieldParams {
            z_rand: 0.5,
            ..Default::default()
        };
        assert!(matches!(field.validate(), Err(ConfigError::MixtureSum(_))));
    }

    #[test]
    fn test_negative_sigma_rejected() {
        let field = LikelihoodFieldParams {
            sigma_hit: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            field.validate(),
            Err(ConfigError::InvalidParameter { name: "sigma_hit", .. })
        ));
    }

    #[test]
    fn test_skip_thresholds_bounded() {
        let skip = BeamSkipParams {
            beam_skip_threshold: 1.5,
            ..Default::default()
        };
        assert!(skip.validate().is_err());
    }

    #[test]
    fn test_model_type_tags() {
        let model = PlanarModel::LikelihoodFieldProb {
            field: LikelihoodFieldParams::default(),
            skip: BeamSkipParams::default(),
        };
        assert_eq!(model.model_type(), ModelType::LikelihoodFieldProb);
        assert_eq!(
            PlanarModel::Beam(BeamParams::default()).model_type(),
            ModelType::Beam
        );
    }
}
