//! Configuration loading for drishti-amcl.
//!
//! One TOML file configures a scanner end to end. Every key is optional.
//!
//! | Section | Contents |
//! |---------|----------|
//! | `[scanner]` | beam cap, mounting offset, height |
//! | `[model]` | which model to run |
//! | `[beam]` | beam mixture weights |
//! | `[likelihood]` | likelihood field weights and clamp |
//! | `[beam_skip]` | adaptive skipping controls |
//! | `[gompertz]` | reshaping coefficients |
//! | `[map_factors]` | off-map and non-free-space penalties |
//!
//! ```toml
//! [scanner]
//! max_beams = 60
//! offset_x = 0.12
//!
//! [model]
//! type = "likelihood_field_prob"
//!
//! [likelihood]
//! z_hit = 0.95
//! z_rand = 0.05
//! sigma_hit = 0.2
//!
//! [beam_skip]
//! do_beamskip = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Pose2D;
use crate::error::ConfigError;
use crate::map::{DistanceField, RangeCaster, VolumetricField};
use crate::sensors::{
    BeamParams, BeamSkipParams, GompertzTransform, LikelihoodFieldParams, MapFactors, ModelType,
    PlanarModel, PlanarScanner, PointCloudModel, PointCloudScanner,
};

/// Complete scanner configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AmclConfig {
    #[serde(default)]
    pub scanner: ScannerSection,
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub beam: BeamParams,
    #[serde(default)]
    pub likelihood: LikelihoodFieldParams,
    #[serde(default)]
    pub beam_skip: BeamSkipParams,
    #[serde(default)]
    pub gompertz: GompertzTransform,
    #[serde(default)]
    pub map_factors: MapFactors,
}

/// Scanner geometry and subsampling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScannerSection {
    /// Beams (or points) scored per observation (default: 60)
    #[serde(default = "default_max_beams")]
    pub max_beams: usize,

    /// Mounting offset in the robot frame (meters, radians)
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default)]
    pub offset_theta: f64,

    /// Height above the floor, point cloud scanners only (meters)
    #[serde(default)]
    pub height: f64,
}

impl Default for ScannerSection {
    fn default() -> Self {
        Self {
            max_beams: default_max_beams(),
            offset_x: 0.0,
            offset_y: 0.0,
            offset_theta: 0.0,
            height: 0.0,
        }
    }
}

/// Model selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSection {
    #[serde(rename = "type", default)]
    pub model_type: ModelType,
}

impl AmclConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Parse from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Scanner mounting offset as a pose.
    pub fn scanner_pose(&self) -> Pose2D {
        Pose2D::new(
            self.scanner.offset_x,
            self.scanner.offset_y,
            self.scanner.offset_theta,
        )
    }

    /// The planar model selected by `[model]`, with its parameter sections.
    pub fn to_planar_model(&self) -> PlanarModel {
        match self.model.model_type {
            ModelType::Beam => PlanarModel::Beam(self.beam),
            ModelType::LikelihoodField => PlanarModel::LikelihoodField(self.likelihood),
            ModelType::LikelihoodFieldProb => PlanarModel::LikelihoodFieldProb {
                field: self.likelihood,
                skip: self.beam_skip,
            },
            ModelType::LikelihoodFieldGompertz => PlanarModel::LikelihoodFieldGompertz {
                field: self.likelihood,
                gompertz: self.gompertz,
            },
        }
    }

    /// The point cloud model selected by `[model]`.
    ///
    /// Fails for models that need ray casting or beam skipping.
    pub fn to_point_cloud_model(&self) -> Result<PointCloudModel, ConfigError> {
        match self.model.model_type {
            ModelType::LikelihoodField => Ok(PointCloudModel::LikelihoodField(self.likelihood)),
            ModelType::LikelihoodFieldGompertz => Ok(PointCloudModel::LikelihoodFieldGompertz {
                field: self.likelihood,
                gompertz: self.gompertz,
            }),
            other => Err(ConfigError::UnsupportedModel(other)),
        }
    }

    /// Configure a planar scanner. Nothing is changed if validation fails.
    pub fn apply<M>(&self, scanner: &mut PlanarScanner<M>) -> Result<(), ConfigError>
    where
        M: DistanceField + RangeCaster + ?Sized,
    {
        let model = self.to_planar_model();
        model.validate()?;
        self.map_factors.validate()?;

        scanner.set_model(model)?;
        scanner.set_map_factors(self.map_factors)?;
        scanner.set_scanner_pose(self.scanner_pose());
        scanner.set_max_beams(self.scanner.max_beams);
        Ok(())
    }

    /// Configure a point cloud scanner. Nothing is changed if validation fails.
    pub fn apply_point_cloud<M>(&self, scanner: &mut PointCloudScanner<M>) -> Result<(), ConfigError>
    where
        M: VolumetricField + ?Sized,
    {
        let model = self.to_point_cloud_model()?;
        model.validate()?;
        self.map_factors.validate()?;

        scanner.set_model(model)?;
        scanner.set_map_factors(self.map_factors)?;
        scanner.set_scanner_pose(self.scanner_pose());
        scanner.set_scanner_height(self.scanner.height);
        scanner.set_max_points(self.scanner.max_beams);
        Ok(())
    }
}

fn default_max_beams() -> usize {
    60
}
