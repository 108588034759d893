//! 3D point cloud scanner.
//!
//! Same likelihood-field scoring as the planar scanner, with points looked up
//! in a volumetric distance field. The scanner sits at `scanner_height` above
//! the floor and may be offset in the plane by `scanner_pose`.
//!
//! ```text
//! point (scanner frame) ──▶ rotate/translate by particle ∘ scanner_pose
//!                       ──▶ z + scanner_height
//!                       ──▶ distance_to_nearest_obstacle_3d
//! ```

use std::sync::Arc;

use log::{info, warn};

use super::gompertz::GompertzTransform;
use super::map_factor::{MapFactorAdjuster, MapFactors};
use super::params::{LikelihoodFieldParams, ModelType};
use super::{SensorModel, checked_total, likelihood};
use crate::core::{ParticleSampleSet, Point3D, Pose2D, SensorObservation};
use crate::error::ConfigError;
use crate::map::VolumetricField;

/// Models a point cloud scanner can run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointCloudModel {
    LikelihoodField(LikelihoodFieldParams),
    LikelihoodFieldGompertz {
        field: LikelihoodFieldParams,
        gompertz: GompertzTransform,
    },
}

impl PointCloudModel {
    pub fn model_type(&self) -> ModelType {
        match self {
            PointCloudModel::LikelihoodField(_) => ModelType::LikelihoodField,
            PointCloudModel::LikelihoodFieldGompertz { .. } => ModelType::LikelihoodFieldGompertz,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            PointCloudModel::LikelihoodField(field) => field.validate(),
            PointCloudModel::LikelihoodFieldGompertz { field, gompertz } => {
                field.validate()?;
                gompertz.validate()
            }
        }
    }
}

/// Sensor model for 3D point clouds.
#[derive(Debug)]
pub struct PointCloudScanner<M: ?Sized> {
    map: Arc<M>,
    model: Option<PointCloudModel>,
    scanner_pose: Pose2D,
    scanner_height: f64,
    max_points: usize,
    adjuster: MapFactorAdjuster,
}

impl<M: VolumetricField + ?Sized> PointCloudScanner<M> {
    pub fn new(max_points: usize, map: Arc<M>) -> Self {
        Self {
            map,
            model: None,
            scanner_pose: Pose2D::identity(),
            scanner_height: 0.0,
            max_points,
            adjuster: MapFactorAdjuster::default(),
        }
    }

    pub fn set_model_likelihood_field(
        &mut self,
        params: LikelihoodFieldParams,
    ) -> Result<(), ConfigError> {
        self.set_model(PointCloudModel::LikelihoodField(params))
    }

    pub fn set_model_likelihood_field_gompertz(
        &mut self,
        field: LikelihoodFieldParams,
        gompertz: GompertzTransform,
    ) -> Result<(), ConfigError> {
        self.set_model(PointCloudModel::LikelihoodFieldGompertz { field, gompertz })
    }

    pub fn set_model(&mut self, model: PointCloudModel) -> Result<(), ConfigError> {
        model.validate()?;
        info!("Point cloud scanner model set to {:?}", model.model_type());
        self.model = Some(model);
        Ok(())
    }

    pub fn model(&self) -> Option<&PointCloudModel> {
        self.model.as_ref()
    }

    pub fn set_map_factors(&mut self, factors: MapFactors) -> Result<(), ConfigError> {
        factors.validate()?;
        self.adjuster.set_factors(factors);
        Ok(())
    }

    pub fn set_global_localization(&mut self, active: bool) {
        self.adjuster.set_global_localization(active);
    }

    /// Planar mounting offset in the robot frame.
    pub fn set_scanner_pose(&mut self, pose: Pose2D) {
        self.scanner_pose = pose;
    }

    /// Height of the scanner origin above the map floor (meters).
    pub fn set_scanner_height(&mut self, height: f64) {
        self.scanner_height = height;
    }

    pub fn scanner_height(&self) -> f64 {
        self.scanner_height
    }

    pub fn set_max_points(&mut self, max_points: usize) {
        self.max_points = max_points;
    }

    pub fn set_map(&mut self, map: Arc<M>) {
        self.map = map;
    }

    fn usable_points(&self, observation: &SensorObservation) -> Option<Vec<Point3D>> {
        if self.model.is_none() {
            return None;
        }
        if observation.points().is_none() {
            warn!("Point cloud scanner received a planar observation, ignoring");
            return None;
        }
        let points = observation.subsampled_points(self.max_points);
        (!points.is_empty()).then_some(points)
    }

    fn weigh(
        &self,
        model: PointCloudModel,
        points: &[Point3D],
        range_max: f64,
        sample_set: &mut ParticleSampleSet,
    ) -> f64 {
        let map: &M = &self.map;
        let adjuster = &self.adjuster;
        let scanner_pose = self.scanner_pose;
        let height = self.scanner_height;

        let score = |pose: &Pose2D, field: &LikelihoodFieldParams, normalized: bool| {
            let sensor = pose.compose(&scanner_pose);
            let distances = points
                .iter()
                .filter(|p| likelihood::is_scored(p.norm(), range_max))
                .map(|p| {
                    let planar = sensor.transform_point(&p.xy());
                    let world = Point3D::new(planar.x, planar.y, p.z + height);
                    map.distance_to_nearest_obstacle_3d(world)
                        .min(field.max_occ_dist)
                });
            likelihood::log_likelihood(distances, range_max, field, normalized).exp()
                * adjuster.factor(map, pose.position())
        };

        let total = match model {
            PointCloudModel::LikelihoodField(field) => {
                sample_set.reweight(|_, pose| score(pose, &field, false))
            }
            PointCloudModel::LikelihoodFieldGompertz { field, gompertz } => {
                sample_set.reweight(|_, pose| gompertz.apply(score(pose, &field, true)))
            }
        };

        checked_total(total, sample_set.len())
    }
}

impl<M: VolumetricField + ?Sized> SensorModel for PointCloudScanner<M> {
    fn update(
        &mut self,
        sample_set: &mut ParticleSampleSet,
        observation: &SensorObservation,
    ) -> bool {
        let (Some(model), Some(points)) = (self.model, self.usable_points(observation)) else {
            return false;
        };
        self.weigh(model, &points, observation.range_max(), sample_set);
        true
    }

    fn apply_model_to_sample_set(
        &mut self,
        observation: &SensorObservation,
        sample_set: &mut ParticleSampleSet,
    ) -> f64 {
        match (self.model, self.usable_points(observation)) {
            (Some(model), Some(points)) => {
                self.weigh(model, &points, observation.range_max(), sample_set)
            }
            _ => checked_total(sample_set.total_weight(), sample_set.len()),
        }
    }
}
