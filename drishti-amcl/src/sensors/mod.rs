//! Sensor models that turn one observation into particle weight updates.
//!
//! | Model | Scoring | Map factor | Extras |
//! |-------|---------|------------|--------|
//! | `Beam` | ray-cast mixture | no | |
//! | `LikelihoodField` | endpoint distance | yes | |
//! | `LikelihoodFieldProb` | normalized endpoint distance | yes | beam skipping |
//! | `LikelihoodFieldGompertz` | normalized endpoint distance | yes | Gompertz reshaping |
//!
//! [`PlanarScanner`] runs all four on 2D scans. [`PointCloudScanner`] runs the
//! likelihood-field and Gompertz variants on 3D clouds.
//!
//! Scoring itself is stateless: the free functions in [`beam`] and
//! [`likelihood`] take an observation, a pose and parameters. The scanners
//! only own configuration and the beam-skip arena.

pub mod beam;
mod beam_skip;
mod gompertz;
pub mod likelihood;
mod map_factor;
mod params;
mod planar;
mod point_cloud;

pub use beam_skip::{BeamMask, BeamSkipTracker};
pub use gompertz::GompertzTransform;
pub use map_factor::{MapFactorAdjuster, MapFactors};
pub use params::{
    BeamParams, BeamSkipParams, LikelihoodFieldParams, MIXTURE_TOLERANCE, ModelType, PlanarModel,
};
pub use planar::PlanarScanner;
pub use point_cloud::{PointCloudModel, PointCloudScanner};

use crate::core::{ParticleSample, ParticleSampleSet, Pose2D, SensorObservation};

/// Contract every scanner offers to the filter.
pub trait SensorModel {
    /// Multiply each particle's weight by the likelihood of `observation`.
    ///
    /// Returns `false` and leaves the weights untouched when no model is
    /// configured, the observation is of the wrong kind, or no reading is
    /// usable.
    fn update(&mut self, sample_set: &mut ParticleSampleSet, observation: &SensorObservation)
    -> bool;

    /// Apply the active model and return the new weight total.
    ///
    /// Returns 0.0 when every particle ended at zero weight, which tells the
    /// caller localization has failed.
    fn apply_model_to_sample_set(
        &mut self,
        observation: &SensorObservation,
        sample_set: &mut ParticleSampleSet,
    ) -> f64;

    /// Score a single pose, e.g. to rank candidate poses.
    ///
    /// Returns 0.0 when the observation cannot be scored.
    fn score_pose(&mut self, pose: Pose2D, observation: &SensorObservation) -> f64 {
        let mut set = ParticleSampleSet::new(vec![ParticleSample::new(pose)]);
        if !self.update(&mut set, observation) {
            return 0.0;
        }
        set.samples().first().map_or(0.0, |s| s.weight)
    }
}

/// Clamp an update's total to the reporting contract.
pub(crate) fn checked_total(total: f64, sample_count: usize) -> f64 {
    if total.is_nan() || total <= 0.0 {
        if sample_count > 0 {
            log::warn!("All {} particles have zero weight after sensor update", sample_count);
        }
        0.0
    } else {
        total
    }
}
