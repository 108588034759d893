//! Planar range scanner.
//!
//! Scores 2D scans with whichever [`PlanarModel`] was configured last.
//!
//! ```text
//! particle pose ──compose──▶ sensor pose ──project──▶ endpoints ──▶ map
//!                   ▲
//!             scanner_pose (mounting offset)
//! ```

use std::sync::Arc;

use log::{info, warn};

use super::beam_skip::BeamSkipTracker;
use super::gompertz::GompertzTransform;
use super::map_factor::{MapFactorAdjuster, MapFactors};
use super::params::{BeamParams, BeamSkipParams, LikelihoodFieldParams, PlanarModel};
use super::{SensorModel, beam, checked_total, likelihood};
use crate::core::{Beam, ParticleSampleSet, Pose2D, SensorObservation};
use crate::error::ConfigError;
use crate::map::{DistanceField, RangeCaster};

/// Sensor model for 2D laser scans.
///
/// Holds a shared handle to the map; call [`set_map`](Self::set_map) when the
/// map is replaced.
#[derive(Debug)]
pub struct PlanarScanner<M: ?Sized> {
    map: Arc<M>,
    model: Option<PlanarModel>,
    scanner_pose: Pose2D,
    max_beams: usize,
    adjuster: MapFactorAdjuster,
    tracker: BeamSkipTracker,
}

impl<M: DistanceField + RangeCaster + ?Sized> PlanarScanner<M> {
    /// Create a scanner with no model selected.
    pub fn new(max_beams: usize, map: Arc<M>) -> Self {
        Self {
            map,
            model: None,
            scanner_pose: Pose2D::identity(),
            max_beams,
            adjuster: MapFactorAdjuster::default(),
            tracker: BeamSkipTracker::new(),
        }
    }

    pub fn set_model_beam(&mut self, params: BeamParams) -> Result<(), ConfigError> {
        self.set_model(PlanarModel::Beam(params))
    }

    pub fn set_model_likelihood_field(
        &mut self,
        params: LikelihoodFieldParams,
    ) -> Result<(), ConfigError> {
        self.set_model(PlanarModel::LikelihoodField(params))
    }

    pub fn set_model_likelihood_field_prob(
        &mut self,
        field: LikelihoodFieldParams,
        skip: BeamSkipParams,
    ) -> Result<(), ConfigError> {
        self.set_model(PlanarModel::LikelihoodFieldProb { field, skip })
    }

    pub fn set_model_likelihood_field_gompertz(
        &mut self,
        field: LikelihoodFieldParams,
        gompertz: GompertzTransform,
    ) -> Result<(), ConfigError> {
        self.set_model(PlanarModel::LikelihoodFieldGompertz { field, gompertz })
    }

    /// Validate and activate `model`, replacing any previous one.
    ///
    /// On error the previous model stays active.
    pub fn set_model(&mut self, model: PlanarModel) -> Result<(), ConfigError> {
        model.validate()?;
        info!("Planar scanner model set to {:?}", model.model_type());
        self.model = Some(model);
        Ok(())
    }

    pub fn model(&self) -> Option<&PlanarModel> {
        self.model.as_ref()
    }

    pub fn set_map_factors(&mut self, factors: MapFactors) -> Result<(), ConfigError> {
        factors.validate()?;
        self.adjuster.set_factors(factors);
        Ok(())
    }

    pub fn map_factors(&self) -> &MapFactors {
        self.adjuster.factors()
    }

    /// Switch the map factors to their global-localization overrides.
    pub fn set_global_localization(&mut self, active: bool) {
        self.adjuster.set_global_localization(active);
    }

    /// Mounting offset of the scanner in the robot frame.
    pub fn set_scanner_pose(&mut self, pose: Pose2D) {
        self.scanner_pose = pose;
    }

    pub fn scanner_pose(&self) -> Pose2D {
        self.scanner_pose
    }

    pub fn set_max_beams(&mut self, max_beams: usize) {
        self.max_beams = max_beams;
    }

    pub fn max_beams(&self) -> usize {
        self.max_beams
    }

    pub fn set_map(&mut self, map: Arc<M>) {
        self.map = map;
    }

    pub fn map(&self) -> &Arc<M> {
        &self.map
    }

    /// Beams to score, or `None` when there is nothing to do.
    fn usable_beams(&self, observation: &SensorObservation) -> Option<Vec<Beam>> {
        if self.model.is_none() {
            return None;
        }
        if observation.beams().is_none() {
            warn!("Planar scanner received a point cloud observation, ignoring");
            return None;
        }
        let beams = observation.subsampled_beams(self.max_beams);
        (!beams.is_empty()).then_some(beams)
    }

    fn weigh(
        &mut self,
        model: PlanarModel,
        beams: &[Beam],
        range_max: f64,
        sample_set: &mut ParticleSampleSet,
    ) -> f64 {
        let map: &M = &self.map;
        let adjuster = &self.adjuster;
        let scanner_pose = self.scanner_pose;

        let total = match model {
            PlanarModel::Beam(params) => sample_set.reweight(|_, pose| {
                let sensor = pose.compose(&scanner_pose);
                beam::log_likelihood(map, &sensor, beams, range_max, &params).exp()
            }),

            PlanarModel::LikelihoodField(field) => sample_set.reweight(|_, pose| {
                let sensor = pose.compose(&scanner_pose);
                likelihood::scan_score(map, &sensor, beams, range_max, &field, false)
                    * adjuster.factor(map, pose.position())
            }),

            PlanarModel::LikelihoodFieldProb { field, skip }
                if skip.do_beamskip && sample_set.converged() =>
            {
                let scored: Vec<Beam> = beams
                    .iter()
                    .filter(|b| likelihood::is_scored(b.range, range_max))
                    .copied()
                    .collect();
                if scored.is_empty() {
                    sample_set.reweight(|_, pose| adjuster.factor(map, pose.position()))
                } else {
                    let tracker = &mut self.tracker;
                    tracker.reset(sample_set.len(), scored.len());
                    tracker.record(sample_set.samples(), |sample, probs, agrees| {
                        let sensor = sample.pose.compose(&scanner_pose);
                        for ((beam, p), agree) in scored.iter().zip(probs).zip(agrees) {
                            let d = likelihood::endpoint_distance(
                                map,
                                &sensor,
                                beam,
                                field.max_occ_dist,
                            );
                            *p = likelihood::normalized_field_probability(d, range_max, &field);
                            *agree = d < skip.beam_skip_distance;
                        }
                    });

                    let mask = tracker.mask(&skip);
                    if mask.fail_open() {
                        warn!(
                            "Beam skipping would drop {} of {} beams, integrating all",
                            mask.skipped(),
                            scored.len()
                        );
                    }

                    let tracker = &*tracker;
                    sample_set.reweight(|i, pose| {
                        tracker.log_likelihood(i, &mask).exp()
                            * adjuster.factor(map, pose.position())
                    })
                }
            }

            PlanarModel::LikelihoodFieldProb { field, .. } => sample_set.reweight(|_, pose| {
                let sensor = pose.compose(&scanner_pose);
                likelihood::scan_score(map, &sensor, beams, range_max, &field, true)
                    * adjuster.factor(map, pose.position())
            }),

            PlanarModel::LikelihoodFieldGompertz { field, gompertz } => {
                sample_set.reweight(|_, pose| {
                    let sensor = pose.compose(&scanner_pose);
                    let p = likelihood::scan_score(map, &sensor, beams, range_max, &field, true)
                        * adjuster.factor(map, pose.position());
                    gompertz.apply(p)
                })
            }
        };

        checked_total(total, sample_set.len())
    }
}

impl<M: DistanceField + RangeCaster + ?Sized> SensorModel for PlanarScanner<M> {
    fn update(
        &mut self,
        sample_set: &mut ParticleSampleSet,
        observation: &SensorObservation,
    ) -> bool {
        let (Some(model), Some(beams)) = (self.model, self.usable_beams(observation)) else {
            return false;
        };
        self.weigh(model, &beams, observation.range_max(), sample_set);
        true
    }

    fn apply_model_to_sample_set(
        &mut self,
        observation: &SensorObservation,
        sample_set: &mut ParticleSampleSet,
    ) -> f64 {
        match (self.model, self.usable_beams(observation)) {
            (Some(model), Some(beams)) => {
                self.weigh(model, &beams, observation.range_max(), sample_set)
            }
            _ => checked_total(sample_set.total_weight(), sample_set.len()),
        }
    }
}
