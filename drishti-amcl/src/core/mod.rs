//! Core types shared across the crate.
//!
//! Follows the ROS REP-103 convention:
//! - **X-axis**: Forward
//! - **Y-axis**: Left
//! - **Theta**: Counter-clockwise rotation from +X (radians)
//!
//! - [`Pose2D`], [`Point2D`], [`Point3D`]: geometry
//! - [`SensorObservation`], [`Beam`]: one cycle's reading
//! - [`ParticleSample`], [`ParticleSampleSet`]: the filter's belief

pub mod math;
mod observation;
mod pose;
mod sample;

pub use observation::{Beam, ObservationData, SensorObservation, subsample_step};
pub use pose::{Point2D, Point3D, Pose2D};
pub use sample::{ParticleSample, ParticleSampleSet};
