//! DrishtiAMCL - Observation weighting for Monte Carlo localization
//!
//! Turns one range-sensor reading into per-particle weight updates against a
//! known map. Resampling, motion models and pose clustering belong to the
//! surrounding filter.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     config                          │  ← TOML loading
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    sensors/                         │  ← Scoring
//! │  (planar + point cloud scanners, beam skipping,     │
//! │   Gompertz reshaping, map factors)                  │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      map/                           │  ← Map queries
//! │  (DistanceField, RangeCaster, VolumetricField;      │
//! │   OccupancyMap, VoxelMap)                           │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │        (poses, observations, particle sets)         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use drishti_amcl::core::{ParticleSampleSet, Point2D, Pose2D, SensorObservation};
//! use drishti_amcl::map::OccupancyMap;
//! use drishti_amcl::sensors::{LikelihoodFieldParams, PlanarScanner, SensorModel};
//!
//! let map = OccupancyMap::from_ascii(
//!     &["#####", "#...#", "#####"],
//!     0.1,
//!     Point2D::new(0.0, 0.0),
//!     1.0,
//! )
//! .unwrap();
//! let mut scanner = PlanarScanner::new(60, Arc::new(map));
//! scanner
//!     .set_model_likelihood_field(LikelihoodFieldParams::default())
//!     .unwrap();
//!
//! let mut particles = ParticleSampleSet::from_poses([Pose2D::new(0.25, 0.15, 0.0)]);
//! let scan = SensorObservation::from_ranges(&[0.2], 0.0, 0.01, 10.0);
//! assert!(scanner.update(&mut particles, &scan));
//! ```
//!
//! # Features
//!
//! - `rayon`: score particles in parallel

pub mod config;
pub mod core;
pub mod error;
pub mod map;
pub mod sensors;

pub use config::AmclConfig;
pub use crate::core::{
    Beam, ParticleSample, ParticleSampleSet, Point2D, Point3D, Pose2D, SensorObservation,
};
pub use error::{ConfigError, DrishtiError, MapError, Result};
pub use map::{DistanceField, OccupancyMap, RangeCaster, VolumetricField, VoxelMap};
pub use sensors::{
    BeamParams, BeamSkipParams, GompertzTransform, LikelihoodFieldParams, MapFactors, ModelType,
    PlanarModel, PlanarScanner, PointCloudModel, PointCloudScanner, SensorModel,
};
