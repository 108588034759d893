//! Off-map and non-free-space penalties.
//!
//! A particle whose pose falls outside the map, or inside an obstacle, should
//! lose weight even if its scan happens to line up. The factor is evaluated
//! once per particle at the robot pose:
//!
//! ```text
//! off map                 → off_map_factor
//! in non-free space       → nfsf + (1 - nfsf) · min(1, d_free / radius)
//! in free space           → 1.0
//!
//!   factor
//!    1.0 │           ________
//!        │         /
//!        │       /
//!   nfsf │─────/
//!        └─────┴─────┴────── d_free (distance to free space)
//!              0   radius
//! ```

use serde::{Deserialize, Serialize};

use super::params::unit_interval;
use crate::core::Point2D;
use crate::error::ConfigError;
use crate::map::DistanceField;

/// Map penalty settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapFactors {
    /// Weight multiplier for a pose outside the map.
    #[serde(default = "default_factor")]
    pub off_map_factor: f64,

    /// Weight multiplier for a pose inside non-free space.
    #[serde(default = "default_factor")]
    pub non_free_space_factor: f64,

    /// Distance into non-free space over which the penalty ramps back to 1.
    #[serde(default)]
    pub non_free_space_radius: f64,

    /// Replaces `off_map_factor` while global localization runs.
    #[serde(default = "default_factor")]
    pub global_localization_off_map_factor: f64,

    /// Replaces `non_free_space_factor` while global localization runs.
    #[serde(default = "default_factor")]
    pub global_localization_non_free_space_factor: f64,
}

impl Default for MapFactors {
    fn default() -> Self {
        Self {
            off_map_factor: 1.0,
            non_free_space_factor: 1.0,
            non_free_space_radius: 0.0,
            global_localization_off_map_factor: 1.0,
            global_localization_non_free_space_factor: 1.0,
        }
    }
}

impl MapFactors {
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_interval("off_map_factor", self.off_map_factor)?;
        unit_interval("non_free_space_factor", self.non_free_space_factor)?;
        unit_interval(
            "global_localization_off_map_factor",
            self.global_localization_off_map_factor,
        )?;
        unit_interval(
            "global_localization_non_free_space_factor",
            self.global_localization_non_free_space_factor,
        )?;
        if self.non_free_space_radius.is_nan() {
            return Err(ConfigError::invalid("non_free_space_radius", "must not be NaN"));
        }
        Ok(())
    }
}

/// Computes the per-particle map penalty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MapFactorAdjuster {
    factors: MapFactors,
    global_localization: bool,
}

impl MapFactorAdjuster {
    pub fn new(factors: MapFactors) -> Self {
        Self {
            factors,
            global_localization: false,
        }
    }

    pub fn factors(&self) -> &MapFactors {
        &self.factors
    }

    pub fn set_factors(&mut self, factors: MapFactors) {
        self.factors = factors;
    }

    pub fn global_localization(&self) -> bool {
        self.global_localization
    }

    pub fn set_global_localization(&mut self, active: bool) {
        self.global_localization = active;
    }

    /// Multiplier for a particle at `position`.
    pub fn factor<M: DistanceField + ?Sized>(&self, map: &M, position: Point2D) -> f64 {
        let (off_map, non_free) = if self.global_localization {
            (
                self.factors.global_localization_off_map_factor,
                self.factors.global_localization_non_free_space_factor,
            )
        } else {
            (self.factors.off_map_factor, self.factors.non_free_space_factor)
        };

        if !map.is_in_map(position) {
            return off_map;
        }
        if map.is_free_space(position) {
            return 1.0;
        }

        let radius = self.factors.non_free_space_radius;
        if radius <= 0.0 {
            return non_free;
        }
        let ratio = (map.distance_to_free_space(position) / radius).min(1.0);
        non_free + (1.0 - non_free) * ratio
    }
}

fn default_factor() -> f64 {
    1.0
}
