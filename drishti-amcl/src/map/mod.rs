//! Map collaborators queried by the sensor models.
//!
//! The scanners never build or mutate maps. They hold an `Arc` to something
//! implementing these traits and query it read-only, possibly from several
//! threads at once.
//!
//! | Trait | Needed by |
//! |-------|-----------|
//! | [`DistanceField`] | likelihood-field models, map factors |
//! | [`RangeCaster`] | beam model |
//! | [`VolumetricField`] | point cloud scanner |
//!
//! [`OccupancyMap`] and [`VoxelMap`] are grid implementations used by the
//! tests and by callers without a map stack of their own.

mod occupancy;
mod raycast;
mod voxel;

pub use occupancy::{CellState, OccupancyMap};
pub use raycast::GridLine;
pub use voxel::VoxelMap;

use crate::core::{Point2D, Point3D};

/// Obstacle and free-space distance queries on a planar map.
///
/// Out-of-bounds queries never fail: distances return a finite non-negative
/// sentinel instead.
pub trait DistanceField: Send + Sync {
    /// Distance from `point` to the nearest obstacle, clamped at
    /// [`max_occ_dist`](Self::max_occ_dist). Returns `max_occ_dist` off-map.
    fn distance_to_nearest_obstacle(&self, point: Point2D) -> f64;

    /// Whether `point` lies within the map bounds.
    fn is_in_map(&self, point: Point2D) -> bool;

    /// Whether `point` lies in known free space.
    fn is_free_space(&self, point: Point2D) -> bool;

    /// Distance from `point` to the nearest free cell (0 inside free space).
    fn distance_to_free_space(&self, point: Point2D) -> f64;

    /// Clamp applied to obstacle distances.
    fn max_occ_dist(&self) -> f64;
}

/// Ray casting through a planar map.
pub trait RangeCaster: Send + Sync {
    /// Range at which a ray from `origin` along `bearing` (map frame) first
    /// meets non-free space, capped at `max_range`.
    fn cast_range(&self, origin: Point2D, bearing: f64, max_range: f64) -> f64;
}

/// Obstacle distance queries on a 3D map.
pub trait VolumetricField: DistanceField {
    /// 3D counterpart of [`DistanceField::distance_to_nearest_obstacle`].
    fn distance_to_nearest_obstacle_3d(&self, point: Point3D) -> f64;

    /// Whether `point` lies within the volume.
    fn is_in_volume(&self, point: Point3D) -> bool;
}
