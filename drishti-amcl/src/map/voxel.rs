//! Voxel grid with a 3D obstacle distance field.
//!
//! The planar queries ([`DistanceField`]) go through a footprint map where a
//! column is occupied if any of its voxels is. The point cloud scanner uses
//! the footprint for map factors and the 3D field for scoring.

use std::collections::VecDeque;

use super::{CellState, DistanceField, OccupancyMap, VolumetricField};
use crate::core::{Point2D, Point3D};
use crate::error::MapError;

/// Dense voxel occupancy. Voxel (0, 0, 0) has its minimum corner at `origin`.
#[derive(Debug, Clone)]
pub struct VoxelMap {
    width: usize,
    depth: usize,
    layers: usize,
    resolution: f64,
    origin: Point3D,
    occupied: Vec<bool>,
    max_occ_dist: f64,
    occ_dist: Vec<f64>,
    footprint: OccupancyMap,
}

impl VoxelMap {
    /// Build from a flat occupancy vector indexed `(z * depth + y) * width + x`.
    pub fn new(
        (width, depth, layers): (usize, usize, usize),
        resolution: f64,
        origin: Point3D,
        occupied: Vec<bool>,
        max_occ_dist: f64,
    ) -> Result<Self, MapError> {
        if width == 0 || depth == 0 || layers == 0 {
            return Err(MapError::Empty);
        }
        if !(resolution > 0.0) {
            return Err(MapError::InvalidResolution(resolution));
        }
        let expected = width * depth * layers;
        if occupied.len() != expected {
            return Err(MapError::DimensionMismatch {
                expected,
                actual: occupied.len(),
            });
        }

        let mut columns = vec![CellState::Free; width * depth];
        for z in 0..layers {
            for y in 0..depth {
                for x in 0..width {
                    if occupied[(z * depth + y) * width + x] {
                        columns[y * width + x] = CellState::Occupied;
                    }
                }
            }
        }
        let footprint = OccupancyMap::new(
            width,
            depth,
            resolution,
            origin.xy(),
            columns,
            max_occ_dist,
        )?;

        let occ_dist = distance_transform_3d(
            (width, depth, layers),
            resolution,
            max_occ_dist,
            &occupied,
        );

        Ok(Self {
            width,
            depth,
            layers,
            resolution,
            origin,
            occupied,
            max_occ_dist,
            occ_dist,
            footprint,
        })
    }

    /// Extrude a planar map `layers` voxels tall. Occupied cells become
    /// solid columns, everything else is empty.
    pub fn extrude(map: &OccupancyMap, layers: usize, base_z: f64) -> Result<Self, MapError> {
        let (width, depth) = map.dimensions();
        let mut occupied = Vec::with_capacity(width * depth * layers);
        for _ in 0..layers {
            for y in 0..depth {
                for x in 0..width {
                    occupied.push(map.state(x, y) == CellState::Occupied);
                }
            }
        }
        let origin = Point3D::new(map.origin().x, map.origin().y, base_z);
        Self::new(
            (width, depth, layers),
            map.resolution(),
            origin,
            occupied,
            map.max_occ_dist(),
        )
    }

    /// Dimensions in voxels: (width, depth, layers).
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.depth, self.layers)
    }

    /// Planar projection used for footprint queries.
    pub fn footprint(&self) -> &OccupancyMap {
        &self.footprint
    }

    pub fn is_occupied(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.width
            && y < self.depth
            && z < self.layers
            && self.occupied[(z * self.depth + y) * self.width + x]
    }

    fn world_to_voxel(&self, point: Point3D) -> Option<usize> {
        let fx = ((point.x - self.origin.x) / self.resolution).floor();
        let fy = ((point.y - self.origin.y) / self.resolution).floor();
        let fz = ((point.z - self.origin.z) / self.resolution).floor();
        if fx < 0.0 || fy < 0.0 || fz < 0.0 {
            return None;
        }
        let (x, y, z) = (fx as usize, fy as usize, fz as usize);
        if x < self.width && y < self.depth && z < self.layers {
            Some((z * self.depth + y) * self.width + x)
        } else {
            None
        }
    }
}

impl DistanceField for VoxelMap {
    fn distance_to_nearest_obstacle(&self, point: Point2D) -> f64 {
        self.footprint.distance_to_nearest_obstacle(point)
    }

    fn is_in_map(&self, point: Point2D) -> bool {
        self.footprint.is_in_map(point)
    }

    fn is_free_space(&self, point: Point2D) -> bool {
        self.footprint.is_free_space(point)
    }

    fn distance_to_free_space(&self, point: Point2D) -> f64 {
        self.footprint.distance_to_free_space(point)
    }

    fn max_occ_dist(&self) -> f64 {
        self.max_occ_dist
    }
}

impl VolumetricField for VoxelMap {
    fn distance_to_nearest_obstacle_3d(&self, point: Point3D) -> f64 {
        self.world_to_voxel(point)
            .map_or(self.max_occ_dist, |idx| self.occ_dist[idx])
    }

    fn is_in_volume(&self, point: Point3D) -> bool {
        self.world_to_voxel(point).is_some()
    }
}

/// 26-connected multi-source BFS, clamped at `max_dist`.
fn distance_transform_3d(
    (width, depth, layers): (usize, usize, usize),
    resolution: f64,
    max_dist: f64,
    occupied: &[bool],
) -> Vec<f64> {
    let index = |x: usize, y: usize, z: usize| (z * depth + y) * width + x;
    let mut field = vec![max_dist; occupied.len()];
    let mut queue = VecDeque::new();

    for z in 0..layers {
        for y in 0..depth {
            for x in 0..width {
                if occupied[index(x, y, z)] {
                    field[index(x, y, z)] = 0.0;
                    queue.push_back((x, y, z, 0.0_f64));
                }
            }
        }
    }

    let mut neighbors = Vec::with_capacity(26);
    for dz in -1i64..=1 {
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx != 0 || dy != 0 || dz != 0 {
                    let step = ((dx.abs() + dy.abs() + dz.abs()) as f64).sqrt();
                    neighbors.push((dx, dy, dz, step));
                }
            }
        }
    }

    while let Some((x, y, z, dist)) = queue.pop_front() {
        if dist > field[index(x, y, z)] + 1e-9 {
            continue;
        }
        for &(dx, dy, dz, step) in &neighbors {
            let (nx, ny, nz) = (x as i64 + dx, y as i64 + dy, z as i64 + dz);
            if nx < 0 || ny < 0 || nz < 0 {
                continue;
            }
            let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);
            if nx >= width || ny >= depth || nz >= layers {
                continue;
            }
            let new_dist = dist + step * resolution;
            let slot = &mut field[index(nx, ny, nz)];
            if new_dist < *slot && new_dist < max_dist {
                *slot = new_dist;
                queue.push_back((nx, ny, nz, new_dist));
            }
        }
    }

    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_voxel() -> VoxelMap {
        // 5 x 5 x 5 at 0.1m, one occupied voxel in the middle
        let mut occupied = vec![false; 125];
        occupied[(2 * 5 + 2) * 5 + 2] = true;
        VoxelMap::new((5, 5, 5), 0.1, Point3D::default(), occupied, 1.0).unwrap()
    }

    #[test]
    fn test_rejects_wrong_length() {
        let result = VoxelMap::new((2, 2, 2), 0.1, Point3D::default(), vec![false; 7], 1.0);
        assert!(matches!(
            result,
            Err(MapError::DimensionMismatch { expected: 8, actual: 7 })
        ));
    }

    #[test]
    fn test_3d_distance() {
        let map = single_voxel();
        let center = Point3D::new(0.25, 0.25, 0.25);
        assert_relative_eq!(map.distance_to_nearest_obstacle_3d(center), 0.0);

        let above = Point3D::new(0.25, 0.25, 0.35);
        assert_relative_eq!(map.distance_to_nearest_obstacle_3d(above), 0.1, epsilon = 1e-9);

        let corner = Point3D::new(0.35, 0.35, 0.35);
        assert_relative_eq!(
            map.distance_to_nearest_obstacle_3d(corner),
            3.0_f64.sqrt() * 0.1,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_off_volume_returns_sentinel() {
        let map = single_voxel();
        let outside = Point3D::new(0.25, 0.25, 2.0);
        assert!(!map.is_in_volume(outside));
        assert_relative_eq!(map.distance_to_nearest_obstacle_3d(outside), 1.0);
    }

    #[test]
    fn test_footprint_projection() {
        let map = single_voxel();
        assert_eq!(map.footprint().state(2, 2), CellState::Occupied);
        assert_eq!(map.footprint().state(0, 0), CellState::Free);
        assert!(!map.is_free_space(Point2D::new(0.25, 0.25)));
        assert!(map.is_free_space(Point2D::new(0.05, 0.05)));
    }

    #[test]
    fn test_extrude_fills_columns() {
        let planar =
            OccupancyMap::from_ascii(&["#..", "...", "..#"], 0.1, Point2D::default(), 0.5)
                .unwrap();
        let map = VoxelMap::extrude(&planar, 4, 0.0).unwrap();
        assert_eq!(map.dimensions(), (3, 3, 4));
        for z in 0..4 {
            assert!(map.is_occupied(0, 2, z));
            assert!(map.is_occupied(2, 0, z));
            assert!(!map.is_occupied(1, 1, z));
        }
    }
}
