//! Planar occupancy grid with precomputed distance fields.
//!
//! Two fields are computed at construction:
//!
//! - obstacle distance: meters from each cell to the nearest occupied cell,
//!   clamped at `max_occ_dist` (the likelihood field)
//! - free-space distance: meters from each cell to the nearest free cell
//!
//! Both use the same 8-connected BFS, seeded from the target cells.

use std::collections::VecDeque;
use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};

use super::raycast::GridLine;
use super::{DistanceField, RangeCaster};
use crate::core::Point2D;
use crate::error::MapError;

/// Occupancy state of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellState {
    Free,
    Occupied,
    #[default]
    Unknown,
}

/// Row-major occupancy grid. Cell (0, 0) has its lower-left corner at `origin`.
#[derive(Debug, Clone)]
pub struct OccupancyMap {
    width: usize,
    height: usize,
    resolution: f64,
    origin: Point2D,
    cells: Vec<CellState>,
    max_occ_dist: f64,
    occ_dist: Vec<f64>,
    free_dist: Vec<f64>,
}

impl OccupancyMap {
    /// Create a map from row-major cells.
    pub fn new(
        width: usize,
        height: usize,
        resolution: f64,
        origin: Point2D,
        cells: Vec<CellState>,
        max_occ_dist: f64,
    ) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::Empty);
        }
        if !(resolution > 0.0) {
            return Err(MapError::InvalidResolution(resolution));
        }
        if cells.len() != width * height {
            return Err(MapError::DimensionMismatch {
                expected: width * height,
                actual: cells.len(),
            });
        }

        let mut map = Self {
            width,
            height,
            resolution,
            origin,
            cells,
            max_occ_dist,
            occ_dist: Vec::new(),
            free_dist: Vec::new(),
        };
        map.update_distance_fields();
        Ok(map)
    }

    /// Parse an ASCII drawing, first row = top of the map.
    ///
    /// `#` occupied, `.` free, `?` unknown.
    ///
    /// ```
    /// use drishti_amcl::map::OccupancyMap;
    /// use drishti_amcl::core::Point2D;
    ///
    /// let map = OccupancyMap::from_ascii(
    ///     &["###", "#.#", "###"],
    ///     0.1,
    ///     Point2D::new(0.0, 0.0),
    ///     1.0,
    /// ).unwrap();
    /// assert_eq!(map.dimensions(), (3, 3));
    /// ```
    pub fn from_ascii(
        rows: &[&str],
        resolution: f64,
        origin: Point2D,
        max_occ_dist: f64,
    ) -> Result<Self, MapError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut cells = vec![CellState::Unknown; width * height];

        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(MapError::RaggedRows);
            }
            let cy = height - 1 - row;
            for (cx, ch) in line.chars().enumerate() {
                cells[cy * width + cx] = match ch {
                    '#' => CellState::Occupied,
                    '.' => CellState::Free,
                    '?' => CellState::Unknown,
                    other => return Err(MapError::InvalidCell(other)),
                };
            }
        }

        Self::new(width, height, resolution, origin, cells, max_occ_dist)
    }

    /// Grid dimensions in cells.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn origin(&self) -> Point2D {
        self.origin
    }

    /// Cell containing `point`, if any.
    pub fn world_to_cell(&self, point: Point2D) -> Option<(usize, usize)> {
        let (cx, cy) = self.world_to_cell_unchecked(point);
        self.checked_cell(cx, cy)
    }

    /// World coordinates of a cell center.
    pub fn cell_center(&self, cx: usize, cy: usize) -> Point2D {
        Point2D::new(
            self.origin.x + (cx as f64 + 0.5) * self.resolution,
            self.origin.y + (cy as f64 + 0.5) * self.resolution,
        )
    }

    /// State of a cell; [`CellState::Unknown`] off-map.
    pub fn state(&self, cx: usize, cy: usize) -> CellState {
        if cx < self.width && cy < self.height {
            self.cells[cy * self.width + cx]
        } else {
            CellState::Unknown
        }
    }

    /// Overwrite a cell. Call [`update_distance_fields`](Self::update_distance_fields)
    /// once all edits are done.
    pub fn set_state(&mut self, cx: usize, cy: usize, state: CellState) {
        if cx < self.width && cy < self.height {
            self.cells[cy * self.width + cx] = state;
        }
    }

    /// Recompute both distance fields from the current cells.
    pub fn update_distance_fields(&mut self) {
        self.occ_dist = distance_transform(
            self.width,
            self.height,
            self.resolution,
            self.max_occ_dist,
            |i| self.cells[i] == CellState::Occupied,
        );
        self.free_dist = distance_transform(
            self.width,
            self.height,
            self.resolution,
            self.diagonal(),
            |i| self.cells[i] == CellState::Free,
        );
    }

    /// Upper bound on any in-map distance, in meters.
    fn diagonal(&self) -> f64 {
        (self.width + self.height) as f64 * self.resolution
    }

    fn world_to_cell_unchecked(&self, point: Point2D) -> (i64, i64) {
        (
            ((point.x - self.origin.x) / self.resolution).floor() as i64,
            ((point.y - self.origin.y) / self.resolution).floor() as i64,
        )
    }

    fn checked_cell(&self, cx: i64, cy: i64) -> Option<(usize, usize)> {
        if cx >= 0 && cy >= 0 && (cx as usize) < self.width && (cy as usize) < self.height {
            Some((cx as usize, cy as usize))
        } else {
            None
        }
    }
}

impl DistanceField for OccupancyMap {
    fn distance_to_nearest_obstacle(&self, point: Point2D) -> f64 {
        match self.world_to_cell(point) {
            Some((cx, cy)) => self.occ_dist[cy * self.width + cx],
            None => self.max_occ_dist,
        }
    }

    fn is_in_map(&self, point: Point2D) -> bool {
        self.world_to_cell(point).is_some()
    }

    fn is_free_space(&self, point: Point2D) -> bool {
        self.world_to_cell(point)
            .is_some_and(|(cx, cy)| self.state(cx, cy) == CellState::Free)
    }

    fn distance_to_free_space(&self, point: Point2D) -> f64 {
        match self.world_to_cell(point) {
            Some((cx, cy)) => self.free_dist[cy * self.width + cx],
            None => self.max_occ_dist,
        }
    }

    fn max_occ_dist(&self) -> f64 {
        self.max_occ_dist
    }
}

impl RangeCaster for OccupancyMap {
    fn cast_range(&self, origin: Point2D, bearing: f64, max_range: f64) -> f64 {
        if !self.is_in_map(origin) {
            return 0.0;
        }
        // Any ray leaves the grid within the diagonal; keeps cell indices bounded
        let reach = max_range.min(self.diagonal());
        let (sin_b, cos_b) = bearing.sin_cos();
        let end = Point2D::new(origin.x + reach * cos_b, origin.y + reach * sin_b);
        let start = self.world_to_cell_unchecked(origin);
        let stop = self.world_to_cell_unchecked(end);

        for (cx, cy) in GridLine::new(start, stop) {
            let blocked = match self.checked_cell(cx, cy) {
                Some((x, y)) => self.state(x, y) != CellState::Free,
                None => true,
            };
            if blocked {
                let steps = ((cx - start.0) as f64).hypot((cy - start.1) as f64);
                return (steps * self.resolution).min(max_range);
            }
        }

        max_range
    }
}

/// Multi-source BFS over an 8-connected grid.
///
/// Cells for which `is_seed` holds get distance 0; everything else gets the
/// chamfer distance to the closest seed, clamped at `max_dist`.
fn distance_transform(
    width: usize,
    height: usize,
    resolution: f64,
    max_dist: f64,
    is_seed: impl Fn(usize) -> bool,
) -> Vec<f64> {
    let mut field = vec![max_dist; width * height];
    let mut queue: VecDeque<(usize, usize, f64)> = VecDeque::new();

    for cy in 0..height {
        for cx in 0..width {
            let idx = cy * width + cx;
            if is_seed(idx) {
                field[idx] = 0.0;
                queue.push_back((cx, cy, 0.0));
            }
        }
    }

    let neighbors: [(i64, i64, f64); 8] = [
        (-1, 0, 1.0),
        (1, 0, 1.0),
        (0, -1, 1.0),
        (0, 1, 1.0),
        (-1, -1, SQRT_2),
        (1, -1, SQRT_2),
        (-1, 1, SQRT_2),
        (1, 1, SQRT_2),
    ];

    while let Some((cx, cy, dist)) = queue.pop_front() {
        // Stale entry: a shorter path reached this cell after it was queued
        if dist > field[cy * width + cx] + 1e-9 {
            continue;
        }

        for &(dx, dy, step) in &neighbors {
            let nx = cx as i64 + dx;
            let ny = cy as i64 + dy;
            if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let new_dist = dist + step * resolution;
            let slot = &mut field[ny * width + nx];
            if new_dist < *slot && new_dist < max_dist {
                *slot = new_dist;
                queue.push_back((nx, ny, new_dist));
            }
        }
    }

    field
}
