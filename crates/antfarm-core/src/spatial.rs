use crate::constants::{COLLISION_DISTANCE, MAX_GRID_CELLS, SECTOR_COUNT};
use crate::entity::{EntityHandle, Located};
use crate::geometry;
use crate::metrics::{SectorReport, SectorStats};
use std::f64::consts::TAU;
use thiserror::Error;

/// Fatal index failures. Anything here means the grid or an entity is misconfigured.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpatialError {
    #[error("invalid grid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("cell {cell} is outside the {cell_count}-cell grid (head at ({x}, {y}))")]
    CellOutOfRange {
        cell: usize,
        cell_count: usize,
        x: f64,
        y: f64,
    },
    #[error("entity {id} has a non-finite head position ({x}, {y})")]
    NonFinitePosition { id: u32, x: f64, y: f64 },
}

/// Result of [`SpatialIndex::remove`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The handle was not in the bucket the entity had cached; nothing was removed.
    NotFound { cell: Option<usize> },
}

/// Uniform bucket grid over the arena.
///
/// Membership is explicit: moving an entity does not move its handle. Callers
/// remove with the entity's cached cell and re-insert from its new head position.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    cell_width: f64,
    cell_height: f64,
    rows: usize,
    cols: usize,
    buckets: Vec<Vec<EntityHandle>>,
}

impl SpatialIndex {
    pub fn new(
        cell_width: f64,
        cell_height: f64,
        arena_width: f64,
        arena_height: f64,
    ) -> Result<Self, SpatialError> {
        if !(cell_width.is_finite() && cell_width > 0.0) {
            return Err(SpatialError::InvalidConfig("cell_width must be positive and finite"));
        }
        if !(cell_height.is_finite() && cell_height > 0.0) {
            return Err(SpatialError::InvalidConfig("cell_height must be positive and finite"));
        }
        if !(arena_width.is_finite() && arena_width > 0.0) {
            return Err(SpatialError::InvalidConfig("arena_width must be positive and finite"));
        }
        if !(arena_height.is_finite() && arena_height > 0.0) {
            return Err(SpatialError::InvalidConfig("arena_height must be positive and finite"));
        }
        let cols = (arena_width / cell_width).ceil();
        let rows = (arena_height / cell_height).ceil();
        let max = MAX_GRID_CELLS as f64;
        if cols > max || rows > max {
            return Err(SpatialError::InvalidConfig("grid exceeds the maximum cell count"));
        }
        let (cols, rows) = (cols as usize, rows as usize);
        match rows.checked_mul(cols) {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => return Err(SpatialError::InvalidConfig("grid exceeds the maximum cell count")),
        }
        Ok(Self {
            cell_width,
            cell_height,
            rows,
            cols,
            buckets: vec![Vec::new(); rows * cols],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.buckets.len()
    }

    /// Clamped `(row, col)` of the cell containing `(x, y)`.
    pub fn row_col(&self, x: f64, y: f64) -> (usize, usize) {
        let row = Self::clamp_axis((y / self.cell_height).floor(), self.rows);
        let col = Self::clamp_axis((x / self.cell_width).floor(), self.cols);
        (row, col)
    }

    pub fn cell_of(&self, x: f64, y: f64) -> usize {
        let (row, col) = self.row_col(x, y);
        row * self.cols + col
    }

    /// Handles currently registered in `cell` (empty for an unknown cell).
    pub fn bucket(&self, cell: usize) -> &[EntityHandle] {
        self.buckets.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Register `object` in the bucket its head position falls into and cache that cell on it.
    pub fn insert<T: Located + ?Sized>(
        &mut self,
        handle: EntityHandle,
        object: &mut T,
    ) -> Result<usize, SpatialError> {
        let [x, y] = object.head_position();
        if !(x.is_finite() && y.is_finite()) {
            return Err(SpatialError::NonFinitePosition {
                id: object.id(),
                x,
                y,
            });
        }
        let cell = self.cell_of(x, y);
        let cell_count = self.buckets.len();
        let bucket = self
            .buckets
            .get_mut(cell)
            .ok_or(SpatialError::CellOutOfRange {
                cell,
                cell_count,
                x,
                y,
            })?;
        bucket.push(handle);
        object.set_cell(Some(cell));
        Ok(cell)
    }

    /// Remove `handle` from the bucket `object` last cached. The cache itself is left as is.
    pub fn remove<T: Located + ?Sized>(
        &mut self,
        handle: EntityHandle,
        object: &T,
    ) -> RemoveOutcome {
        let cell = object.cell();
        let position = cell
            .and_then(|c| self.buckets.get(c))
            .and_then(|bucket| bucket.iter().position(|&h| h == handle));
        match (cell, position) {
            (Some(c), Some(i)) => {
                self.buckets[c].remove(i);
                RemoveOutcome::Removed
            }
            _ => {
                tracing::warn!(
                    id = object.id(),
                    ?handle,
                    ?cell,
                    "entity not found in its cached cell; removal skipped"
                );
                RemoveOutcome::NotFound { cell }
            }
        }
    }

    /// Cell indices of the 3x3 block around `(row, col)`, self first.
    ///
    /// Rows and columns are clamped independently, so edge cells repeat.
    fn block_cells(&self, row: usize, col: usize) -> [usize; 9] {
        const OFFSETS: [(isize, isize); 9] = [
            (0, 0),
            (-1, 0),
            (1, 0),
            (0, -1),
            (0, 1),
            (-1, -1),
            (-1, 1),
            (1, -1),
            (1, 1),
        ];
        OFFSETS.map(|(dr, dc)| {
            let r = (row as isize + dr).clamp(0, self.rows as isize - 1) as usize;
            let c = (col as isize + dc).clamp(0, self.cols as isize - 1) as usize;
            r * self.cols + c
        })
    }

    /// All handles in the 3x3 block around the cell containing `(x, y)`, in scan order.
    /// Edge cells contribute their contents more than once.
    pub fn neighbors(&self, x: f64, y: f64) -> Vec<EntityHandle> {
        let (row, col) = self.row_col(x, y);
        self.block_cells(row, col)
            .iter()
            .flat_map(|&cell| self.buckets[cell].iter().copied())
            .collect()
    }

    /// First handle in scan order (other than `probe`) closer than the contact distance to `head`.
    ///
    /// `distance_to` resolves a handle to its distance from a point; returning NaN or
    /// infinity means "not touching".
    pub fn detect_collision(
        &self,
        probe: EntityHandle,
        head: [f64; 2],
        mut distance_to: impl FnMut(EntityHandle, [f64; 2]) -> f64,
    ) -> Option<EntityHandle> {
        let (row, col) = self.row_col(head[0], head[1]);
        self.block_cells(row, col)
            .iter()
            .flat_map(|&cell| self.buckets[cell].iter().copied())
            .filter(|&handle| handle != probe)
            .find(|&handle| distance_to(handle, head) < COLLISION_DISTANCE)
    }

    /// Total number of registered handles.
    pub fn audit(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Angular distribution of indexed sand around `center`.
    ///
    /// `sand_position` returns the position for sand handles and `None` for everything else.
    pub fn sector_report(
        &self,
        center: [f64; 2],
        mut sand_position: impl FnMut(EntityHandle) -> Option<[f64; 2]>,
    ) -> SectorReport {
        let mut sector_distances: Vec<Vec<f64>> = vec![Vec::new(); SECTOR_COUNT];
        let mut all_distances = Vec::new();

        for &handle in self.buckets.iter().flatten() {
            let Some(position) = sand_position(handle) else {
                continue;
            };
            let (dist, theta) = geometry::cartesian_to_polar(position, center);
            let sector = sector_of(theta);
            sector_distances[sector].push(dist);
            all_distances.push(dist);
        }

        let sectors: Vec<SectorStats> = sector_distances
            .iter()
            .enumerate()
            .map(|(sector, distances)| {
                let (distance_mean, distance_std) = geometry::mean_and_std(distances);
                SectorStats {
                    sector,
                    count: distances.len(),
                    distance_mean,
                    distance_std,
                }
            })
            .collect();
        let counts: Vec<f64> = sectors.iter().map(|s| s.count as f64).collect();
        let (distance_mean, distance_std) = geometry::mean_and_std(&all_distances);
        let (count_mean, count_std) = geometry::mean_and_std(&counts);

        SectorReport {
            tick: 0,
            center,
            sand_count: all_distances.len(),
            sectors,
            distance_mean,
            distance_std,
            count_mean,
            count_std,
        }
    }

    fn clamp_axis(cell: f64, len: usize) -> usize {
        (cell as i64).clamp(0, len as i64 - 1) as usize
    }
}

/// Sector (`0..SECTOR_COUNT`) of an angle in `[0, 2π)`.
///
/// Angles that round up to a full turn fold into the last sector.
pub fn sector_of(theta: f64) -> usize {
    let width = TAU / SECTOR_COUNT as f64;
    let sector = (theta / width).floor();
    if sector.is_nan() || sector < 0.0 {
        return 0;
    }
    (sector as usize).min(SECTOR_COUNT - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Marker, Sand};
    use proptest::prelude::*;

    fn grid_660() -> SpatialIndex {
        SpatialIndex::new(10.0, 10.0, 660.0, 660.0).unwrap()
    }

    /// Marker whose head sits exactly at `position`.
    fn marker(id: u32, x: f64, y: f64) -> Marker {
        Marker::new(id, [x, y], 1.0)
    }

    #[test]
    fn dimensions_use_ceiling_division() {
        let index = SpatialIndex::new(10.0, 10.0, 655.0, 21.0).unwrap();
        assert_eq!(index.cols(), 66);
        assert_eq!(index.rows(), 3);
        assert_eq!(index.cell_count(), 198);
    }

    #[test]
    fn rejects_non_positive_cells() {
        assert!(matches!(
            SpatialIndex::new(0.0, 10.0, 100.0, 100.0),
            Err(SpatialError::InvalidConfig(_))
        ));
        assert!(matches!(
            SpatialIndex::new(10.0, f64::NAN, 100.0, 100.0),
            Err(SpatialError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_grids_past_the_cell_limit() {
        assert!(matches!(
            SpatialIndex::new(1e-300, 1e-300, 1.0, 1.0),
            Err(SpatialError::InvalidConfig(_))
        ));
        assert!(matches!(
            SpatialIndex::new(0.1, 0.1, 2048.0, 2048.0),
            Err(SpatialError::InvalidConfig(_))
        ));
        // 2048 / 0.5 = 4096 columns, over the limit once squared.
        assert!(matches!(
            SpatialIndex::new(0.5, 0.5, 2048.0, 2048.0),
            Err(SpatialError::InvalidConfig(_))
        ));
    }

    #[test]
    fn insert_records_cell_on_object() {
        let mut index = grid_660();
        let mut sand = Sand::new(1, [100.0, 50.0]);
        // Head is (110, 52): row 5, col 11.
        let cell = index.insert(EntityHandle::Sand(0), &mut sand).unwrap();
        assert_eq!(cell, 5 * 66 + 11);
        assert_eq!(sand.cell(), Some(cell));
        assert_eq!(index.bucket(cell), &[EntityHandle::Sand(0)]);
        assert_eq!(index.audit(), 1);
    }

    #[test]
    fn insert_clamps_out_of_arena_heads() {
        let mut index = grid_660();
        let mut far = marker(1, 5000.0, -20.0);
        let cell = index.insert(EntityHandle::Marker(0), &mut far).unwrap();
        assert_eq!(cell, 65);
    }

    #[test]
    fn insert_rejects_non_finite_head() {
        let mut index = grid_660();
        let mut bad = marker(7, f64::NAN, 1.0);
        assert!(matches!(
            index.insert(EntityHandle::Marker(0), &mut bad),
            Err(SpatialError::NonFinitePosition { id: 7, .. })
        ));
        assert_eq!(index.audit(), 0);
        assert_eq!(bad.cell(), None);
    }

    #[test]
    fn remove_uses_cached_cell() {
        let mut index = grid_660();
        let mut m = marker(1, 55.0, 55.0);
        index.insert(EntityHandle::Marker(0), &mut m).unwrap();
        // Moving without re-inserting keeps the old bucket valid for removal.
        m.position = [300.0, 300.0];
        assert_eq!(
            index.remove(EntityHandle::Marker(0), &m),
            RemoveOutcome::Removed
        );
        assert_eq!(index.audit(), 0);
    }

    #[test]
    fn remove_with_stale_cache_reports_not_found() {
        let mut index = grid_660();
        let mut m = marker(1, 55.0, 55.0);
        index.insert(EntityHandle::Marker(0), &mut m).unwrap();
        m.set_cell(Some(0));
        assert_eq!(
            index.remove(EntityHandle::Marker(0), &m),
            RemoveOutcome::NotFound { cell: Some(0) }
        );
        assert_eq!(index.audit(), 1);

        let never_indexed = marker(2, 1.0, 1.0);
        assert_eq!(
            index.remove(EntityHandle::Marker(1), &never_indexed),
            RemoveOutcome::NotFound { cell: None }
        );
    }

    #[test]
    fn neighbors_follow_scan_order() {
        let mut index = grid_660();
        // Centre cell (5, 5) then up, down, left, right, and the diagonals.
        let spots = [
            (55.0, 55.0),
            (55.0, 45.0),
            (55.0, 65.0),
            (45.0, 55.0),
            (65.0, 55.0),
            (45.0, 45.0),
            (65.0, 45.0),
            (45.0, 65.0),
            (65.0, 65.0),
        ];
        // Insert in reverse so bucket order cannot be mistaken for insertion order.
        let mut markers: Vec<Marker> = spots
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| marker(i as u32, x, y))
            .collect();
        for (i, m) in markers.iter_mut().enumerate().rev() {
            index.insert(EntityHandle::Marker(i as u32), m).unwrap();
        }
        let found = index.neighbors(55.0, 55.0);
        let expected: Vec<EntityHandle> = (0..9).map(EntityHandle::Marker).collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn corner_neighbors_repeat_edge_cells() {
        let mut index = grid_660();
        let mut m = marker(1, 1.0, 1.0);
        index.insert(EntityHandle::Marker(0), &mut m).unwrap();
        // At (0,0): self, up (clamped to self), left (self), up-left (self) -> four copies.
        let found = index.neighbors(2.0, 2.0);
        assert_eq!(found.len(), 4);
        assert!(found.iter().all(|&h| h == EntityHandle::Marker(0)));
    }

    #[test]
    fn collision_excludes_probe_and_respects_threshold() {
        let mut index = grid_660();
        let mut markers = vec![
            marker(1, 100.0, 100.0),
            marker(2, 101.4, 100.0),
            marker(3, 101.6, 100.0),
        ];
        for (i, m) in markers.iter_mut().enumerate() {
            index.insert(EntityHandle::Marker(i as u32), m).unwrap();
        }
        let distance = |h: EntityHandle, p: [f64; 2]| markers[h.index()].distance_to_point(p);

        let hit = index.detect_collision(EntityHandle::Marker(0), [100.0, 100.0], distance);
        assert_eq!(hit, Some(EntityHandle::Marker(1)));

        let none = index.detect_collision(EntityHandle::Marker(0), [98.0, 100.0], distance);
        assert_eq!(none, None);

        let edge = index.detect_collision(EntityHandle::Marker(0), [100.1, 100.0], distance);
        assert_eq!(edge, Some(EntityHandle::Marker(1)));
    }

    #[test]
    fn collision_picks_scan_order_not_nearest() {
        let mut index = grid_660();
        // Probe at (59.9, 55): own cell (5,5). Marker 0 sits in the right-hand cell at
        // distance 0.2; marker 1 sits in the probe's own cell at distance 1.4.
        let mut markers = vec![marker(1, 60.1, 55.0), marker(2, 58.5, 55.0)];
        for (i, m) in markers.iter_mut().enumerate() {
            index.insert(EntityHandle::Marker(i as u32), m).unwrap();
        }
        let distance = |h: EntityHandle, p: [f64; 2]| markers[h.index()].distance_to_point(p);
        let hit = index.detect_collision(EntityHandle::Agent(0), [59.9, 55.0], distance);
        assert_eq!(hit, Some(EntityHandle::Marker(1)));
    }

    #[test]
    fn nan_distance_never_collides() {
        let mut index = grid_660();
        let mut m = marker(1, 10.0, 10.0);
        index.insert(EntityHandle::Marker(0), &mut m).unwrap();
        let hit = index.detect_collision(EntityHandle::Agent(0), [10.0, 10.0], |_, _| f64::NAN);
        assert_eq!(hit, None);
    }

    #[test]
    fn sector_boundaries() {
        assert_eq!(sector_of(0.0), 0);
        assert_eq!(sector_of(TAU - 1e-9), 7);
        assert_eq!(sector_of(TAU), 7);
        assert_eq!(sector_of(TAU / 8.0), 1);
        assert_eq!(sector_of(std::f64::consts::PI), 4);
    }

    #[test]
    fn sector_report_single_grain_at_centre() {
        let mut index = grid_660();
        let mut sands = vec![Sand::new(1, [330.0, 330.0])];
        index.insert(EntityHandle::Sand(0), &mut sands[0]).unwrap();
        let report = index.sector_report([330.0, 330.0], |h| match h {
            EntityHandle::Sand(i) => Some(sands[i as usize].position),
            _ => None,
        });
        assert_eq!(report.sand_count, 1);
        assert_eq!(report.sectors[0].count, 1);
        assert_eq!(report.sectors[0].distance_mean, 0.0);
        assert_eq!(report.distance_mean, 0.0);
        assert!(report.sectors[1..].iter().all(|s| s.count == 0));
        assert!((report.count_mean - 0.125).abs() < 1e-12);
    }

    #[test]
    fn sector_report_skips_non_sand() {
        let mut index = grid_660();
        let mut sands = vec![Sand::new(1, [430.0, 330.0]), Sand::new(2, [330.0, 230.0])];
        for (i, s) in sands.iter_mut().enumerate() {
            index.insert(EntityHandle::Sand(i as u32), s).unwrap();
        }
        let mut m = marker(3, 330.0, 430.0);
        index.insert(EntityHandle::Marker(0), &mut m).unwrap();

        let report = index.sector_report([330.0, 330.0], |h| match h {
            EntityHandle::Sand(i) => Some(sands[i as usize].position),
            _ => None,
        });
        assert_eq!(report.sand_count, 2);
        assert_eq!(report.sectors[0].count, 1);
        // (330, 230) is straight "up" in screen space: angle 3π/2, sector 6.
        assert_eq!(report.sectors[6].count, 1);
        assert!((report.distance_mean - 100.0).abs() < 1e-9);
        assert_eq!(report.distance_std, 0.0);
    }

    proptest! {
        #[test]
        fn proptest_neighbors_match_chebyshev_block(
            points in proptest::collection::vec((0.0f64..200.0, 0.0f64..200.0), 1..60),
            qx in 0.0f64..200.0,
            qy in 0.0f64..200.0,
        ) {
            let mut index = SpatialIndex::new(10.0, 10.0, 200.0, 200.0).unwrap();
            let mut markers: Vec<Marker> = points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| marker(i as u32, x, y))
                .collect();
            for (i, m) in markers.iter_mut().enumerate() {
                index.insert(EntityHandle::Marker(i as u32), m).unwrap();
            }
            let found = index.neighbors(qx, qy);
            let (qr, qc) = index.row_col(qx, qy);
            for (i, m) in markers.iter().enumerate() {
                let cell = m.cell().unwrap();
                let (r, c) = (cell / index.cols(), cell % index.cols());
                let near = r.abs_diff(qr) <= 1 && c.abs_diff(qc) <= 1;
                prop_assert_eq!(found.contains(&EntityHandle::Marker(i as u32)), near);
            }
        }

        #[test]
        fn proptest_sector_in_range(theta in 0.0f64..TAU) {
            prop_assert!(sector_of(theta) < SECTOR_COUNT);
        }
    }
}
