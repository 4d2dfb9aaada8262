//! Tile occupancy grid and spawn tile selection.

use bastion_core::{CellCoord, CellRect, OccupancyView};
use rand::Rng;

/// Fraction of the nearest spawn candidates that remain eligible.
const SPAWN_NEAREST_FRACTION: f64 = 0.6;

/// Boolean occupancy map over the tiles of the map.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    tile_length: f32,
    cells: Vec<bool>,
}

impl Grid {
    pub(crate) fn new(columns: u32, rows: u32, tile_length: f32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            tile_length,
            cells: vec![false; capacity],
        }
    }

    pub(crate) const fn columns(&self) -> u32 {
        self.columns
    }

    pub(crate) const fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    pub(crate) fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, self.columns, self.rows)
    }

    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.view().is_occupied(cell)
    }

    pub(crate) fn can_place(&self, region: CellRect) -> bool {
        self.view().can_place(region)
    }

    pub(crate) fn contains(&self, region: CellRect) -> bool {
        region.cells().all(|cell| self.index(cell).is_some())
    }

    /// Marks every in-bounds cell of the region. Out-of-bounds cells are ignored.
    pub(crate) fn set_occupied(&mut self, region: CellRect, occupied: bool) {
        for cell in region.cells() {
            if let Some(index) = self.index(cell) {
                if let Some(slot) = self.cells.get_mut(index) {
                    *slot = occupied;
                }
            }
        }
    }

    /// Picks a free perimeter tile, favouring tiles nearer the map centre.
    ///
    /// A handful of evenly spaced points along each edge are sampled first and
    /// ranked by distance to the centre. If none of them is free every
    /// perimeter tile is considered instead, unranked and in scan order. The
    /// result is drawn uniformly from the first 60% of the candidates.
    pub(crate) fn find_edge_spawn_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<CellCoord> {
        if self.columns == 0 || self.rows == 0 {
            return None;
        }

        let mut candidates = self.sampled_edge_candidates();
        if candidates.is_empty() {
            candidates = self.perimeter_candidates();
        } else {
            let center = self.center_cell();
            candidates.sort_by_key(|cell| cell.distance_squared(center));
        }
        if candidates.is_empty() {
            return None;
        }

        let nearest = (candidates.len() as f64 * SPAWN_NEAREST_FRACTION).floor() as usize;
        let cutoff = nearest.saturating_sub(1);
        let index = rng.gen_range(0..=cutoff);
        candidates.get(index).copied()
    }

    fn center_cell(&self) -> CellCoord {
        CellCoord::new((self.columns / 2) as i32, (self.rows / 2) as i32)
    }

    fn sampled_edge_candidates(&self) -> Vec<CellCoord> {
        let columns = self.columns as i32;
        let rows = self.rows as i32;
        let shortest = self.columns.min(self.rows);
        let longest = self.columns.max(self.rows);
        let corner_buffer = 5.min(shortest / 10) as i32;
        let points_per_edge = (longest / 10).clamp(3, 8) as i32;

        let spread = |length: i32, index: i32| -> i32 {
            let usable = (length - 2 * corner_buffer) as f32;
            corner_buffer + (usable * index as f32 / (points_per_edge + 1) as f32).floor() as i32
        };

        let mut samples = Vec::with_capacity(points_per_edge as usize * 4);
        for index in 1..=points_per_edge {
            let column = spread(columns, index);
            samples.push(CellCoord::new(column, 0));
        }
        for index in 1..=points_per_edge {
            let column = spread(columns, index);
            samples.push(CellCoord::new(column, rows - 1));
        }
        for index in 1..=points_per_edge {
            let row = spread(rows, index);
            samples.push(CellCoord::new(0, row));
        }
        for index in 1..=points_per_edge {
            let row = spread(rows, index);
            samples.push(CellCoord::new(columns - 1, row));
        }

        let mut free: Vec<CellCoord> = Vec::with_capacity(samples.len());
        for cell in samples {
            if !self.is_occupied(cell) && !free.contains(&cell) {
                free.push(cell);
            }
        }
        free
    }

    fn perimeter_candidates(&self) -> Vec<CellCoord> {
        let columns = self.columns as i32;
        let rows = self.rows as i32;
        let mut free = Vec::new();
        let mut push = |cell: CellCoord, grid: &Self| {
            if !grid.is_occupied(cell) && !free.contains(&cell) {
                free.push(cell);
            }
        };

        for column in 0..columns {
            push(CellCoord::new(column, 0), self);
            push(CellCoord::new(column, rows - 1), self);
        }
        for row in 1..rows - 1 {
            push(CellCoord::new(0, row), self);
            push(CellCoord::new(columns - 1, row), self);
        }
        free
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column < self.columns && row < self.rows {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
