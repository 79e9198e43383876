//! Byte cell storage.

use bevy::prelude::*;

/// Low bits of a cell code that decide occupancy and color.
pub const OCCUPIED_MASK: u8 = 0b0011;

/// Default grid side length.
pub const DEFAULT_GRID_SIZE: usize = 32;

/// Whether `code` describes an occupied cell.
pub fn is_occupied(code: u8) -> bool {
    code & OCCUPIED_MASK != 0
}

/// Square grid of byte cell codes in row-major order, addressed by offset
/// coordinates (column, row).
///
/// Reads outside the grid return 0 and writes outside it are ignored, so
/// neighbour scans never need a bounds check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellGridBuffer {
    size: usize,
    cells: Vec<u8>,
}

impl Default for CellGridBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl CellGridBuffer {
    /// All-empty grid of `size × size` cells.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw codes, row-major.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Whether (col, row) lies inside the grid.
    pub fn contains(&self, col: i32, row: i32) -> bool {
        self.index(col, row).is_some()
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        let (col, row) = (usize::try_from(col).ok()?, usize::try_from(row).ok()?);
        (col < self.size && row < self.size).then_some(col + row * self.size)
    }

    /// Code at (col, row), 0 outside the grid.
    pub fn get(&self, col: i32, row: i32) -> u8 {
        self.index(col, row).map_or(0, |i| self.cells[i])
    }

    /// Writes `code` at (col, row). No-op outside the grid.
    pub fn set(&mut self, col: i32, row: i32, code: u8) {
        if let Some(i) = self.index(col, row) {
            self.cells[i] = code;
        }
    }

    /// Resets every cell to 0.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Changes the side length, reinitializing the grid to all-empty. Keeps
    /// the cells when the size is unchanged.
    pub fn resize(&mut self, size: usize) {
        if size == self.size {
            return;
        }
        self.size = size;
        self.cells = vec![0; size * size];
    }

    /// Every cell with its (col, row) coordinate, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, u8)> + '_ {
        let size = self.size.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &code)| (IVec2::new((i % size) as i32, (i / size) as i32), code))
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| is_occupied(c)).count()
    }
}
