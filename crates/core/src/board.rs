//! Board module - manages the game grid
//!
//! The board is a `width x height` grid where each cell is empty or holds the
//! shape of a block that was frozen there. The top `HIDDEN_ROWS` rows are a
//! spawn buffer the presentation layer does not draw.
//! Uses a flat row-major array; a block's position is implicit from its index.
//! Coordinates: (x, y) where x grows to the right and y grows downward.

use arrayvec::ArrayVec;

use crate::piece::ActivePiece;
use crate::types::{Cell, CLEAR_WINDOW};

/// Row indices removed by one [`Board::clear_filled_rows`] call
pub type ClearedRows = ArrayVec<usize, CLEAR_WINDOW>;

/// The game board using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u32,
    height: u32,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.width as i32 || y < 0 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    #[inline]
    fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        let start = row * self.width as usize;
        start..start + self.width as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and empty
    pub fn is_free(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// True if any block of the piece is out of bounds or on an occupied cell
    pub fn collides(&self, piece: &ActivePiece) -> bool {
        piece.cells().iter().any(|&(x, y)| !self.is_free(x, y))
    }

    /// Move the piece's blocks into the grid, consuming the piece
    ///
    /// Returns false (and leaves the board untouched) if any block would land
    /// outside the grid or on an occupied cell.
    pub fn freeze(&mut self, piece: ActivePiece) -> bool {
        if self.collides(&piece) {
            return false;
        }
        let shape = piece.shape();
        for (x, y) in piece.cells() {
            self.set(x, y, Some(shape));
        }
        true
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, row: usize) -> bool {
        if row >= self.height as usize {
            return false;
        }
        self.cells[self.row_range(row)].iter().all(|cell| cell.is_some())
    }

    fn is_row_empty(&self, row: usize) -> bool {
        self.cells[self.row_range(row)].iter().all(|cell| cell.is_none())
    }

    /// Empty a row and drop the rows above it by one
    ///
    /// Walks upward from `row`, shifting each non-empty row down, and stops
    /// at the first empty row: under gravity nothing floats above a gap.
    /// Returns true if any row was shifted.
    pub fn clear_and_collapse(&mut self, row: usize) -> bool {
        if row >= self.height as usize {
            return false;
        }
        let width = self.width as usize;
        let cleared = self.row_range(row);
        self.cells[cleared].fill(None);

        let mut collapsed = false;
        for src in (0..row).rev() {
            if self.is_row_empty(src) {
                break;
            }
            let range = self.row_range(src);
            for idx in range {
                if let Some(shape) = self.cells[idx].take() {
                    self.cells[idx + width] = Some(shape);
                }
            }
            collapsed = true;
        }
        collapsed
    }

    /// Clear full rows inside a window and return the rows cleared
    ///
    /// The scan runs `h` steps (at most [`CLEAR_WINDOW`]) from the bottom row
    /// of `y..y + h`, moving up one row per step. A cleared row is checked
    /// again, since the row above has collapsed into it.
    pub fn clear_filled_rows(&mut self, y: usize, h: usize) -> ClearedRows {
        let mut cleared = ClearedRows::new();
        let h = h.min(CLEAR_WINDOW);
        if h == 0 || self.height == 0 {
            return cleared;
        }
        let mut pos = (y + h).min(self.height as usize) - 1;

        for _ in 0..h {
            if self.is_row_full(pos) {
                self.clear_and_collapse(pos);
                cleared.push(pos);
            } else if pos > 0 {
                pos -= 1;
            } else {
                break;
            }
        }
        cleared
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Fill every cell of a row (test helper)
    #[cfg(test)]
    pub fn fill_row(&mut self, row: usize, shape: crate::types::Shape) {
        let range = self.row_range(row);
        self.cells[range].fill(Some(shape));
    }
}
