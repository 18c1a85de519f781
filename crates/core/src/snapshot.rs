use serde::Serialize;

use crate::piece::ActivePiece;
use crate::types::{Shape, SHAPE_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ActiveSnapshot {
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
    pub cells: [(i32, i32); 4],
}

impl From<&ActivePiece> for ActiveSnapshot {
    fn from(value: &ActivePiece) -> Self {
        Self {
            shape: value.shape(),
            x: value.x,
            y: value.y,
            cells: value.cells(),
        }
    }
}

/// Owned view of a game for rendering and JSON reports
///
/// Board cells are `0` when empty and `shape id + 1` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub width: u32,
    pub height: u32,
    pub board: Vec<Vec<u8>>,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i32>,
    pub next: Shape,
    pub score: u32,
    pub rows: u32,
    pub level: u32,
    pub combo: u32,
    pub elapsed_ms: u32,
    pub step_ms: u32,
    pub shape_counts: [u32; SHAPE_COUNT],
    pub paused: bool,
    pub game_over: bool,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.game_over && !self.paused
    }

    /// Cell value at (x, y), `None` when out of bounds
    pub fn cell(&self, x: usize, y: usize) -> Option<u8> {
        self.board.get(y).and_then(|row| row.get(x)).copied()
    }
}
