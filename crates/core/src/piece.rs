//! Active piece - the falling piece and its movement rules
//!
//! Every operation mutates the piece in place and reverts on collision, so a
//! failed move or rotation leaves position and offsets bit-for-bit unchanged.

use crate::board::Board;
use crate::pieces::{get_shape, kick_offsets, rotate_ccw, rotate_cw, spawn_origin, PieceShape};
use crate::types::Shape;

/// The currently falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    shape: Shape,
    pub x: i32,
    pub y: i32,
    blocks: PieceShape,
}

impl ActivePiece {
    /// Create a piece at its spawn position on a board of the given width
    pub fn spawn(shape: Shape, board_width: u32) -> Self {
        let (x, y) = spawn_origin(shape, board_width);
        Self::at(shape, x, y)
    }

    /// Create a piece in spawn orientation at an explicit origin
    pub fn at(shape: Shape, x: i32, y: i32) -> Self {
        Self {
            shape,
            x,
            y,
            blocks: get_shape(shape),
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Block offsets relative to the origin
    pub fn blocks(&self) -> &PieceShape {
        &self.blocks
    }

    /// Absolute board coordinates of the four blocks
    pub fn cells(&self) -> [(i32, i32); 4] {
        self.blocks.map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Translate by (dx, dy); reverts and returns false on collision
    pub fn try_move(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        self.x += dx;
        self.y += dy;
        if board.collides(self) {
            self.x -= dx;
            self.y -= dy;
            return false;
        }
        true
    }

    /// Rotate clockwise in place; reverts and returns false on collision
    ///
    /// O never changes and always succeeds.
    pub fn rotate(&mut self, board: &Board) -> bool {
        if self.shape == Shape::O {
            return true;
        }
        rotate_cw(&mut self.blocks);
        if board.collides(self) {
            rotate_ccw(&mut self.blocks);
            return false;
        }
        true
    }

    /// Rotate clockwise, shifting sideways if the rotation is blocked
    ///
    /// Tries in place, then one column right, then one left; I additionally
    /// tries two right and two left. The first fit is kept. If nothing fits
    /// the piece is left exactly as it was.
    pub fn rotate_with_kick(&mut self, board: &Board) -> bool {
        if self.rotate(board) {
            return true;
        }
        let orig_x = self.x;
        for &kick in kick_offsets(self.shape) {
            self.x = orig_x + kick;
            if self.rotate(board) {
                return true;
            }
        }
        self.x = orig_x;
        false
    }

    /// Row the piece would settle on if dropped straight down
    ///
    /// Returns the current row when the piece already collides.
    pub fn ghost_y(&self, board: &Board) -> i32 {
        let mut trial = *self;
        if board.collides(&trial) {
            return self.y;
        }
        while !board.collides(&trial) {
            trial.y += 1;
        }
        trial.y - 1
    }
}
