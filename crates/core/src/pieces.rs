//! Pieces module - shape catalog and spawn geometry
//!
//! Each shape is four unit blocks given as offsets from the piece origin.
//! Block 0 is always the anchor at `(0, 0)`; rotation pivots around it.
//! Negative `dy` points up.

use crate::types::{Shape, HIDDEN_ROWS};

/// Offset of a single block relative to the piece origin
pub type BlockOffset = (i32, i32);

/// Geometry of a piece - 4 block offsets from the origin
pub type PieceShape = [BlockOffset; 4];

/// Get the spawn geometry for a shape
pub fn get_shape(shape: Shape) -> PieceShape {
    match shape {
        Shape::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
        Shape::I => [(0, 0), (-1, 0), (1, 0), (2, 0)],
        Shape::T => [(0, 0), (0, -1), (1, 0), (-1, 0)],
        Shape::L => [(0, 0), (-1, 0), (1, 0), (1, -1)],
        Shape::J => [(0, 0), (-1, 0), (1, 0), (-1, -1)],
        Shape::S => [(0, 0), (-1, 0), (0, -1), (1, -1)],
        Shape::Z => [(0, 0), (1, 0), (0, -1), (-1, -1)],
    }
}

/// Spawn origin for a shape on a board of the given width
///
/// The origin sits just left of centre on the first visible row. O extends
/// downward instead of upward, so it starts one row higher.
pub fn spawn_origin(shape: Shape, board_width: u32) -> (i32, i32) {
    let x = (board_width / 2) as i32 - 1;
    let y = HIDDEN_ROWS as i32;
    match shape {
        Shape::O => (x, y - 1),
        _ => (x, y),
    }
}

/// Rotate offsets 90 degrees clockwise: `(x, y) -> (-y, x)`
#[inline]
pub fn rotate_cw(offsets: &mut PieceShape) {
    for (x, y) in offsets.iter_mut() {
        let old_x = *x;
        *x = -*y;
        *y = old_x;
    }
}

/// Inverse of [`rotate_cw`]: `(x, y) -> (y, -x)`
#[inline]
pub fn rotate_ccw(offsets: &mut PieceShape) {
    for (x, y) in offsets.iter_mut() {
        let old_x = *x;
        *x = *y;
        *y = -old_x;
    }
}

/// Kick offsets tried (in order) after an in-place rotation fails
pub fn kick_offsets(shape: Shape) -> &'static [i32] {
    match shape {
        Shape::I => &[1, -1, 2, -2],
        _ => &[1, -1],
    }
}
