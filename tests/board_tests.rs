//! Board and piece movement tests

use blockfall::core::pieces::{get_shape, rotate_ccw, rotate_cw, spawn_origin};
use blockfall::core::{ActivePiece, Board};
use blockfall::types::{Shape, BOARD_HEIGHT, BOARD_WIDTH};

fn fill_row(board: &mut Board, y: i32) {
    for x in 0..board.width() as i32 {
        board.set(x, y, Some(Shape::J));
    }
}

#[test]
fn test_board_new_empty() {
    let board = Board::new(BOARD_WIDTH, BOARD_HEIGHT);
    assert_eq!(board.width(), BOARD_WIDTH);
    assert_eq!(board.height(), BOARD_HEIGHT);
    assert_eq!(board.occupied_count(), 0);
    assert_eq!(board.rows().count(), BOARD_HEIGHT as usize);
}

#[test]
fn test_out_of_bounds_is_never_free() {
    let board = Board::new(10, 22);
    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(10, 0), None);
    assert_eq!(board.get(0, 22), None);
    assert!(!board.is_free(-1, 5));
    assert!(!board.is_free(0, 22));
    assert!(board.is_free(9, 21));
}

#[test]
fn test_freeze_adds_exactly_four_cells() {
    let mut board = Board::new(10, 22);
    for (i, shape) in Shape::ALL.into_iter().enumerate() {
        let piece = ActivePiece::at(shape, 4, 3 + 3 * i as i32);
        let before = board.occupied_count();
        assert!(board.freeze(piece));
        assert_eq!(board.occupied_count(), before + 4, "{shape:?}");
        for (x, y) in piece.cells() {
            assert_eq!(board.get(x, y), Some(Some(shape)));
        }
    }
}

#[test]
fn test_freeze_refuses_overlap() {
    let mut board = Board::new(10, 22);
    board.set(4, 10, Some(Shape::O));
    let snapshot = board.clone();
    assert!(!board.freeze(ActivePiece::at(Shape::T, 4, 10)));
    assert_eq!(board, snapshot);
}

#[test]
fn test_rotate_cw_then_ccw_is_identity() {
    for shape in Shape::ALL {
        let original = get_shape(shape);
        let mut offsets = original;
        rotate_cw(&mut offsets);
        rotate_ccw(&mut offsets);
        assert_eq!(offsets, original, "{shape:?}");

        // Four quarter turns come back around
        for _ in 0..4 {
            rotate_cw(&mut offsets);
        }
        assert_eq!(offsets, original, "{shape:?}");
    }
}

#[test]
fn test_spawn_positions() {
    assert_eq!(spawn_origin(Shape::T, 10), (4, 2));
    assert_eq!(spawn_origin(Shape::O, 10), (4, 1));
    let board = Board::new(10, 22);
    for shape in Shape::ALL {
        let piece = ActivePiece::spawn(shape, 10);
        assert!(!board.collides(&piece), "{shape:?}");
        // Every spawn touches the first visible row
        assert!(piece.cells().iter().any(|&(_, y)| y == 2), "{shape:?}");
    }
}

#[test]
fn test_rotation_kicks_off_the_right_wall() {
    let board = Board::new(10, 22);
    let mut piece = ActivePiece::at(Shape::I, 5, 10);
    assert!(piece.rotate(&board));
    while piece.try_move(&board, 1, 0) {}
    assert_eq!(piece.x, 9);

    // Horizontal again would poke out of the right wall; one step left fits
    assert!(piece.rotate_with_kick(&board));
    assert_eq!(piece.x, 8);
    assert!(!board.collides(&piece));
}

#[test]
fn test_failed_kick_leaves_piece_untouched() {
    let mut board = Board::new(10, 22);
    // A one-wide shaft around column 4
    for y in 8..14 {
        for x in 0..10 {
            if x != 4 {
                board.set(x, y, Some(Shape::Z));
            }
        }
    }
    let mut piece = ActivePiece::at(Shape::I, 4, 10);
    assert!(piece.rotate(&board));
    let before = piece;

    assert!(!piece.rotate_with_kick(&board));
    assert_eq!(piece, before);
}

#[test]
fn test_blocked_move_reverts() {
    let board = Board::new(10, 22);
    let mut piece = ActivePiece::at(Shape::O, 0, 20);
    let before = piece;
    assert!(!piece.try_move(&board, -1, 0));
    assert!(!piece.try_move(&board, 0, 1));
    assert_eq!(piece, before);
}

#[test]
fn test_ghost_row() {
    let mut board = Board::new(10, 22);
    let piece = ActivePiece::spawn(Shape::T, 10);
    assert_eq!(piece.ghost_y(&board), 21);

    board.set(4, 15, Some(Shape::O));
    assert_eq!(piece.ghost_y(&board), 14);
}

#[test]
fn test_collapse_stops_at_first_empty_row() {
    let mut board = Board::new(10, 22);
    fill_row(&mut board, 21);
    board.set(0, 20, Some(Shape::S));
    // Row 19 is empty, so the block on row 18 stays put
    board.set(3, 18, Some(Shape::L));

    assert!(board.clear_and_collapse(21));
    assert_eq!(board.get(0, 21), Some(Some(Shape::S)));
    assert_eq!(board.get(0, 20), Some(None));
    assert_eq!(board.get(3, 18), Some(Some(Shape::L)));
    assert_eq!(board.occupied_count(), 2);
}

#[test]
fn test_clear_window_rechecks_collapsed_row() {
    let mut board = Board::new(10, 22);
    fill_row(&mut board, 20);
    fill_row(&mut board, 21);
    board.set(5, 19, Some(Shape::T));

    let cleared = board.clear_filled_rows(17, 5);
    assert_eq!(cleared.as_slice(), &[21, 21]);
    assert_eq!(board.get(5, 21), Some(Some(Shape::T)));
    assert_eq!(board.occupied_count(), 1);
}

#[test]
fn test_clear_window_ignores_rows_outside() {
    let mut board = Board::new(10, 22);
    fill_row(&mut board, 10);
    assert!(board.clear_filled_rows(17, 5).is_empty());
    assert!(board.is_row_full(10));

    let cleared = board.clear_filled_rows(8, 5);
    assert_eq!(cleared.as_slice(), &[10]);
    assert!(!board.is_row_full(10));
}

#[test]
fn test_clear_window_is_capped() {
    let mut board = Board::new(4, 22);
    for y in 14..22 {
        fill_row(&mut board, y);
    }
    // A window wider than five rows still only scans five steps
    let cleared = board.clear_filled_rows(14, 8);
    assert_eq!(cleared.len(), 5);
    assert_eq!(board.occupied_count(), 3 * 4);
}
