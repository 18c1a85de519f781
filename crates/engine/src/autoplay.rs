//! Scripted play
//!
//! [`plan_placement`] turns a target column and rotation count into the
//! command sequence that reaches it, [`apply_placement`] feeds that sequence
//! to an engine, and [`AutoPlayer`] picks placements with a small board
//! heuristic so whole games can be recorded without a human.

use thiserror::Error;
use tracing::debug;

use blockfall_core::{
    ActivePiece, Board, Clock, GameEngine, InputOutcome, SimpleRng, StepOutcome, VirtualClock,
};

use crate::types::Command;

/// Why a placement could not be planned or applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("could not rotate to target rotation")]
    RotationBlocked,
    #[error("target x would place piece out of bounds")]
    XOutOfBounds,
    #[error("could not move to target x due to collision")]
    XBlocked,
    #[error("game is not playable")]
    NotPlayable,
    #[error("no active piece")]
    NoActive,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::NotPlayable | PlaceError::NoActive => "not_playable",
            PlaceError::RotationBlocked | PlaceError::XOutOfBounds | PlaceError::XBlocked => {
                "invalid_place"
            }
        }
    }
}

/// Target for the active piece: origin column after `rotations` clockwise turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub x: i32,
    pub rotations: u8,
}

/// Commands that move `piece` to `target` and drop it
///
/// Rotations come first (with wall kicks, exactly as the engine applies
/// them), then single-column moves, then a hard drop. Nothing is mutated.
pub fn plan_placement(
    board: &Board,
    piece: &ActivePiece,
    target: Placement,
) -> Result<Vec<Command>, PlaceError> {
    Ok(simulate(board, piece, target)?.0)
}

fn simulate(
    board: &Board,
    piece: &ActivePiece,
    target: Placement,
) -> Result<(Vec<Command>, ActivePiece), PlaceError> {
    let mut trial = *piece;
    let mut commands = Vec::new();

    for _ in 0..target.rotations % 4 {
        if !trial.rotate_with_kick(board) {
            return Err(PlaceError::RotationBlocked);
        }
        commands.push(Command::Rotate);
    }

    let (min_dx, max_dx) = trial
        .blocks()
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), &(dx, _)| {
            (lo.min(dx), hi.max(dx))
        });
    if target.x + min_dx < 0 || target.x + max_dx >= board.width() as i32 {
        return Err(PlaceError::XOutOfBounds);
    }

    let dx = target.x - trial.x;
    let (step, command) = if dx < 0 {
        (-1, Command::Left)
    } else {
        (1, Command::Right)
    };
    for _ in 0..dx.abs() {
        if !trial.try_move(board, step, 0) {
            return Err(PlaceError::XBlocked);
        }
        commands.push(command);
    }

    commands.push(Command::HardDrop);
    trial.y = trial.ghost_y(board);
    Ok((commands, trial))
}

/// Plan a placement against the engine's current piece and feed it in
///
/// Returns the number of commands sent. The piece locks on the engine's
/// next update.
pub fn apply_placement<C: Clock>(
    engine: &mut GameEngine<C>,
    target: Placement,
) -> Result<usize, PlaceError> {
    if engine.is_paused() || engine.is_game_over() {
        return Err(PlaceError::NotPlayable);
    }
    let Some(piece) = engine.active().copied() else {
        return Err(PlaceError::NoActive);
    };
    let commands = plan_placement(engine.board(), &piece, target)?;
    for &command in &commands {
        if engine.process_input(command) == InputOutcome::GameOver {
            return Err(PlaceError::NotPlayable);
        }
    }
    Ok(commands.len())
}

/// Summary of one scripted game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoplayReport {
    pub pieces: u32,
    pub rows: u32,
    pub game_over: bool,
}

/// Seeded scripted player
///
/// Scores every reachable placement by rows cleared, holes and stack height,
/// breaking ties with its own RNG. Idle waits and per-command delays are
/// drawn from the same RNG, so a seed fixes the whole recorded game.
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    rng: SimpleRng,
}

impl AutoPlayer {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Best placement for the current piece, if any is reachable
    pub fn choose<C: Clock>(&mut self, engine: &GameEngine<C>) -> Option<Placement> {
        let piece = engine.active()?;
        let board = engine.board();
        let mut best: Option<(i64, u32, Placement)> = None;

        for rotations in 0..4u8 {
            for x in 0..board.width() as i32 {
                let target = Placement { x, rotations };
                let Ok((_, landed)) = simulate(board, piece, target) else {
                    continue;
                };
                let score = evaluate(board, landed);
                let tie = self.rng.next_u32();
                let better = match best {
                    None => true,
                    Some((s, t, _)) => score > s || (score == s && tie > t),
                };
                if better {
                    best = Some((score, tie, target));
                }
            }
        }
        best.map(|(_, _, target)| target)
    }

    /// Play until the game ends or `max_pieces` pieces have locked
    ///
    /// Time only moves through `clock`, so the caller decides how a game
    /// maps to wall time.
    pub fn play(
        &mut self,
        engine: &mut GameEngine<VirtualClock>,
        clock: &VirtualClock,
        max_pieces: u32,
    ) -> AutoplayReport {
        let mut report = AutoplayReport::default();

        while report.pieces < max_pieces {
            // Let gravity act for a while first
            for _ in 0..self.rng.next_range(3) {
                clock.advance(engine.step_ms() + 1);
                if let StepOutcome::Locked { rows } = engine.update() {
                    report.pieces += 1;
                    report.rows += rows;
                }
            }
            if engine.is_game_over() || report.pieces >= max_pieces {
                break;
            }

            match self.choose(engine) {
                Some(target) => {
                    for _ in 0..=target.rotations {
                        clock.advance(16 + self.rng.next_range(48));
                    }
                    if let Err(err) = apply_placement(engine, target) {
                        debug!(%err, "placement rejected, dropping in place");
                        engine.process_input(Command::HardDrop);
                    }
                }
                None => {
                    engine.process_input(Command::HardDrop);
                }
            }

            clock.advance(1 + self.rng.next_range(16));
            match engine.update() {
                StepOutcome::Locked { rows } => {
                    report.pieces += 1;
                    report.rows += rows;
                }
                StepOutcome::GameOver => break,
                StepOutcome::Waiting | StepOutcome::Fell => {}
            }
        }

        report.game_over = engine.is_game_over();
        report
    }
}

/// Heuristic value of freezing `landed` onto `board` (higher is better)
fn evaluate(board: &Board, landed: ActivePiece) -> i64 {
    let mut board = board.clone();
    if !board.freeze(landed) {
        return i64::MIN;
    }
    let width = board.width() as usize;
    let height = board.height() as usize;

    let full_rows = (0..height).filter(|&row| board.is_row_full(row)).count() as i64;

    let mut heights = vec![0i64; width];
    let mut holes = 0i64;
    for (y, row) in board.rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            if cell.is_some() {
                if heights[x] == 0 {
                    heights[x] = (height - y) as i64;
                }
            } else if heights[x] > 0 {
                holes += 1;
            }
        }
    }
    let aggregate: i64 = heights.iter().sum();
    let bumpiness: i64 = heights.windows(2).map(|w| (w[0] - w[1]).abs()).sum();

    full_rows * 100 - holes * 40 - aggregate * 2 - bumpiness * 3
}
