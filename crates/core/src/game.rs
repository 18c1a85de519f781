//! Game engine - the falling-piece state machine
//!
//! [`GameEngine`] ties the board, the active piece and the randomizer
//! together and owns everything that evolves over a game: score, level,
//! gravity speed and the demo log.
//!
//! The engine is driven from outside:
//!
//! - [`GameEngine::update`] is polled by the caller's loop and performs a
//!   gravity step once the deadline has passed (or a step was requested);
//! - [`GameEngine::process_input`] applies a player command;
//! - [`GameEngine::force_update`] performs a step unconditionally, which is
//!   how the replay driver reproduces recorded ticks.
//!
//! Every gravity step and every command is appended to the demo log with
//! the elapsed game time, so a finished log replays the game exactly.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::clock::Clock;
use crate::config::GameConfig;
use crate::demo::DemoLog;
use crate::error::{CoreError, FormatResult};
use crate::piece::ActivePiece;
use crate::rng::Randomizer;
use crate::scoring::{advance_level, line_clear_score, step_for_level};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::{
    Command, DemoEvent, Shape, CLEAR_WINDOW, INITIAL_ROWS_TO_NEXT_LEVEL, SHAPE_COUNT,
};

/// Result of one [`GameEngine::update`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Deadline not reached, or the game is paused
    Waiting,
    /// The piece moved down one row
    Fell,
    /// The piece locked and the next one spawned
    Locked { rows: u32 },
    /// The game has ended
    GameOver,
}

/// Result of one [`GameEngine::process_input`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Applied,
    /// Recorded, but the move or rotation did not fit
    Blocked,
    /// Paused: nothing was recorded
    Ignored,
    GameOver,
}

/// Per-game counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    pub score: u32,
    pub rows: u32,
    pub level: u32,
    /// Consecutive clearing locks
    pub combo: u32,
    pub rows_to_next_level: i32,
    pub ghost_y: i32,
    pub next: Shape,
    /// Spawned pieces per shape, indexed by [`Shape::index`]
    pub shape_counts: [u32; SHAPE_COUNT],
    pub ended: bool,
    pub paused: bool,
    pub started_at: u32,
    pub paused_at: Option<u32>,
    pub paused_total: u32,
}

impl GameStats {
    fn new(started_at: u32, next: Shape) -> Self {
        Self {
            score: 0,
            rows: 0,
            level: 0,
            combo: 0,
            rows_to_next_level: INITIAL_ROWS_TO_NEXT_LEVEL,
            ghost_y: 0,
            next,
            shape_counts: [0; SHAPE_COUNT],
            ended: false,
            paused: false,
            started_at,
            paused_at: None,
            paused_total: 0,
        }
    }

    /// Total pieces spawned so far
    pub fn pieces(&self) -> u32 {
        self.shape_counts.iter().sum()
    }
}

/// The game state machine
#[derive(Debug)]
pub struct GameEngine<C: Clock> {
    board: Board,
    stats: GameStats,
    /// `None` only once the game has ended
    active: Option<ActivePiece>,
    randomizer: Randomizer,
    step_ms: u32,
    next_update: u32,
    drop_requested: bool,
    clock: C,
    demo: DemoLog,
}

impl<C: Clock> GameEngine<C> {
    /// Create an engine and start the first game
    ///
    /// `height` includes the hidden spawn rows. Both dimensions must be
    /// non-zero, fit board coordinates (`i32`) and give a cell count that
    /// fits a `u32`.
    pub fn initialize(
        width: u32,
        height: u32,
        randomizer: Randomizer,
        clock: C,
    ) -> Result<Self, CoreError> {
        let coord_max = i32::MAX as u32;
        if width == 0
            || height == 0
            || width > coord_max
            || height > coord_max
            || width.checked_mul(height).is_none()
        {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        let mut engine = Self {
            board: Board::new(width, height),
            stats: GameStats::new(0, Shape::O),
            active: None,
            randomizer,
            step_ms: step_for_level(0),
            next_update: 0,
            drop_requested: false,
            clock,
            demo: DemoLog::new(),
        };
        engine.reset_game();
        Ok(engine)
    }

    /// Create an engine from configuration
    pub fn from_config(config: &GameConfig, clock: C) -> Result<Self, CoreError> {
        Self::initialize(
            config.width,
            config.board_height()?,
            config.build_randomizer(),
            clock,
        )
    }

    /// Start a new game in place
    ///
    /// Clears the board, restarts the randomizer and begins a fresh demo log
    /// holding the first active and next shapes.
    pub fn reset_game(&mut self) {
        let now = self.clock.now_ms();
        self.board.clear();

        let first = self.randomizer.init();
        let next = self.randomizer.next();
        self.demo = DemoLog::new();
        self.demo.add_piece(first);
        self.demo.add_piece(next);

        self.stats = GameStats::new(now, next);
        self.step_ms = step_for_level(0);
        self.drop_requested = false;
        self.next_update = now.wrapping_add(self.step_ms);

        let piece = ActivePiece::spawn(first, self.board.width());
        self.stats.shape_counts[first.index()] += 1;
        self.place_spawned(piece);
        info!(
            width = self.board.width(),
            height = self.board.height(),
            first = %first.symbol(),
            "game started"
        );
    }

    /// Poll the gravity timer, stepping once if it is due
    pub fn update(&mut self) -> StepOutcome {
        if self.stats.ended {
            return StepOutcome::GameOver;
        }
        if self.stats.paused {
            return StepOutcome::Waiting;
        }
        let now = self.clock.now_ms();
        if !self.drop_requested && self.next_update.wrapping_sub(now) <= self.step_ms {
            return StepOutcome::Waiting;
        }
        self.step(now)
    }

    /// Perform a gravity step regardless of the deadline
    pub fn force_update(&mut self) -> StepOutcome {
        if self.stats.ended {
            return StepOutcome::GameOver;
        }
        if self.stats.paused {
            return StepOutcome::Waiting;
        }
        let now = self.clock.now_ms();
        self.step(now)
    }

    fn step(&mut self, now: u32) -> StepOutcome {
        self.drop_requested = false;
        let elapsed = self.elapsed_ms();
        self.demo.add_event(elapsed, DemoEvent::Tick);

        let Some(mut piece) = self.active.take() else {
            self.stats.ended = true;
            return StepOutcome::GameOver;
        };

        if piece.try_move(&self.board, 0, 1) {
            self.active = Some(piece);
            self.next_update = now.wrapping_add(self.step_ms);
            return StepOutcome::Fell;
        }

        let origin_y = piece.y;
        let shape = piece.shape();
        if !self.board.freeze(piece) {
            warn!(shape = %shape.symbol(), y = origin_y, "locked piece overlapped the board");
        }
        let cleared = self
            .board
            .clear_filled_rows((origin_y - 2).max(0) as usize, CLEAR_WINDOW);
        let rows = cleared.len() as u32;
        self.score_clear(rows);
        debug!(shape = %shape.symbol(), y = origin_y, rows, score = self.stats.score, "piece locked");

        if !self.promote_next() {
            return StepOutcome::GameOver;
        }
        self.next_update = now.wrapping_add(self.step_ms);
        StepOutcome::Locked { rows }
    }

    fn score_clear(&mut self, rows: u32) {
        let stats = &mut self.stats;
        if rows == 0 {
            stats.combo = 0;
            return;
        }
        stats.score += line_clear_score(rows, stats.level, stats.combo);
        stats.combo += 1;
        stats.rows += rows;
        let level = advance_level(stats.level, &mut stats.rows_to_next_level, rows);
        if level != stats.level {
            stats.level = level;
            self.step_ms = step_for_level(level);
            info!(level, step_ms = self.step_ms, "level up");
        }
    }

    /// Turn the next shape into the active piece and draw a new next shape
    ///
    /// Returns false when the new piece has no room, ending the game.
    fn promote_next(&mut self) -> bool {
        let shape = self.stats.next;
        let piece = ActivePiece::spawn(shape, self.board.width());
        self.stats.shape_counts[shape.index()] += 1;

        let next = self.randomizer.next();
        self.demo.add_piece(next);
        self.stats.next = next;

        self.place_spawned(piece)
    }

    fn place_spawned(&mut self, piece: ActivePiece) -> bool {
        if self.board.collides(&piece) {
            self.active = None;
            self.stats.ghost_y = piece.y;
            self.stats.ended = true;
            info!(
                score = self.stats.score,
                rows = self.stats.rows,
                level = self.stats.level,
                "game over"
            );
            return false;
        }
        self.stats.ghost_y = piece.ghost_y(&self.board);
        self.active = Some(piece);
        true
    }

    /// Apply a player command
    ///
    /// The command is logged before it is applied, so blocked moves are part
    /// of the demo too.
    pub fn process_input(&mut self, command: Command) -> InputOutcome {
        if self.stats.ended {
            return InputOutcome::GameOver;
        }
        if self.stats.paused || self.active.is_none() {
            return InputOutcome::Ignored;
        }
        let elapsed = self.elapsed_ms();
        self.demo.add_event(elapsed, DemoEvent::Input(command));

        let Some(piece) = self.active.as_mut() else {
            return InputOutcome::Ignored;
        };
        let moved = match command {
            Command::Left => piece.try_move(&self.board, -1, 0),
            Command::Right => piece.try_move(&self.board, 1, 0),
            Command::Rotate => piece.rotate_with_kick(&self.board),
            Command::Down => {
                self.drop_requested = true;
                return InputOutcome::Applied;
            }
            Command::HardDrop => {
                piece.y = self.stats.ghost_y;
                self.drop_requested = true;
                return InputOutcome::Applied;
            }
        };
        if !moved {
            return InputOutcome::Blocked;
        }
        self.stats.ghost_y = piece.ghost_y(&self.board);
        InputOutcome::Applied
    }

    /// Pause or resume, returning whether the game is now paused
    ///
    /// Time spent paused is excluded from the elapsed game time, and the
    /// gravity deadline moves by the same amount on resume.
    pub fn toggle_pause(&mut self) -> bool {
        if self.stats.ended {
            return self.stats.paused;
        }
        let now = self.clock.now_ms();
        match self.stats.paused_at.take() {
            Some(since) => {
                let span = now.wrapping_sub(since);
                self.stats.paused_total = self.stats.paused_total.wrapping_add(span);
                self.next_update = self.next_update.wrapping_add(span);
                self.stats.paused = false;
                debug!(span_ms = span, "resumed");
            }
            None => {
                self.stats.paused_at = Some(now);
                self.stats.paused = true;
                debug!("paused");
            }
        }
        self.stats.paused
    }

    /// Game time in milliseconds, pauses excluded
    pub fn elapsed_ms(&self) -> u32 {
        let now = self.clock.now_ms();
        let mut elapsed = now
            .wrapping_sub(self.stats.started_at)
            .wrapping_sub(self.stats.paused_total);
        if let Some(since) = self.stats.paused_at {
            elapsed = elapsed.wrapping_sub(now.wrapping_sub(since));
        }
        elapsed
    }

    /// Persist the demo log and release the engine
    pub fn finish(self, path: impl AsRef<std::path::Path>) -> FormatResult<usize> {
        self.demo.save(path)
    }

    /// Release the engine, keeping only its demo log
    pub fn into_demo(self) -> DemoLog {
        self.demo
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn next_shape(&self) -> Shape {
        self.stats.next
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn demo(&self) -> &DemoLog {
        &self.demo
    }

    pub fn randomizer(&self) -> &Randomizer {
        &self.randomizer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current gravity interval
    pub fn step_ms(&self) -> u32 {
        self.step_ms
    }

    pub fn is_game_over(&self) -> bool {
        self.stats.ended
    }

    pub fn is_paused(&self) -> bool {
        self.stats.paused
    }

    /// Copy of the state for the presentation layer
    pub fn snapshot(&self) -> GameSnapshot {
        let board = self
            .board
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or(0, |shape| shape.id() as u8 + 1))
                    .collect()
            })
            .collect();
        GameSnapshot {
            width: self.board.width(),
            height: self.board.height(),
            board,
            active: self.active.as_ref().map(ActiveSnapshot::from),
            ghost_y: self.active.as_ref().map(|_| self.stats.ghost_y),
            next: self.stats.next,
            score: self.stats.score,
            rows: self.stats.rows,
            level: self.stats.level,
            combo: self.stats.combo,
            elapsed_ms: self.elapsed_ms(),
            step_ms: self.step_ms,
            shape_counts: self.stats.shape_counts,
            paused: self.stats.paused,
            game_over: self.stats.ended,
        }
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::types::RandomizerKind;

    fn engine_with(shapes: Vec<Shape>) -> (GameEngine<VirtualClock>, VirtualClock) {
        let clock = VirtualClock::new(0);
        let engine =
            GameEngine::initialize(10, 22, Randomizer::recorded(shapes), clock.clone()).unwrap();
        (engine, clock)
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let err = GameEngine::initialize(
            0,
            22,
            Randomizer::new(RandomizerKind::Bag, 1),
            VirtualClock::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidDimensions {
                width: 0,
                height: 22
            }
        );
    }

    #[test]
    fn test_rejects_oversized_dimensions() {
        for (width, height) in [(70_000, 70_000), (u32::MAX, 1), (1, i32::MAX as u32 + 1)] {
            let err = GameEngine::initialize(
                width,
                height,
                Randomizer::new(RandomizerKind::Bag, 1),
                VirtualClock::default(),
            )
            .unwrap_err();
            assert_eq!(err, CoreError::InvalidDimensions { width, height });
        }

        let config = crate::config::GameConfig {
            visible_height: u32::MAX,
            ..Default::default()
        };
        let err = GameEngine::from_config(&config, VirtualClock::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_new_game_state() {
        let (engine, _) = engine_with(vec![Shape::T, Shape::I, Shape::O]);
        let active = engine.active().unwrap();
        assert_eq!(active.shape(), Shape::T);
        assert_eq!((active.x, active.y), (4, 2));
        assert_eq!(engine.next_shape(), Shape::I);
        assert_eq!(engine.demo().pieces(), &[Shape::T, Shape::I]);
        assert_eq!(engine.stats().ghost_y, 21);
        assert_eq!(engine.stats().rows_to_next_level, 2);
        assert_eq!(engine.stats().pieces(), 1);
        assert_eq!(engine.step_ms(), 1200);
    }

    #[test]
    fn test_update_waits_for_deadline() {
        let (mut engine, clock) = engine_with(vec![Shape::T, Shape::I]);
        assert_eq!(engine.update(), StepOutcome::Waiting);
        clock.set(1200);
        assert_eq!(engine.update(), StepOutcome::Waiting);
        clock.set(1201);
        assert_eq!(engine.update(), StepOutcome::Fell);
        assert_eq!(engine.active().unwrap().y, 3);
        assert_eq!(engine.demo().instructions()[0].time_ms, 1201);
        assert_eq!(
            engine.demo().instructions()[0].event(),
            Some(DemoEvent::Tick)
        );
        // Deadline moved forward
        assert_eq!(engine.update(), StepOutcome::Waiting);
    }

    #[test]
    fn test_input_is_logged_before_applying() {
        let (mut engine, clock) = engine_with(vec![Shape::O, Shape::O]);
        clock.set(40);
        for _ in 0..4 {
            assert_eq!(engine.process_input(Command::Left), InputOutcome::Applied);
        }
        // O sits against the left wall now
        assert_eq!(engine.process_input(Command::Left), InputOutcome::Blocked);
        assert_eq!(engine.active().unwrap().x, 0);
        assert_eq!(engine.demo().instruction_count(), 5);
        assert!(engine
            .demo()
            .instructions()
            .iter()
            .all(|ins| ins.time_ms == 40 && ins.code == Command::Left.code()));
    }

    #[test]
    fn test_down_forces_next_step() {
        let (mut engine, _) = engine_with(vec![Shape::T, Shape::I]);
        assert_eq!(engine.process_input(Command::Down), InputOutcome::Applied);
        assert_eq!(engine.update(), StepOutcome::Fell);
        assert_eq!(engine.update(), StepOutcome::Waiting);
    }

    #[test]
    fn test_hard_drop_locks_on_next_step() {
        let (mut engine, _) = engine_with(vec![Shape::T, Shape::I, Shape::Z]);
        assert_eq!(engine.process_input(Command::HardDrop), InputOutcome::Applied);
        assert_eq!(engine.active().unwrap().y, 21);
        assert_eq!(engine.update(), StepOutcome::Locked { rows: 0 });
        assert_eq!(engine.board().occupied_count(), 4);
        assert_eq!(engine.active().unwrap().shape(), Shape::I);
        assert_eq!(engine.next_shape(), Shape::Z);
        assert_eq!(engine.demo().pieces(), &[Shape::T, Shape::I, Shape::Z]);
        assert_eq!(engine.stats().combo, 0);
    }

    #[test]
    fn test_line_clear_scores() {
        let (mut engine, _) = engine_with(vec![Shape::I, Shape::O, Shape::O]);
        for x in (0..3).chain(7..10) {
            engine.board_mut().set(x, 21, Some(Shape::Z));
        }
        engine.process_input(Command::HardDrop);
        assert_eq!(engine.update(), StepOutcome::Locked { rows: 1 });
        let stats = engine.stats();
        assert_eq!(stats.score, 50);
        assert_eq!(stats.rows, 1);
        assert_eq!(stats.combo, 1);
        assert_eq!(stats.rows_to_next_level, 1);
        assert_eq!(engine.board().occupied_count(), 0);
    }

    #[test]
    fn test_spawn_collision_ends_game() {
        let clock = VirtualClock::new(0);
        let mut engine =
            GameEngine::initialize(10, 4, Randomizer::recorded(vec![Shape::O]), clock).unwrap();
        engine.process_input(Command::HardDrop);
        assert_eq!(engine.update(), StepOutcome::GameOver);
        assert!(engine.is_game_over());
        assert!(engine.active().is_none());
        assert_eq!(engine.update(), StepOutcome::GameOver);
        assert_eq!(engine.process_input(Command::Left), InputOutcome::GameOver);
    }

    #[test]
    fn test_pause_excludes_time() {
        let (mut engine, clock) = engine_with(vec![Shape::T, Shape::I]);
        clock.set(100);
        assert!(engine.toggle_pause());
        clock.set(600);
        assert_eq!(engine.elapsed_ms(), 100);
        assert_eq!(engine.process_input(Command::Left), InputOutcome::Ignored);
        assert_eq!(engine.update(), StepOutcome::Waiting);
        assert!(engine.demo().instructions().is_empty());

        assert!(!engine.toggle_pause());
        assert_eq!(engine.elapsed_ms(), 100);
        clock.set(1700);
        assert_eq!(engine.update(), StepOutcome::Waiting);
        clock.set(1701);
        assert_eq!(engine.update(), StepOutcome::Fell);
        assert_eq!(engine.demo().instructions()[0].time_ms, 1201);
    }

    #[test]
    fn test_reset_game_starts_over() {
        let (mut engine, clock) = engine_with(vec![Shape::L, Shape::J, Shape::S]);
        engine.process_input(Command::HardDrop);
        engine.update();
        clock.set(5000);
        engine.reset_game();
        assert_eq!(engine.board().occupied_count(), 0);
        assert_eq!(engine.active().unwrap().shape(), Shape::L);
        assert_eq!(engine.demo().pieces(), &[Shape::L, Shape::J]);
        assert!(engine.demo().instructions().is_empty());
        assert_eq!(engine.elapsed_ms(), 0);
        assert_eq!(engine.stats().score, 0);
    }

    #[test]
    fn test_snapshot_encodes_cells() {
        let (mut engine, _) = engine_with(vec![Shape::I, Shape::T]);
        engine.board_mut().set(0, 21, Some(Shape::Z));
        let snap = engine.snapshot();
        assert_eq!(snap.board.len(), 22);
        assert_eq!(snap.board[21][0], Shape::Z.id() as u8 + 1);
        assert_eq!(snap.board[0][0], 0);
        let active = snap.active.unwrap();
        assert_eq!(active.shape, Shape::I);
        assert_eq!(active.cells, [(4, 2), (3, 2), (5, 2), (6, 2)]);
        assert_eq!(snap.ghost_y, Some(21));
        assert_eq!(snap.next, Shape::T);
        assert!(snap.playable());
    }
}
