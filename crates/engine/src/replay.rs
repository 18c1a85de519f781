//! Demo playback
//!
//! [`DemoPlayer`] drives a fresh [`GameEngine`] from a recorded [`DemoLog`].
//! The engine runs on a [`VirtualClock`] that the player sets to each
//! instruction's timestamp before applying it, so recorded elapsed times are
//! reproduced exactly and the replayed game records an identical log.
//!
//! Gravity is never polled during playback. Every step the original game
//! took is a `Tick` instruction and is replayed with
//! [`GameEngine::force_update`].

use std::fmt;

use tracing::{debug, info, warn};

use blockfall_core::{
    CoreError, DemoLog, GameConfig, GameEngine, Instruction, Randomizer, VirtualClock,
};

use crate::types::DemoEvent;

/// State of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    /// Nothing applied yet
    Idle,
    Playing,
    /// Time scale is zero
    Paused,
    /// Every instruction has been applied
    Finished,
}

/// Position within the instruction log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub applied: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction: {} of {}", self.applied, self.total)
    }
}

/// Replays a demo log against a fresh engine
#[derive(Debug)]
pub struct DemoPlayer {
    engine: GameEngine<VirtualClock>,
    clock: VirtualClock,
    instructions: Vec<Instruction>,
    cursor: usize,
    virtual_ms: f64,
    time_scale: f64,
    skipped: usize,
}

impl DemoPlayer {
    /// Prepare playback on a board of the given size
    ///
    /// `height` includes the hidden spawn rows, as in
    /// [`GameEngine::initialize`].
    pub fn new(demo: &DemoLog, width: u32, height: u32) -> Result<Self, CoreError> {
        let clock = VirtualClock::new(0);
        let randomizer = Randomizer::recorded(demo.pieces().to_vec());
        let engine = GameEngine::initialize(width, height, randomizer, clock.clone())?;
        info!(
            pieces = demo.piece_count(),
            instructions = demo.instruction_count(),
            "demo playback ready"
        );
        Ok(Self {
            engine,
            clock,
            instructions: demo.instructions().to_vec(),
            cursor: 0,
            virtual_ms: 0.0,
            time_scale: 1.0,
            skipped: 0,
        })
    }

    /// Prepare playback using the board size from configuration
    pub fn from_config(demo: &DemoLog, config: &GameConfig) -> Result<Self, CoreError> {
        Self::new(demo, config.width, config.board_height()?)
    }

    /// Set the playback speed multiplier
    ///
    /// Negative and NaN values clamp to zero, which pauses playback.
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = if scale.is_nan() { 0.0 } else { scale.max(0.0) };
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Advance playback by `real_delta_ms` of wall time
    ///
    /// Applies every instruction whose timestamp is at or before the new
    /// virtual time and returns how many were applied.
    pub fn advance(&mut self, real_delta_ms: f64) -> usize {
        if real_delta_ms > 0.0 {
            self.virtual_ms += real_delta_ms * self.time_scale;
        }
        let mut applied = 0;
        while let Some(&instruction) = self.instructions.get(self.cursor) {
            if f64::from(instruction.time_ms) > self.virtual_ms {
                break;
            }
            self.apply(instruction);
            self.cursor += 1;
            applied += 1;
        }
        if applied > 0 && self.is_finished() {
            info!(
                score = self.engine.stats().score,
                rows = self.engine.stats().rows,
                skipped = self.skipped,
                "demo ended"
            );
        }
        applied
    }

    /// Apply everything that is left, ignoring the time scale
    pub fn run_to_end(&mut self) -> usize {
        let Some(last) = self.instructions.last() else {
            return 0;
        };
        self.virtual_ms = self.virtual_ms.max(f64::from(last.time_ms));
        let scale = self.time_scale;
        self.time_scale = 1.0;
        let applied = self.advance(0.0);
        self.time_scale = scale;
        applied
    }

    fn apply(&mut self, instruction: Instruction) {
        self.clock.set(instruction.time_ms);
        match instruction.event() {
            Some(DemoEvent::Tick) => {
                let outcome = self.engine.force_update();
                debug!(time_ms = instruction.time_ms, ?outcome, "tick");
            }
            Some(DemoEvent::Input(command)) => {
                let outcome = self.engine.process_input(command);
                debug!(time_ms = instruction.time_ms, ?command, ?outcome, "input");
            }
            None => {
                self.skipped += 1;
                warn!(
                    time_ms = instruction.time_ms,
                    code = instruction.code,
                    "skipping unknown instruction"
                );
            }
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            applied: self.cursor,
            total: self.instructions.len(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.instructions.len()
    }

    pub fn state(&self) -> ReplayState {
        if self.is_finished() {
            ReplayState::Finished
        } else if self.time_scale == 0.0 {
            ReplayState::Paused
        } else if self.cursor == 0 {
            ReplayState::Idle
        } else {
            ReplayState::Playing
        }
    }

    /// Progress line for the presentation layer
    pub fn status_line(&self) -> String {
        let progress = self.progress();
        if self.is_finished() {
            format!("{progress} - DEMO ENDED")
        } else {
            progress.to_string()
        }
    }

    /// Virtual playback time in milliseconds
    pub fn virtual_ms(&self) -> f64 {
        self.virtual_ms
    }

    /// Instructions skipped because their code was unknown
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn engine(&self) -> &GameEngine<VirtualClock> {
        &self.engine
    }

    pub fn into_engine(self) -> GameEngine<VirtualClock> {
        self.engine
    }
}
