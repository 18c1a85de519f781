//! Interactive play session
//!
//! [`PlaySession`] is the state a frontend needs around one engine: which
//! keys are allowed when, whether the demo was already written, and how a
//! finished game turns into a ranking entry.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use blockfall_core::{
    Clock, FormatResult, GameEngine, InputOutcome, RankEntry, RankingTable, StepOutcome,
};

use crate::types::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
    Quit,
}

/// What a handled [`InputEvent`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionResponse {
    Input(InputOutcome),
    Paused,
    Resumed,
    /// Demo written, with its size in bytes
    DemoSaved(usize),
    /// Saving is only possible once per finished game
    SaveRejected,
    Quit,
}

/// One game plus the frontend state around it
#[derive(Debug)]
pub struct PlaySession<C: Clock> {
    engine: GameEngine<C>,
    demo_path: PathBuf,
    demo_saved: bool,
    quit: bool,
}

impl<C: Clock> PlaySession<C> {
    pub fn new(engine: GameEngine<C>, demo_path: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            demo_path: demo_path.into(),
            demo_saved: false,
            quit: false,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.quit {
            SessionState::Quit
        } else if self.engine.is_game_over() {
            SessionState::GameOver
        } else if self.engine.is_paused() {
            SessionState::Paused
        } else {
            SessionState::Playing
        }
    }

    /// Route an input event
    ///
    /// Only quit is accepted after quitting. Saving the demo writes the file
    /// and fails only on I/O.
    pub fn handle(&mut self, event: InputEvent) -> FormatResult<SessionResponse> {
        if self.quit {
            return Ok(SessionResponse::Quit);
        }
        let response = match event {
            InputEvent::Command(command) => {
                SessionResponse::Input(self.engine.process_input(command))
            }
            InputEvent::Pause => {
                if self.engine.toggle_pause() {
                    SessionResponse::Paused
                } else {
                    SessionResponse::Resumed
                }
            }
            InputEvent::SaveDemo => {
                if !self.engine.is_game_over() || self.demo_saved {
                    SessionResponse::SaveRejected
                } else {
                    let written = self.engine.demo().save(&self.demo_path)?;
                    self.demo_saved = true;
                    SessionResponse::DemoSaved(written)
                }
            }
            InputEvent::Quit => {
                self.quit = true;
                info!(
                    score = self.engine.stats().score,
                    elapsed_ms = self.engine.elapsed_ms(),
                    "session quit"
                );
                SessionResponse::Quit
            }
        };
        Ok(response)
    }

    /// Poll gravity once
    pub fn tick(&mut self) -> StepOutcome {
        if self.quit {
            return StepOutcome::Waiting;
        }
        self.engine.update()
    }

    /// Ranking entry for the game as it stands
    pub fn rank_entry(&self, name: &str, date: u32) -> RankEntry {
        let stats = self.engine.stats();
        RankEntry::new(
            stats.score,
            stats.rows,
            stats.level,
            self.engine.elapsed_ms(),
            date,
            name,
        )
    }

    pub fn demo_saved(&self) -> bool {
        self.demo_saved
    }

    pub fn demo_path(&self) -> &Path {
        &self.demo_path
    }

    pub fn engine(&self) -> &GameEngine<C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GameEngine<C> {
        &mut self.engine
    }

    pub fn into_engine(self) -> GameEngine<C> {
        self.engine
    }

    /// Tear the session down, writing the demo unless it was already saved
    ///
    /// Returns the bytes written, or `None` when there was nothing to write.
    pub fn finish(self) -> FormatResult<Option<usize>> {
        if self.demo_saved {
            return Ok(None);
        }
        let written = self.engine.finish(&self.demo_path)?;
        Ok(Some(written))
    }
}

/// Insert `entry` and persist the table if it qualified
///
/// Returns the rank; a rank equal to the table length means the table was
/// left untouched and nothing was written.
pub fn record_score(
    table: &mut RankingTable,
    entry: RankEntry,
    path: impl AsRef<Path>,
) -> FormatResult<usize> {
    let score = entry.score;
    let rank = table.insert(entry);
    if rank >= table.len() {
        info!(score, "score did not qualify for the ranking");
        return Ok(rank);
    }
    table.save(path)?;
    info!(score, rank, "score ranked");
    Ok(rank)
}

/// Current time as Unix seconds, for ranking dates
pub fn epoch_seconds() -> u32 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as u32,
        Err(err) => {
            warn!(%err, "system clock before Unix epoch");
            0
        }
    }
}
