//! Game configuration
//!
//! Defaults describe the classic 10x20 game. [`GameConfig::from_env`] lets
//! every field be overridden through `BLOCKFALL_*` environment variables;
//! unparsable values fall back to the default.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::rng::Randomizer;
use crate::types::{RandomizerKind, BOARD_WIDTH, HIDDEN_ROWS, VISIBLE_HEIGHT};

/// Default number of entries in the ranking table
pub const DEFAULT_RANKING_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: u32,
    /// Rows shown to the player; the engine adds the hidden spawn rows
    pub visible_height: u32,
    pub randomizer: RandomizerKind,
    pub seed: u32,
    pub history_max_tries: u32,
    pub demo_path: PathBuf,
    pub ranking_path: PathBuf,
    pub ranking_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            visible_height: VISIBLE_HEIGHT,
            randomizer: RandomizerKind::default(),
            seed: 1,
            history_max_tries: Randomizer::DEFAULT_MAX_TRIES,
            demo_path: PathBuf::from("blockfall.demo"),
            ranking_path: PathBuf::from("blockfall.rank"),
            ranking_len: DEFAULT_RANKING_LEN,
        }
    }
}

impl GameConfig {
    /// Build from `BLOCKFALL_*` environment variables
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `BLOCKFALL_WIDTH` | `width` |
    /// | `BLOCKFALL_HEIGHT` | `visible_height` |
    /// | `BLOCKFALL_RANDOMIZER` | `randomizer` (`7bag`, `tgm`, `random`) |
    /// | `BLOCKFALL_SEED` | `seed` |
    /// | `BLOCKFALL_MAX_TRIES` | `history_max_tries` |
    /// | `BLOCKFALL_DEMO_PATH` | `demo_path` |
    /// | `BLOCKFALL_RANKING_PATH` | `ranking_path` |
    /// | `BLOCKFALL_RANKING_LEN` | `ranking_len` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let path = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
        };

        Self {
            width: parse_var(&lookup, "BLOCKFALL_WIDTH").unwrap_or(defaults.width),
            visible_height: parse_var(&lookup, "BLOCKFALL_HEIGHT").unwrap_or(defaults.visible_height),
            randomizer: parse_var(&lookup, "BLOCKFALL_RANDOMIZER").unwrap_or(defaults.randomizer),
            seed: parse_var(&lookup, "BLOCKFALL_SEED").unwrap_or(defaults.seed),
            history_max_tries: parse_var(&lookup, "BLOCKFALL_MAX_TRIES")
                .unwrap_or(defaults.history_max_tries),
            demo_path: path("BLOCKFALL_DEMO_PATH").unwrap_or(defaults.demo_path),
            ranking_path: path("BLOCKFALL_RANKING_PATH").unwrap_or(defaults.ranking_path),
            ranking_len: parse_var(&lookup, "BLOCKFALL_RANKING_LEN").unwrap_or(defaults.ranking_len),
        }
    }

    /// Full board height, hidden spawn rows included
    pub fn board_height(&self) -> Result<u32, CoreError> {
        self.visible_height
            .checked_add(HIDDEN_ROWS)
            .ok_or(CoreError::InvalidDimensions {
                width: self.width,
                height: self.visible_height,
            })
    }

    /// Randomizer described by this configuration
    pub fn build_randomizer(&self) -> Randomizer {
        match self.randomizer {
            RandomizerKind::History => Randomizer::history(self.seed, self.history_max_tries),
            kind => Randomizer::new(kind, self.seed),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}
