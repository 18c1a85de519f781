//! Shared types - data shared by the core, the engine drivers and the frontends
//!
//! Everything here is plain data with no game logic attached, so the input
//! mapping, the replay driver and the CLI can agree on vocabulary without
//! depending on each other.
//!
//! # Board Dimensions
//!
//! The default playfield is 10 columns by 20 visible rows. Two extra rows sit
//! above the visible area as a spawn buffer, so the board the engine allocates
//! is `BOARD_HEIGHT = VISIBLE_HEIGHT + HIDDEN_ROWS` rows tall.
//!
//! # Gravity
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MAX_DELAY_MS` | 1200 | Step interval at level 0 |
//! | `MIN_DELAY_MS` | 150 | Step interval floor |
//! | `MIN_DELAY_LEVEL` | 10 | Level at which the floor is reached |
//!
//! # On-disk codes
//!
//! [`Shape::id`], [`Command::code`] and [`DemoEvent::code`] are written to demo
//! files verbatim. Their numbering is part of the file format and must not
//! change.
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{Command, DemoEvent, RandomizerKind, Shape};
//!
//! assert_eq!(Shape::from_id(1), Some(Shape::I));
//! assert_eq!(Shape::T.symbol(), 'T');
//!
//! assert_eq!(DemoEvent::from_code(3), Some(DemoEvent::Input(Command::Rotate)));
//! assert_eq!(DemoEvent::Tick.code(), 5);
//!
//! let kind: RandomizerKind = "7bag".parse().unwrap();
//! assert_eq!(kind, RandomizerKind::Bag);
//! ```

use serde::{Deserialize, Serialize};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u32 = 10;

/// Visible board height in cells (20 rows)
pub const VISIBLE_HEIGHT: u32 = 20;

/// Hidden rows above the visible area used as a spawn buffer
pub const HIDDEN_ROWS: u32 = 2;

/// Total board height including the hidden rows
pub const BOARD_HEIGHT: u32 = VISIBLE_HEIGHT + HIDDEN_ROWS;

/// Number of distinct shapes
pub const SHAPE_COUNT: usize = 7;

/// Step interval at level 0
pub const MAX_DELAY_MS: u32 = 1200;

/// Step interval floor
pub const MIN_DELAY_MS: u32 = 150;

/// Level at which the step interval bottoms out
pub const MIN_DELAY_LEVEL: u32 = 10;

/// Rows that must be cleared to leave level 0
pub const INITIAL_ROWS_TO_NEXT_LEVEL: i32 = 2;

/// Points per cleared row, multiplied by `level + 1`
pub const ROW_SCORE: u32 = 50;

/// Points per combo step, multiplied by `level + 1`
pub const COMBO_SCORE: u32 = 10;

/// Number of rows around a locked piece that are checked for clears
pub const CLEAR_WINDOW: usize = 5;

/// Maximum length of a ranking name in bytes
pub const NAME_LEN: usize = 15;

/// The seven shapes, numbered in on-disk order
///
/// - **O**: 2x2 square
/// - **I**: 4-long bar
/// - **T**: T-shaped
/// - **L** / **J**: mirrored L shapes
/// - **S** / **Z**: mirrored skew shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    O,
    I,
    T,
    L,
    J,
    S,
    Z,
}

impl Shape {
    /// All shapes in id order
    pub const ALL: [Shape; SHAPE_COUNT] = [
        Shape::O,
        Shape::I,
        Shape::T,
        Shape::L,
        Shape::J,
        Shape::S,
        Shape::Z,
    ];

    /// On-disk id (0-6)
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Index into per-shape arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// Decode an on-disk id
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::Shape;
    ///
    /// assert_eq!(Shape::from_id(0), Some(Shape::O));
    /// assert_eq!(Shape::from_id(6), Some(Shape::Z));
    /// assert_eq!(Shape::from_id(7), None);
    /// ```
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Display symbol ("OITLJSZ")
    pub fn symbol(self) -> char {
        match self {
            Shape::O => 'O',
            Shape::I => 'I',
            Shape::T => 'T',
            Shape::L => 'L',
            Shape::J => 'J',
            Shape::S => 'S',
            Shape::Z => 'Z',
        }
    }

    /// Parse shape from its symbol (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let c = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() {
            return None;
        }
        Self::ALL.iter().copied().find(|shape| shape.symbol() == c)
    }
}

/// Player commands understood by the engine
///
/// The discriminants are the instruction codes stored in demo files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    /// Move one cell left
    Left,
    /// Move one cell right
    Right,
    /// Force the next gravity step immediately
    Down,
    /// Rotate clockwise with wall kick
    Rotate,
    /// Drop to the ghost row and lock on the next step
    HardDrop,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Left,
        Command::Right,
        Command::Down,
        Command::Rotate,
        Command::HardDrop,
    ];

    /// On-disk instruction code
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Parse command from string (case-insensitive)
    ///
    /// ```
    /// use blockfall_types::Command;
    ///
    /// assert_eq!(Command::from_str("hardDrop"), Some(Command::HardDrop));
    /// assert_eq!(Command::from_str("LEFT"), Some(Command::Left));
    /// assert_eq!(Command::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Command::Left),
            "right" => Some(Command::Right),
            "down" => Some(Command::Down),
            "rotate" => Some(Command::Rotate),
            "harddrop" => Some(Command::HardDrop),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Left => "left",
            Command::Right => "right",
            Command::Down => "down",
            Command::Rotate => "rotate",
            Command::HardDrop => "hardDrop",
        }
    }
}

/// An entry in a demo's instruction log
///
/// Besides player commands the engine records every gravity step it takes as
/// a `Tick`, which is what makes replay independent of frame timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoEvent {
    Input(Command),
    Tick,
}

impl DemoEvent {
    /// Instruction code used for ticks (one past the last command)
    pub const TICK_CODE: u32 = 5;

    pub fn code(self) -> u32 {
        match self {
            DemoEvent::Input(command) => command.code(),
            DemoEvent::Tick => Self::TICK_CODE,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        if code == Self::TICK_CODE {
            return Some(DemoEvent::Tick);
        }
        Command::from_code(code).map(DemoEvent::Input)
    }
}

/// Events produced by an input source
///
/// Commands go to the engine; the rest are handled by whoever runs the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Command(Command),
    /// Toggle pause
    Pause,
    /// Persist the current demo (only honoured once the game has ended)
    SaveDemo,
    /// Leave the game
    Quit,
}

/// Piece selection strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RandomizerKind {
    /// Independent uniform draws
    Uniform,
    /// 7-bag: every shape once per 7 draws
    Bag,
    /// TGM-style history avoidance
    #[default]
    History,
}

impl RandomizerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RandomizerKind::Uniform => "random",
            RandomizerKind::Bag => "7bag",
            RandomizerKind::History => "tgm",
        }
    }
}

impl std::str::FromStr for RandomizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" | "uniform" => Ok(RandomizerKind::Uniform),
            "7bag" | "bag" => Ok(RandomizerKind::Bag),
            "tgm" | "history" => Ok(RandomizerKind::History),
            other => Err(format!(
                "unknown randomizer '{other}' (expected 7bag, tgm or random)"
            )),
        }
    }
}

impl std::fmt::Display for RandomizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell on the board
///
/// - `None`: empty
/// - `Some(Shape)`: occupied by a block of that shape
pub type Cell = Option<Shape>;
