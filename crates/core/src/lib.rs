//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds every game rule plus the two binary file formats. It has
//! no dependencies on rendering, terminals or the wall clock, which makes it:
//!
//! - **Deterministic**: a seed and a demo log reproduce a game exactly
//! - **Testable**: time is injected through [`Clock`]
//! - **Portable**: runs headless, in a terminal or under a replay driver
//!
//! # Module Structure
//!
//! - [`board`]: grid storage, collision, line clearing and collapse
//! - [`pieces`]: the seven shapes and their rotation geometry
//! - [`piece`]: the falling piece with movement, wall kicks and ghost row
//! - [`rng`]: uniform, 7-bag, history-avoidance and recorded piece sources
//! - [`scoring`]: points, level progression and gravity speed
//! - [`game`]: the [`GameEngine`] state machine
//! - [`demo`] / [`ranking`]: checksummed binary formats
//! - [`checksum`]: the CRC and integer packing both formats share
//!
//! # Example
//!
//! ```
//! use blockfall_core::{GameEngine, Randomizer, StepOutcome, VirtualClock};
//! use blockfall_core::types::{Command, RandomizerKind};
//!
//! let clock = VirtualClock::new(0);
//! let mut game =
//!     GameEngine::initialize(10, 22, Randomizer::new(RandomizerKind::Bag, 7), clock.clone())
//!         .unwrap();
//!
//! game.process_input(Command::HardDrop);
//! assert!(matches!(game.update(), StepOutcome::Locked { .. }));
//!
//! // Gravity waits for the step interval
//! assert_eq!(game.update(), StepOutcome::Waiting);
//! clock.advance(game.step_ms() + 1);
//! assert_eq!(game.update(), StepOutcome::Fell);
//! ```

pub mod board;
pub mod checksum;
pub mod clock;
pub mod config;
pub mod demo;
pub mod error;
pub mod game;
pub mod piece;
pub mod pieces;
pub mod ranking;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use checksum::crc32;
pub use clock::{Clock, SystemClock, VirtualClock};
pub use config::GameConfig;
pub use demo::{DemoLog, Instruction};
pub use error::{CoreError, FormatError, FormatResult};
pub use game::{GameEngine, GameStats, InputOutcome, StepOutcome};
pub use piece::ActivePiece;
pub use pieces::get_shape;
pub use ranking::{RankEntry, RankingTable};
pub use rng::{Randomizer, SimpleRng};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
