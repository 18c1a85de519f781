//! Drivers that sit on top of the core engine
//!
//! - [`replay`]: plays a recorded demo back through a fresh engine
//! - [`autoplay`]: placement planning and a seeded scripted player
//! - [`session`]: interactive session state and the ranking flow
//!
//! None of these read the terminal or draw anything; frontends feed them
//! [`types::InputEvent`]s and read [`blockfall_core::GameSnapshot`]s back.

pub mod autoplay;
pub mod replay;
pub mod session;

pub use blockfall_types as types;

pub use autoplay::{apply_placement, plan_placement, AutoPlayer, AutoplayReport, PlaceError, Placement};
pub use replay::{DemoPlayer, Progress, ReplayState};
pub use session::{epoch_seconds, record_score, PlaySession, SessionResponse, SessionState};
