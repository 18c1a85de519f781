//! Terminal input mapping.
//!
//! Translates `crossterm` key events into [`types::InputEvent`]s. Polling the
//! terminal is left to the caller; this crate only decides what a key means.

pub mod map;

pub use blockfall_types as types;

pub use map::{handle_key_event, should_quit};
