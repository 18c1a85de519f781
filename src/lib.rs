//! Blockfall (workspace facade crate).
//!
//! Re-exports the workspace crates under short module names so binaries,
//! integration tests and benches can write `blockfall::core::GameEngine`
//! while the implementation lives in dedicated crates under `crates/`.

pub use blockfall_core as core;
pub use blockfall_engine as engine;
pub use blockfall_input as input;
pub use blockfall_types as types;
