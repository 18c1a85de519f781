//! Error types for the core crate

use thiserror::Error;

/// Errors raised while constructing a game
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Errors raised while reading or writing demo and ranking files
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too short: {len} bytes")]
    Truncated { len: usize },

    #[error("bad signature 0x{found:X} (expected 0x{expected:X})")]
    BadSignature { expected: u32, found: u32 },

    #[error("unsupported version {found} (expected {expected})")]
    BadVersion { expected: u32, found: u32 },

    #[error("checksum mismatch: stored 0x{stored:08X}, computed 0x{computed:08X}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("payload length {actual} does not match header ({expected} bytes expected)")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("unknown shape id {0}")]
    UnknownShape(u32),
}

/// Result type for file format operations
pub type FormatResult<T> = std::result::Result<T, FormatError>;
