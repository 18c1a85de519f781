//! Demo log - recorded piece sequence and timestamped instructions
//!
//! File layout (every integer is a big-endian u32):
//!
//! ```text
//! 0       signature   0xDE0666
//! 4       version     1
//! 8       piece count
//! 12      instruction count
//! 16      piece ids               (piece count entries)
//! ..      time, code pairs        (instruction count entries)
//! end-4   CRC32 of all preceding bytes
//! ```
//!
//! Loading checks signature, version, length and checksum before building
//! anything, so a damaged file never yields a partial log.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::checksum::{put_u32, seal, unseal, ByteReader};
use crate::error::{FormatError, FormatResult};
use crate::types::{DemoEvent, Shape};

pub const DEMO_SIGNATURE: u32 = 0x00DE_0666;
pub const DEMO_VERSION: u32 = 1;

const HEADER_LEN: usize = 16;

/// One recorded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// Milliseconds since the game started (pauses excluded)
    pub time_ms: u32,
    /// Raw instruction code, see [`DemoEvent::code`]
    pub code: u32,
}

impl Instruction {
    pub fn event(&self) -> Option<DemoEvent> {
        DemoEvent::from_code(self.code)
    }
}

/// Append-only record of a game session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoLog {
    pieces: Vec<Shape>,
    instructions: Vec<Instruction>,
}

impl DemoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_piece(&mut self, shape: Shape) {
        self.pieces.push(shape);
    }

    pub fn add_instruction(&mut self, time_ms: u32, code: u32) {
        self.instructions.push(Instruction { time_ms, code });
    }

    pub fn add_event(&mut self, time_ms: u32, event: DemoEvent) {
        self.add_instruction(time_ms, event.code());
    }

    pub fn pieces(&self) -> &[Shape] {
        &self.pieces
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty() && self.instructions.is_empty()
    }

    /// Size in bytes of the encoded log
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + 4 * self.pieces.len() + 8 * self.instructions.len() + 4
    }

    /// Serialize to the binary demo format
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        put_u32(&mut buf, DEMO_SIGNATURE);
        put_u32(&mut buf, DEMO_VERSION);
        put_u32(&mut buf, self.pieces.len() as u32);
        put_u32(&mut buf, self.instructions.len() as u32);
        for shape in &self.pieces {
            put_u32(&mut buf, shape.id());
        }
        for ins in &self.instructions {
            put_u32(&mut buf, ins.time_ms);
            put_u32(&mut buf, ins.code);
        }
        seal(&mut buf);
        buf
    }

    /// Parse the binary demo format
    pub fn decode(bytes: &[u8]) -> FormatResult<Self> {
        if bytes.len() < HEADER_LEN + 4 {
            return Err(FormatError::Truncated { len: bytes.len() });
        }

        let mut header = ByteReader::new(bytes);
        let signature = header.read_u32()?;
        if signature != DEMO_SIGNATURE {
            return Err(FormatError::BadSignature {
                expected: DEMO_SIGNATURE,
                found: signature,
            });
        }
        let version = header.read_u32()?;
        if version != DEMO_VERSION {
            return Err(FormatError::BadVersion {
                expected: DEMO_VERSION,
                found: version,
            });
        }

        let body = unseal(bytes)?;
        let mut reader = ByteReader::new(&body[8..]);
        let piece_count = reader.read_u32()? as usize;
        let instruction_count = reader.read_u32()? as usize;

        let expected = piece_count
            .checked_mul(4)
            .and_then(|p| instruction_count.checked_mul(8).map(|i| p + i))
            .unwrap_or(usize::MAX);
        if reader.remaining() != expected {
            return Err(FormatError::LengthMismatch {
                expected,
                actual: reader.remaining(),
            });
        }

        let mut log = DemoLog {
            pieces: Vec::with_capacity(piece_count),
            instructions: Vec::with_capacity(instruction_count),
        };
        for _ in 0..piece_count {
            let id = reader.read_u32()?;
            let shape = Shape::from_id(id).ok_or(FormatError::UnknownShape(id))?;
            log.pieces.push(shape);
        }
        for _ in 0..instruction_count {
            let time_ms = reader.read_u32()?;
            let code = reader.read_u32()?;
            log.instructions.push(Instruction { time_ms, code });
        }
        Ok(log)
    }

    /// Write the log to `path`, returning the number of bytes written
    pub fn save(&self, path: impl AsRef<Path>) -> FormatResult<usize> {
        let path = path.as_ref();
        let bytes = self.encode();
        fs::write(path, &bytes)?;
        info!(
            path = %path.display(),
            pieces = self.pieces.len(),
            instructions = self.instructions.len(),
            "demo saved"
        );
        Ok(bytes.len())
    }

    /// Read and validate a demo file
    pub fn load(path: impl AsRef<Path>) -> FormatResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        match Self::decode(&bytes) {
            Ok(log) => {
                info!(
                    path = %path.display(),
                    pieces = log.pieces.len(),
                    instructions = log.instructions.len(),
                    "demo loaded"
                );
                Ok(log)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "rejected demo file");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Command;

    fn sample() -> DemoLog {
        let mut log = DemoLog::new();
        log.add_piece(Shape::O);
        log.add_piece(Shape::I);
        log.add_event(100, DemoEvent::Input(Command::Left));
        log
    }

    #[test]
    fn test_encoded_layout() {
        let bytes = sample().encode();
        assert_eq!(bytes.len(), 16 + 8 + 8 + 4);
        assert_eq!(&bytes[0..4], &[0x00, 0xDE, 0x06, 0x66]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 1]);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 2]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 1]);
        // pieces O=0, I=1
        assert_eq!(&bytes[16..24], &[0, 0, 0, 0, 0, 0, 0, 1]);
        // (100, Left=0)
        assert_eq!(&bytes[24..32], &[0, 0, 0, 100, 0, 0, 0, 0]);
    }

    #[test]
    fn test_round_trip() {
        let log = sample();
        let decoded = DemoLog::decode(&log.encode()).unwrap();
        assert_eq!(decoded, log);
        assert_eq!(decoded.pieces(), &[Shape::O, Shape::I]);
        assert_eq!(
            decoded.instructions(),
            &[Instruction {
                time_ms: 100,
                code: 0
            }]
        );
    }

    #[test]
    fn test_empty_log_round_trip() {
        let log = DemoLog::new();
        assert!(log.is_empty());
        assert_eq!(DemoLog::decode(&log.encode()).unwrap(), log);
    }

    #[test]
    fn test_bad_signature() {
        let mut bytes = sample().encode();
        bytes[1] = 0xAD;
        assert!(matches!(
            DemoLog::decode(&bytes),
            Err(FormatError::BadSignature { .. })
        ));
    }

    #[test]
    fn test_bad_version() {
        let mut bytes = sample().encode();
        bytes[7] = 2;
        assert!(matches!(
            DemoLog::decode(&bytes),
            Err(FormatError::BadVersion { found: 2, .. })
        ));
    }

    #[test]
    fn test_truncated() {
        let bytes = sample().encode();
        assert!(matches!(
            DemoLog::decode(&bytes[..10]),
            Err(FormatError::Truncated { len: 10 })
        ));
    }

    #[test]
    fn test_count_mismatch_with_valid_checksum() {
        let mut bytes = sample().encode();
        bytes.truncate(bytes.len() - 4);
        bytes[11] = 3; // claim three pieces
        seal(&mut bytes);
        assert!(matches!(
            DemoLog::decode(&bytes),
            Err(FormatError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_shape_rejected() {
        let mut bytes = sample().encode();
        bytes.truncate(bytes.len() - 4);
        bytes[19] = 9;
        seal(&mut bytes);
        assert!(matches!(
            DemoLog::decode(&bytes),
            Err(FormatError::UnknownShape(9))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.demo");
        let log = sample();
        let written = log.save(&path).unwrap();
        assert_eq!(written, log.encoded_len());
        assert_eq!(DemoLog::load(&path).unwrap(), log);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DemoLog::load(dir.path().join("nope.demo")),
            Err(FormatError::Io(_))
        ));
    }
}
