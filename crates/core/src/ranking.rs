//! Ranking table - fixed-length best-to-worst score list
//!
//! File layout (every integer is a big-endian u32):
//!
//! ```text
//! 0       signature   0x2666
//! 4       version     1
//! 8       data length (36 bytes per entry)
//! 12      entries: score, rows, level, time, date, then a 16-byte name
//! end-4   CRC32 of all preceding bytes
//! ```

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::checksum::{put_u32, seal, unseal, ByteReader};
use crate::error::{FormatError, FormatResult};
use crate::types::NAME_LEN;

pub const RANKING_SIGNATURE: u32 = 0x2666;
pub const RANKING_VERSION: u32 = 1;

/// Encoded size of one entry
pub const ENTRY_LEN: usize = 5 * 4 + NAME_FIELD_LEN;

const NAME_FIELD_LEN: usize = NAME_LEN + 1;
const HEADER_LEN: usize = 12;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    pub score: u32,
    pub rows: u32,
    pub level: u32,
    /// Game time in milliseconds
    pub time_ms: u32,
    /// Seconds since the Unix epoch
    pub date: u32,
    pub name: String,
}

impl RankEntry {
    pub fn new(score: u32, rows: u32, level: u32, time_ms: u32, date: u32, name: &str) -> Self {
        Self {
            score,
            rows,
            level,
            time_ms,
            date,
            name: truncate_name(name).to_string(),
        }
    }

    /// Ordering used for ranking: `Less` means `self` ranks higher
    ///
    /// Higher score first, then shorter time, then earlier date.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then(self.time_ms.cmp(&other.time_ms))
            .then(self.date.cmp(&other.date))
    }

    /// True if `self` strictly outranks `other`
    pub fn beats(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Less
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        put_u32(buf, self.score);
        put_u32(buf, self.rows);
        put_u32(buf, self.level);
        put_u32(buf, self.time_ms);
        put_u32(buf, self.date);
        let mut name = [0u8; NAME_FIELD_LEN];
        let bytes = truncate_name(&self.name).as_bytes();
        name[..bytes.len()].copy_from_slice(bytes);
        buf.extend_from_slice(&name);
    }

    fn decode_from(reader: &mut ByteReader<'_>) -> FormatResult<Self> {
        let score = reader.read_u32()?;
        let rows = reader.read_u32()?;
        let level = reader.read_u32()?;
        let time_ms = reader.read_u32()?;
        let date = reader.read_u32()?;
        let field = reader.take(NAME_FIELD_LEN)?;
        let end = field.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        let name = String::from_utf8_lossy(&field[..end.min(NAME_LEN)]).into_owned();
        Ok(Self {
            score,
            rows,
            level,
            time_ms,
            date,
            name,
        })
    }
}

/// Longest prefix of `name` the name field can hold
///
/// Ends at the first NUL and never splits a char.
fn truncate_name(name: &str) -> &str {
    let name = name.split('\0').next().unwrap_or_default();
    if name.len() <= NAME_LEN {
        return name;
    }
    let mut end = NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Fixed-length table ordered best to worst
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingTable {
    entries: Vec<RankEntry>,
}

impl RankingTable {
    /// Table of `len` zeroed entries
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![RankEntry::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    /// Position the entry would take, or `len()` if it does not qualify
    pub fn rank_of(&self, entry: &RankEntry) -> usize {
        self.entries
            .iter()
            .position(|existing| entry.beats(existing))
            .unwrap_or(self.entries.len())
    }

    /// Insert an entry, dropping the last one, and return its rank
    ///
    /// A rank equal to `len()` means the entry did not qualify and the table
    /// is unchanged.
    pub fn insert(&mut self, entry: RankEntry) -> usize {
        let rank = self.rank_of(&entry);
        if rank < self.entries.len() {
            self.entries.pop();
            self.entries.insert(rank, entry);
        }
        rank
    }

    /// Serialize to the binary ranking format
    pub fn encode(&self) -> Vec<u8> {
        let data_len = self.entries.len() * ENTRY_LEN;
        let mut buf = Vec::with_capacity(HEADER_LEN + data_len + 4);
        put_u32(&mut buf, RANKING_SIGNATURE);
        put_u32(&mut buf, RANKING_VERSION);
        put_u32(&mut buf, data_len as u32);
        for entry in &self.entries {
            entry.encode_into(&mut buf);
        }
        seal(&mut buf);
        buf
    }

    /// Parse the binary ranking format into a table of `len` entries
    ///
    /// Missing entries are zeroed; surplus entries are dropped.
    pub fn decode(bytes: &[u8], len: usize) -> FormatResult<Self> {
        if bytes.len() < HEADER_LEN + 4 {
            return Err(FormatError::Truncated { len: bytes.len() });
        }
        let mut header = ByteReader::new(bytes);
        let signature = header.read_u32()?;
        if signature != RANKING_SIGNATURE {
            return Err(FormatError::BadSignature {
                expected: RANKING_SIGNATURE,
                found: signature,
            });
        }
        let version = header.read_u32()?;
        if version != RANKING_VERSION {
            return Err(FormatError::BadVersion {
                expected: RANKING_VERSION,
                found: version,
            });
        }

        let body = unseal(bytes)?;
        let mut reader = ByteReader::new(&body[8..]);
        let data_len = reader.read_u32()? as usize;
        let actual = reader.remaining();
        if data_len != actual || actual % ENTRY_LEN != 0 {
            return Err(FormatError::LengthMismatch {
                expected: data_len,
                actual,
            });
        }

        let stored = actual / ENTRY_LEN;
        let mut entries = Vec::with_capacity(len);
        for _ in 0..stored.min(len) {
            entries.push(RankEntry::decode_from(&mut reader)?);
        }
        entries.resize(len, RankEntry::default());
        Ok(Self { entries })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> FormatResult<usize> {
        let path = path.as_ref();
        let bytes = self.encode();
        fs::write(path, &bytes)?;
        info!(path = %path.display(), entries = self.entries.len(), "ranking saved");
        Ok(bytes.len())
    }

    pub fn load(path: impl AsRef<Path>, len: usize) -> FormatResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let table = Self::decode(&bytes, len).inspect_err(|err| {
            warn!(path = %path.display(), error = %err, "rejected ranking file");
        })?;
        info!(path = %path.display(), entries = table.len(), "ranking loaded");
        Ok(table)
    }

    /// Load a table, starting empty when the file cannot be read
    ///
    /// Corrupt files are still reported as errors.
    pub fn load_or_default(path: impl AsRef<Path>, len: usize) -> FormatResult<Self> {
        let path = path.as_ref();
        match Self::load(path, len) {
            Err(FormatError::Io(err)) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %err, "ranking unreadable, starting empty");
                }
                Ok(Self::new(len))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u32, time_ms: u32, date: u32) -> RankEntry {
        RankEntry::new(score, 0, 0, time_ms, date, "p")
    }

    fn table(scores: &[u32]) -> RankingTable {
        let mut table = RankingTable::new(scores.len());
        for (slot, &score) in table.entries.iter_mut().zip(scores) {
            *slot = entry(score, 1000, 1);
        }
        table
    }

    #[test]
    fn test_insert_shifts_tail() {
        let mut table = table(&[900, 600, 400, 100, 50]);
        let rank = table.insert(entry(500, 1000, 1));
        assert_eq!(rank, 2);
        let scores: Vec<u32> = table.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![900, 600, 500, 400, 100]);
    }

    #[test]
    fn test_insert_not_qualifying_is_noop() {
        let mut table = table(&[900, 600, 400]);
        let before = table.clone();
        assert_eq!(table.insert(entry(10, 1000, 1)), 3);
        assert_eq!(table, before);
    }

    #[test]
    fn test_tie_breaks() {
        let mut table = table(&[500, 400]);
        // same score, faster time wins
        assert_eq!(table.rank_of(&entry(500, 999, 1)), 0);
        // same score and time, earlier date wins
        assert_eq!(table.rank_of(&entry(500, 1000, 0)), 0);
        // identical entry does not displace the existing one
        assert_eq!(table.rank_of(&entry(500, 1000, 1)), 1);
        assert_eq!(table.insert(entry(400, 1000, 1)), 2);
    }

    #[test]
    fn test_name_truncated_on_char_boundary() {
        let e = RankEntry::new(1, 1, 1, 1, 1, "abcdefghijklmnopq");
        assert_eq!(e.name, "abcdefghijklmno");
        // 14 ASCII bytes plus a 2-byte char would need 16 bytes
        let e = RankEntry::new(1, 1, 1, 1, 1, "abcdefghijklmné");
        assert_eq!(e.name, "abcdefghijklmn");
    }

    #[test]
    fn test_name_ends_at_nul() {
        let mut table = RankingTable::new(1);
        table.insert(RankEntry::new(5, 1, 0, 100, 1, "a\0b"));
        assert_eq!(table.entries()[0].name, "a");

        let decoded = RankingTable::decode(&table.encode(), 1).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_encode_layout() {
        let mut table = RankingTable::new(1);
        table.insert(RankEntry::new(7, 3, 1, 9000, 42, "ann"));
        let bytes = table.encode();
        assert_eq!(bytes.len(), 12 + 36 + 4);
        assert_eq!(&bytes[0..4], &[0, 0, 0x26, 0x66]);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 36]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 7]);
        assert_eq!(&bytes[32..35], b"ann");
        assert!(bytes[35..48].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_round_trip_and_resize() {
        let mut table = RankingTable::new(3);
        table.insert(RankEntry::new(300, 6, 2, 60_000, 1_700_000_000, "alice"));
        table.insert(RankEntry::new(100, 2, 0, 30_000, 1_700_000_100, "bob"));
        let bytes = table.encode();

        assert_eq!(RankingTable::decode(&bytes, 3).unwrap(), table);

        let longer = RankingTable::decode(&bytes, 5).unwrap();
        assert_eq!(longer.len(), 5);
        assert_eq!(&longer.entries()[..3], table.entries());
        assert_eq!(longer.entries()[4], RankEntry::default());

        let shorter = RankingTable::decode(&bytes, 1).unwrap();
        assert_eq!(shorter.entries()[0].name, "alice");
    }

    #[test]
    fn test_decode_rejects_tampering() {
        let mut bytes = table(&[10, 5]).encode();
        bytes[20] ^= 0x01;
        assert!(matches!(
            RankingTable::decode(&bytes, 2),
            Err(FormatError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_ragged_data() {
        let mut bytes = table(&[10]).encode();
        bytes.truncate(bytes.len() - 4);
        bytes.push(0);
        bytes[11] = 37;
        seal(&mut bytes);
        assert!(matches!(
            RankingTable::decode(&bytes, 1),
            Err(FormatError::LengthMismatch { expected: 37, actual: 37 })
        ));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.rank");

        let table = RankingTable::load_or_default(&path, 4).unwrap();
        assert_eq!(table, RankingTable::new(4));

        fs::write(&path, b"garbage that is long enough").unwrap();
        assert!(RankingTable::load_or_default(&path, 4).is_err());

        let mut table = RankingTable::new(4);
        table.insert(entry(77, 1, 1));
        table.save(&path).unwrap();
        assert_eq!(RankingTable::load(&path, 4).unwrap(), table);
    }
}
