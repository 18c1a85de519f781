//! Checksum and integer packing shared by the demo and ranking formats
//!
//! The CRC is the MSB-first variant over polynomial `0x04C11DB7` with a zero
//! initial value and no final XOR. It is *not* the reflected CRC-32 most
//! libraries implement, so the table lives here.

use crate::error::{FormatError, FormatResult};

const POLYNOMIAL: u32 = 0x04C1_1DB7;

const CRC_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the checksum of `bytes`
pub fn crc32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |crc, &b| {
        let crc = crc ^ ((b as u32) << 24);
        (crc << 8) ^ CRC_TABLE[(crc >> 24) as usize]
    })
}

/// Append a big-endian u32
#[inline]
pub fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Append the checksum of everything already in `buf`
pub fn seal(buf: &mut Vec<u8>) {
    let crc = crc32(buf);
    put_u32(buf, crc);
}

/// Split off and verify the trailing checksum, returning the covered bytes
pub fn unseal(bytes: &[u8]) -> FormatResult<&[u8]> {
    if bytes.len() < 4 {
        return Err(FormatError::Truncated { len: bytes.len() });
    }
    let (body, tail) = bytes.split_at(bytes.len() - 4);
    let stored = u32::from_be_bytes([tail[0], tail[1], tail[2], tail[3]]);
    let computed = crc32(body);
    if stored != computed {
        return Err(FormatError::ChecksumMismatch { stored, computed });
    }
    Ok(body)
}

/// Bounds-checked big-endian reader
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_u32(&mut self) -> FormatResult<u32> {
        let chunk = self.take(4)?;
        Ok(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    }

    pub fn take(&mut self, n: usize) -> FormatResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(FormatError::Truncated {
                len: self.bytes.len(),
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc_check_value() {
        // CRC-32/CKSUM parameters minus the final XOR
        assert_eq!(crc32(b"123456789"), 0x89A1_897F);
    }

    #[test]
    fn test_crc_empty_is_zero() {
        assert_eq!(crc32(&[]), 0);
    }

    #[test]
    fn test_table_first_entries() {
        assert_eq!(CRC_TABLE[0], 0);
        assert_eq!(CRC_TABLE[1], POLYNOMIAL);
        assert_eq!(CRC_TABLE[2], POLYNOMIAL << 1);
    }

    #[test]
    fn test_seal_unseal() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 0xDE0666);
        put_u32(&mut buf, 1);
        seal(&mut buf);
        assert_eq!(buf.len(), 12);
        assert_eq!(&buf[..4], &[0x00, 0xDE, 0x06, 0x66]);

        let body = unseal(&buf).unwrap();
        assert_eq!(body.len(), 8);

        buf[5] ^= 0x01;
        assert!(matches!(
            unseal(&buf),
            Err(FormatError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_reader_bounds() {
        let bytes = [0u8, 0, 0, 7, 1];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_u32().unwrap(), 7);
        assert_eq!(reader.remaining(), 1);
        assert!(matches!(
            reader.read_u32(),
            Err(FormatError::Truncated { len: 5 })
        ));
    }
}
