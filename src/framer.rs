//! Composes and parses the inner record sealed inside each cipher frame.
//!
//! The record has a 12-byte plaintext prefix (schema version, inflated
//! size, tail size) followed by a tail that is Deflate-compressed unless
//! the caller asked for `--uncompressed` storage, in which case the tail
//! is carried verbatim and `compressed_size == uncompressed_size`.

use std::io::{Read, Write};

use byteorder::{ByteOrder, LittleEndian};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::config::{FILEINFO_VERSION_COMPRESSED, FILEINFO_VERSION_UNCOMPRESSED, MAX_FILENAME_LENGTH};
use crate::error::StegError;

const PREFIX_LEN: usize = 4 + 8 + 8;
const TIMESTAMP_LEN: usize = 8 + 8;

#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    pub secs: i64,
    pub nanos: i64,
}

impl Timestamp {
    fn write(self, out: &mut Vec<u8>) {
        let mut buf = [0u8; 8];
        LittleEndian::write_i64(&mut buf, self.secs);
        out.extend_from_slice(&buf);
        LittleEndian::write_i64(&mut buf, self.nanos);
        out.extend_from_slice(&buf);
    }

    fn read(bytes: &[u8]) -> Self {
        Self { secs: LittleEndian::read_i64(&bytes[0..8]), nanos: LittleEndian::read_i64(&bytes[8..16]) }
    }
}

pub struct FileRecord {
    pub access_time: Timestamp,
    pub mod_time: Timestamp,
    pub steg_time: Timestamp,
    /// Raw name bytes, kept as-is (no charset transcoding) so a non-UTF-8
    /// name round-trips byte-for-byte.
    pub file_name: Vec<u8>,
    pub file_bytes: Vec<u8>,
}

impl FileRecord {
    /// Build the full plaintext (prefix + tail) that gets handed to the
    /// cipher as a single message.
    pub fn compose(&self, uncompressed: bool) -> Result<Vec<u8>, StegError> {
        let name_bytes = self.file_name.as_slice();
        let name_size = name_bytes.len() + 1;
        if name_size > MAX_FILENAME_LENGTH {
            return Err(StegError::NameTooLong);
        }

        let mut tail = Vec::with_capacity(TIMESTAMP_LEN * 3 + 2 + name_size + self.file_bytes.len());
        self.access_time.write(&mut tail);
        self.mod_time.write(&mut tail);
        self.steg_time.write(&mut tail);
        let mut name_size_buf = [0u8; 2];
        LittleEndian::write_u16(&mut name_size_buf, name_size as u16);
        tail.extend_from_slice(&name_size_buf);
        tail.extend_from_slice(name_bytes);
        tail.push(0);
        tail.extend_from_slice(&self.file_bytes);

        let uncompressed_size = tail.len() as u64;
        let (version, stored) = if uncompressed {
            (FILEINFO_VERSION_UNCOMPRESSED, tail)
        } else {
            (FILEINFO_VERSION_COMPRESSED, deflate(&tail)?)
        };

        let mut out = Vec::with_capacity(PREFIX_LEN + stored.len());
        let mut buf4 = [0u8; 4];
        LittleEndian::write_u32(&mut buf4, version);
        out.extend_from_slice(&buf4);
        let mut buf8 = [0u8; 8];
        LittleEndian::write_u64(&mut buf8, uncompressed_size);
        out.extend_from_slice(&buf8);
        LittleEndian::write_u64(&mut buf8, stored.len() as u64);
        out.extend_from_slice(&buf8);
        out.extend_from_slice(&stored);

        Ok(out)
    }

    pub fn parse(data: &[u8]) -> Result<Self, StegError> {
        if data.len() < PREFIX_LEN {
            return Err(StegError::PayloadOob);
        }
        let version = LittleEndian::read_u32(&data[0..4]);
        let uncompressed_size = LittleEndian::read_u64(&data[4..12]) as usize;
        let compressed_size = LittleEndian::read_u64(&data[12..20]) as usize;
        if version > FILEINFO_VERSION_UNCOMPRESSED {
            return Err(StegError::NewerVersion { found: version, supported: FILEINFO_VERSION_UNCOMPRESSED });
        }
        if data.len() < PREFIX_LEN + compressed_size {
            return Err(StegError::PayloadOob);
        }
        let stored = &data[PREFIX_LEN..PREFIX_LEN + compressed_size];

        let tail = if version == FILEINFO_VERSION_UNCOMPRESSED {
            stored.to_vec()
        } else {
            inflate(stored)?
        };
        if tail.len() != uncompressed_size {
            return Err(StegError::CryptoFail);
        }

        if tail.len() < TIMESTAMP_LEN * 3 + 2 {
            return Err(StegError::PayloadOob);
        }
        let access_time = Timestamp::read(&tail[0..16]);
        let mod_time = Timestamp::read(&tail[16..32]);
        let steg_time = Timestamp::read(&tail[32..48]);
        let name_size = LittleEndian::read_u16(&tail[48..50]) as usize;
        if name_size == 0 || tail.len() < 50 + name_size {
            return Err(StegError::PayloadOob);
        }
        let name_field = &tail[50..50 + name_size];
        let nul_pos = name_field.iter().position(|&b| b == 0).unwrap_or(name_field.len());
        let file_name = name_field[..nul_pos].to_vec();
        let file_bytes = tail[50 + name_size..].to_vec();

        Ok(Self { access_time, mod_time, steg_time, file_name, file_bytes })
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, StegError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).map_err(StegError::Io)?;
    encoder.finish().map_err(StegError::Io)
}

fn inflate(data: &[u8]) -> Result<Vec<u8>, StegError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(|_| StegError::CryptoFail)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileRecord {
        FileRecord {
            access_time: Timestamp { secs: 1, nanos: 2 },
            mod_time: Timestamp { secs: 3, nanos: 4 },
            steg_time: Timestamp { secs: 5, nanos: 6 },
            file_name: b"notes.txt".to_vec(),
            file_bytes: b"hello hidden world".to_vec(),
        }
    }

    #[test]
    fn roundtrips_compressed() {
        let record = sample();
        let framed = record.compose(false).unwrap();
        let parsed = FileRecord::parse(&framed).unwrap();
        assert_eq!(parsed.file_name, b"notes.txt");
        assert_eq!(parsed.file_bytes, b"hello hidden world");
        assert_eq!(parsed.access_time.secs, 1);
        assert_eq!(parsed.steg_time.nanos, 6);
    }

    #[test]
    fn roundtrips_uncompressed() {
        let record = sample();
        let framed = record.compose(true).unwrap();
        let parsed = FileRecord::parse(&framed).unwrap();
        assert_eq!(parsed.file_bytes, b"hello hidden world");
    }

    #[test]
    fn uncompressed_stores_tail_verbatim() {
        let record = sample();
        let framed = record.compose(true).unwrap();
        let uncompressed_size = LittleEndian::read_u64(&framed[4..12]);
        let compressed_size = LittleEndian::read_u64(&framed[12..20]);
        assert_eq!(uncompressed_size, compressed_size);
    }

    #[test]
    fn rejects_oversized_name() {
        let mut record = sample();
        record.file_name = vec![b'x'; MAX_FILENAME_LENGTH];
        assert!(matches!(record.compose(false), Err(StegError::NameTooLong)));
    }

    #[test]
    fn truncated_record_is_oob() {
        assert!(matches!(FileRecord::parse(&[0u8; 4]), Err(StegError::PayloadOob)));
    }

    #[test]
    fn non_utf8_name_roundtrips_byte_for_byte() {
        let mut record = sample();
        record.file_name = vec![0xE9, 0x74, 0xE9, b'.', b't', b'x', b't'];
        let framed = record.compose(false).unwrap();
        let parsed = FileRecord::parse(&framed).unwrap();
        assert_eq!(parsed.file_name, record.file_name);
    }

    #[test]
    fn empty_file_bytes_roundtrip() {
        let mut record = sample();
        record.file_bytes.clear();
        let framed = record.compose(false).unwrap();
        let parsed = FileRecord::parse(&framed).unwrap();
        assert!(parsed.file_bytes.is_empty());
    }
}
