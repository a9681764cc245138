//! Self-describing database preamble.
//!
//! The header is a single JSON object written at byte 0:
//!
//! ```text
//! {"puzzle":"...","options":{...},"fields":[{"name":"remoteness","bit_width":N}],"chunk_bits":8}
//! ```
//!
//! The chunked body starts at the first chunk-stride boundary at or after
//! the end of the header (see [`chunk_base`]), so the bytes in between are
//! left as a hole.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::config::{MAX_CHUNK_BITS, MIN_CHUNK_BITS};
use crate::error::{DbError, Result};
use crate::record::{FieldDescriptor, RecordLayout, MAX_FIELD_BITS};

/// Puzzle configuration options, kept in key order so the header bytes are
/// deterministic.
pub type PuzzleOptions = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseHeader {
    pub puzzle: String,
    pub options: PuzzleOptions,
    pub fields: Vec<FieldDescriptor>,
    pub chunk_bits: u8,
}

impl DatabaseHeader {
    /// Number of records per chunk.
    pub fn chunk_len(&self) -> u64 {
        1u64 << self.chunk_bits
    }

    pub fn layout(&self) -> Result<RecordLayout> {
        RecordLayout::new(self.fields.clone())
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_CHUNK_BITS..=MAX_CHUNK_BITS).contains(&self.chunk_bits) {
            return Err(DbError::Header(format!(
                "chunk_bits {} outside {}..={}",
                self.chunk_bits, MIN_CHUNK_BITS, MAX_CHUNK_BITS
            )));
        }
        if let Some(f) = self.fields.iter().find(|f| f.bit_width > MAX_FIELD_BITS) {
            return Err(DbError::Header(format!(
                "field '{}' is {} bits wide",
                f.name, f.bit_width
            )));
        }
        Ok(())
    }
}

/// Serialize `header` to `dest` and return the number of bytes written.
pub fn write_header<W: Write>(dest: &mut W, header: &DatabaseHeader) -> Result<u64> {
    let bytes = serde_json::to_vec(header)?;
    dest.write_all(&bytes)?;
    Ok(bytes.len() as u64)
}

/// Parse the header at the start of `src`, returning it together with its
/// encoded length in bytes.
pub fn read_header<R: Read>(src: R) -> Result<(DatabaseHeader, u64)> {
    let mut stream = serde_json::Deserializer::from_reader(src).into_iter::<DatabaseHeader>();
    let header = match stream.next() {
        Some(Ok(h)) => h,
        Some(Err(e)) => return Err(DbError::Header(format!("unreadable header: {e}"))),
        None => return Err(DbError::Header("file is empty".into())),
    };
    header.validate()?;
    Ok((header, stream.byte_offset() as u64))
}

/// First chunk index whose region starts at or after `header_len`.
///
/// `chunk_stride` is the size of one chunk region in bytes.
pub fn chunk_base(header_len: u64, chunk_stride: u64) -> u64 {
    header_len.div_ceil(chunk_stride)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_base_never_overlaps_header() {
        assert_eq!(chunk_base(0, 256), 0);
        assert_eq!(chunk_base(1, 256), 1);
        assert_eq!(chunk_base(256, 256), 1);
        assert_eq!(chunk_base(257, 256), 2);
        for len in 0..2000u64 {
            for stride in [1u64, 2, 256, 512] {
                let base = chunk_base(len, stride);
                assert!(base * stride >= len);
                assert!(base == 0 || (base - 1) * stride < len);
            }
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(read_header(&b""[..]), Err(DbError::Header(_))));
        assert!(matches!(read_header(&b"\0\0\0"[..]), Err(DbError::Header(_))));
        assert!(matches!(
            read_header(&br#"{"puzzle":"x"}"#[..]),
            Err(DbError::Header(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_chunk_bits() {
        let raw = br#"{"puzzle":"x","options":{},"fields":[],"chunk_bits":0}"#;
        assert!(matches!(read_header(&raw[..]), Err(DbError::Header(_))));
    }

    #[test]
    fn length_excludes_trailing_padding() {
        let header = DatabaseHeader {
            puzzle: "Wheel".into(),
            options: PuzzleOptions::new(),
            fields: vec![FieldDescriptor::new("remoteness", 4)],
            chunk_bits: 8,
        };
        let mut buf = Vec::new();
        let len = write_header(&mut buf, &header).unwrap();
        assert_eq!(len as usize, buf.len());
        buf.resize(256, 0);
        let (back, read_len) = read_header(&buf[..]).unwrap();
        assert_eq!(back, header);
        assert_eq!(read_len, len);
    }
}
