//! Fixed-length bit-packed records.
//!
//! A [`RecordLayout`] is an ordered list of [`FieldDescriptor`]s. Field
//! values are packed MSB-first in declaration order and the record is padded
//! with zero bits up to a whole byte:
//!
//! ```text
//! [field 0 (w0 bits)][field 1 (w1 bits)]...[pad to byte]
//! ```
//!
//! A layout whose total width is zero still occupies one byte so that every
//! position keeps a distinct, seekable slot on disk.

use serde::{Deserialize, Serialize};

use crate::bits::num_bits;
use crate::error::{DbError, Result};

/// Name of the single field stored by solved-puzzle databases.
pub const REMOTENESS_FIELD: &str = "remoteness";

/// Largest supported width of one field.
pub const MAX_FIELD_BITS: u32 = 64;

/// Name and bit width of one packed attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub bit_width: u32,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, bit_width: u32) -> Self {
        Self {
            name: name.into(),
            bit_width,
        }
    }

    /// Descriptor for a remoteness field wide enough to hold `max_level`.
    pub fn remoteness(max_level: u64) -> Self {
        Self::new(REMOTENESS_FIELD, num_bits(max_level))
    }
}

/// Encoder and decoder for one record shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<FieldDescriptor>,
    total_bits: u64,
}

impl RecordLayout {
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self> {
        if let Some(f) = fields.iter().find(|f| f.bit_width > MAX_FIELD_BITS) {
            return Err(DbError::Config(format!(
                "field '{}' is {} bits wide, at most {} supported",
                f.name, f.bit_width, MAX_FIELD_BITS
            )));
        }
        let total_bits = fields.iter().map(|f| f.bit_width as u64).sum();
        Ok(Self { fields, total_bits })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Encoded length of one record in bytes.
    ///
    /// Never zero: a layout of zero-width fields (a puzzle whose largest
    /// remoteness is 0) still takes one zero byte per position instead of
    /// an empty record, so chunk strides and offsets stay well defined.
    pub fn record_len(&self) -> usize {
        (self.total_bits.div_ceil(8) as usize).max(1)
    }

    /// Pack `values` into `out`, which must be exactly [`record_len`] bytes.
    ///
    /// [`record_len`]: RecordLayout::record_len
    pub fn encode_into(&self, values: &[u64], out: &mut [u8]) -> Result<()> {
        if values.len() != self.fields.len() {
            return Err(DbError::Config(format!(
                "expected {} field values, got {}",
                self.fields.len(),
                values.len()
            )));
        }
        debug_assert_eq!(out.len(), self.record_len());
        out.fill(0);
        let mut pos = 0usize;
        for (field, &value) in self.fields.iter().zip(values) {
            let width = field.bit_width;
            if width < MAX_FIELD_BITS && value >> width != 0 {
                return Err(DbError::EncodingOverflow {
                    field: field.name.clone(),
                    value,
                    bits: width,
                });
            }
            for i in (0..width).rev() {
                if (value >> i) & 1 != 0 {
                    out[pos / 8] |= 0x80 >> (pos % 8);
                }
                pos += 1;
            }
        }
        Ok(())
    }

    pub fn encode(&self, values: &[u64]) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.record_len()];
        self.encode_into(values, &mut out)?;
        Ok(out)
    }

    /// Unpack one record into its field values.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<u64>> {
        if bytes.len() < self.record_len() {
            return Err(DbError::Header(format!(
                "record truncated: {} of {} bytes",
                bytes.len(),
                self.record_len()
            )));
        }
        let mut pos = 0usize;
        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let mut value = 0u64;
            for _ in 0..field.bit_width {
                let bit = (bytes[pos / 8] >> (7 - (pos % 8))) & 1;
                value = (value << 1) | bit as u64;
                pos += 1;
            }
            values.push(value);
        }
        Ok(values)
    }

    /// Encoding of an all-zero tuple, used to fill positions the search
    /// never reached.
    ///
    /// A reached position whose fields are all zero encodes to the same
    /// bytes, so the two cases cannot be told apart on disk.
    pub fn default_record(&self) -> Result<Vec<u8>> {
        self.encode(&vec![0; self.fields.len()])
    }
}
