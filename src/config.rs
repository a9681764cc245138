use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DbError, Result};

/// Chunk size exponent used when nothing else is requested (256 records).
pub const DEFAULT_CHUNK_BITS: u8 = 8;
pub const MIN_CHUNK_BITS: u8 = 1;
pub const MAX_CHUNK_BITS: u8 = 24;

/// Runtime parameters for one database write pass.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// log2 of the number of records per chunk.
    pub chunk_bits: u8,
    /// Minimum time between two progress reports.
    pub progress_interval: Duration,
    /// Emit progress reports while writing the body.
    pub report_progress: bool,
    /// Directory the database file is created in.
    pub output_dir: PathBuf,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            chunk_bits: DEFAULT_CHUNK_BITS,
            progress_interval: Duration::from_millis(500),
            report_progress: true,
            output_dir: PathBuf::from("."),
        }
    }
}

impl WriterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_CHUNK_BITS..=MAX_CHUNK_BITS).contains(&self.chunk_bits) {
            return Err(DbError::Config(format!(
                "chunk bits must be between {} and {}, got {}",
                MIN_CHUNK_BITS, MAX_CHUNK_BITS, self.chunk_bits
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = WriterConfig::default();
        assert_eq!(cfg.chunk_bits, 8);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn chunk_bits_bounds() {
        for bits in [0u8, 25, 64] {
            let cfg = WriterConfig {
                chunk_bits: bits,
                ..WriterConfig::default()
            };
            assert!(matches!(cfg.validate(), Err(DbError::Config(_))));
        }
    }
}
