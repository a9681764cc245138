//! Sparse, chunked on-disk databases of solved puzzle positions.
//!
//! A solved puzzle assigns a remoteness to some positions in `0..=max_hash`.
//! [`write_database`] stores that mapping as a JSON header followed by
//! fixed-size chunks of bit-packed records; chunks without any reached
//! position are skipped so the file stays sparse. [`DatabaseReader`] reads
//! records back by position.

pub mod bits;
pub mod config;
pub mod error;
pub mod filename;
pub mod header;
pub mod io_utils;
pub mod progress;
pub mod reader;
pub mod record;
pub mod search;
pub mod writer;

pub use bits::num_bits;
pub use config::{WriterConfig, DEFAULT_CHUNK_BITS};
pub use error::{DbError, Result};
pub use filename::{database_file_name, database_path, validate_puzzle_id};
pub use header::{chunk_base, read_header, write_header, DatabaseHeader, PuzzleOptions};
pub use progress::{ProgressReporter, ProgressUpdate};
pub use reader::DatabaseReader;
pub use record::{FieldDescriptor, RecordLayout, REMOTENESS_FIELD};
pub use search::{SearchResult, SolvedPositions};
pub use writer::{
    total_chunks, write_body, write_database, write_database_to, BodyLayout, WriteSummary,
};
