//! Chunked, sparse database writer.
//!
//! The position space `0..=max_hash` is split into aligned chunks of
//! `2^chunk_bits` records. A chunk is materialized in a reusable buffer
//! pre-filled with the default record, overwritten at every reached
//! position, and written with one seek and one write. Chunks without any
//! reached position are never touched, so they stay holes in the file.
//!
//! ```text
//! [header][hole up to chunk_base * stride][chunk 0][chunk 1]...
//! ```
//!
//! The pass is not transactional: a failure part way leaves whatever was
//! already written in place.

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;

use crate::config::WriterConfig;
use crate::error::{DbError, Result};
use crate::filename::{database_path, validate_puzzle_id};
use crate::header::{chunk_base, write_header, DatabaseHeader, PuzzleOptions};
use crate::progress::ProgressReporter;
use crate::record::{FieldDescriptor, RecordLayout};
use crate::search::SearchResult;

/// Outcome of one write pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub header_len: u64,
    pub chunk_base: u64,
    /// Size of one chunk region in bytes.
    pub chunk_stride: u64,
    pub total_chunks: u64,
    pub written_chunks: u64,
    pub elapsed_ms: u64,
}

impl WriteSummary {
    pub fn skipped_chunks(&self) -> u64 {
        self.total_chunks - self.written_chunks
    }
}

/// Chunk geometry and encoding shared by every chunk of one pass.
pub struct BodyLayout<'a> {
    pub layout: &'a RecordLayout,
    pub default_record: &'a [u8],
    pub chunk_bits: u8,
    pub chunk_base: u64,
}

impl BodyLayout<'_> {
    pub fn chunk_len(&self) -> u64 {
        1u64 << self.chunk_bits
    }

    pub fn chunk_stride(&self) -> u64 {
        self.chunk_len() * self.layout.record_len() as u64
    }

    /// Absolute byte offset of chunk `chunk_index`.
    pub fn chunk_offset(&self, chunk_index: u64) -> u64 {
        (self.chunk_base + chunk_index) * self.chunk_stride()
    }
}

/// Number of chunks needed to cover positions `0..=max_hash`.
pub fn total_chunks(max_hash: u64, chunk_bits: u8) -> u64 {
    (max_hash >> chunk_bits) + 1
}

/// Write every chunk that holds at least one reached position.
///
/// Returns the number of chunks actually written.
pub fn write_body<W, S>(
    dest: &mut W,
    result: &S,
    body: &BodyLayout<'_>,
    progress: &mut ProgressReporter,
) -> Result<u64>
where
    W: Write + Seek,
    S: SearchResult + ?Sized,
{
    let rec_len = body.layout.record_len();
    if body.layout.fields().len() != 1 {
        return Err(DbError::Config(format!(
            "body records must have exactly one field, layout has {}",
            body.layout.fields().len()
        )));
    }
    if body.default_record.len() != rec_len {
        return Err(DbError::Config(format!(
            "default record is {} bytes, layout needs {}",
            body.default_record.len(),
            rec_len
        )));
    }

    let max_hash = result.max_hash();
    let chunks = total_chunks(max_hash, body.chunk_bits);
    let chunk_len = body.chunk_len();
    let mut buf = vec![0u8; body.chunk_stride() as usize];
    let mut needs_reset = true;
    let mut written = 0u64;

    for chunk_index in 0..chunks {
        if needs_reset {
            for slot in buf.chunks_exact_mut(rec_len) {
                slot.copy_from_slice(body.default_record);
            }
        }

        let first = chunk_index << body.chunk_bits;
        let last = (first + chunk_len - 1).min(max_hash);
        let mut present = false;
        for position in first..=last {
            if let Some(remoteness) = result.get(position) {
                let off = (position - first) as usize * rec_len;
                body.layout
                    .encode_into(&[remoteness], &mut buf[off..off + rec_len])?;
                present = true;
            }
        }
        needs_reset = present;

        if present {
            let offset = body.chunk_offset(chunk_index);
            dest.seek(SeekFrom::Start(offset))?;
            dest.write_all(&buf)?;
            written += 1;
            tracing::debug!(chunk = chunk_index, offset, "wrote chunk");
        } else {
            tracing::trace!(chunk = chunk_index, "skipped empty chunk");
        }

        progress.update(chunk_index);
    }

    Ok(written)
}

/// Write a complete database for `result` into `dest`.
pub fn write_database_to<W, S>(
    dest: &mut W,
    puzzle: &str,
    options: &PuzzleOptions,
    result: &S,
    config: &WriterConfig,
) -> Result<WriteSummary>
where
    W: Write + Seek,
    S: SearchResult + ?Sized,
{
    config.validate()?;
    validate_puzzle_id(puzzle)?;
    let start = Instant::now();

    let fields = vec![FieldDescriptor::remoteness(result.max_level())];
    let layout = RecordLayout::new(fields.clone())?;
    let default_record = layout.default_record()?;

    let header = DatabaseHeader {
        puzzle: puzzle.to_string(),
        options: options.clone(),
        fields,
        chunk_bits: config.chunk_bits,
    };
    dest.seek(SeekFrom::Start(0))?;
    let header_len = write_header(dest, &header)?;

    let chunk_stride = (1u64 << config.chunk_bits) * layout.record_len() as u64;
    let body = BodyLayout {
        layout: &layout,
        default_record: &default_record,
        chunk_bits: config.chunk_bits,
        chunk_base: chunk_base(header_len, chunk_stride),
    };
    let chunks = total_chunks(result.max_hash(), config.chunk_bits);
    tracing::info!(
        max_hash = result.max_hash(),
        max_level = result.max_level(),
        chunks,
        chunk_stride,
        "writing {} chunks of {} bytes",
        chunks,
        chunk_stride
    );

    let mut progress =
        ProgressReporter::new(chunks, config.progress_interval, config.report_progress);
    let written_chunks = write_body(dest, result, &body, &mut progress)?;
    dest.flush()?;

    Ok(WriteSummary {
        header_len,
        chunk_base: body.chunk_base,
        chunk_stride,
        total_chunks: chunks,
        written_chunks,
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}

/// Solve-phase output to file: derive the database path from the puzzle
/// and its options, create the file and write it.
pub fn write_database<S>(
    puzzle: &str,
    options: &PuzzleOptions,
    result: &S,
    config: &WriterConfig,
) -> Result<(PathBuf, WriteSummary)>
where
    S: SearchResult + ?Sized,
{
    config.validate()?;
    let path = database_path(&config.output_dir, puzzle, options)?;
    tracing::info!(path = %path.display(), "writing database");
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)?;
    let summary = write_database_to(&mut file, puzzle, options, result, config)?;
    file.sync_all()?;
    tracing::info!(
        written = summary.written_chunks,
        skipped = summary.skipped_chunks(),
        elapsed_ms = summary.elapsed_ms,
        "done"
    );
    Ok((path, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SolvedPositions;
    use std::io::Cursor;
    use std::time::Duration;

    fn quiet() -> WriterConfig {
        WriterConfig {
            report_progress: false,
            ..WriterConfig::default()
        }
    }

    #[test]
    fn chunk_count() {
        assert_eq!(total_chunks(0, 8), 1);
        assert_eq!(total_chunks(255, 8), 1);
        assert_eq!(total_chunks(256, 8), 2);
        assert_eq!(total_chunks(300, 8), 2);
        assert_eq!(total_chunks(1000, 8), 4);
    }

    #[test]
    fn offsets_are_aligned_after_header() {
        let layout = RecordLayout::new(vec![FieldDescriptor::remoteness(3)]).unwrap();
        let default_record = layout.default_record().unwrap();
        let body = BodyLayout {
            layout: &layout,
            default_record: &default_record,
            chunk_bits: 8,
            chunk_base: chunk_base(100, 256),
        };
        assert_eq!(body.chunk_offset(0), 256);
        assert_eq!(body.chunk_offset(3), 4 * 256);
    }

    #[test]
    fn wide_records_scale_the_stride() {
        let layout = RecordLayout::new(vec![FieldDescriptor::remoteness(1000)]).unwrap();
        assert_eq!(layout.record_len(), 2);
        let default_record = layout.default_record().unwrap();
        let body = BodyLayout {
            layout: &layout,
            default_record: &default_record,
            chunk_bits: 4,
            chunk_base: 1,
        };
        assert_eq!(body.chunk_stride(), 32);
        assert_eq!(body.chunk_offset(2), 96);
    }

    #[test]
    fn rejects_mismatched_default_record() {
        let layout = RecordLayout::new(vec![FieldDescriptor::remoteness(3)]).unwrap();
        let body = BodyLayout {
            layout: &layout,
            default_record: &[0, 0],
            chunk_bits: 2,
            chunk_base: 0,
        };
        let mut solved = SolvedPositions::new(3);
        solved.insert(0, 1).unwrap();
        let mut progress = ProgressReporter::new(1, Duration::ZERO, false);
        let mut out = Cursor::new(Vec::new());
        assert!(write_body(&mut out, &solved, &body, &mut progress).is_err());
    }

    #[test]
    fn overflow_aborts_the_pass() {
        // layout sized for remoteness <= 1, result holds 5
        let layout = RecordLayout::new(vec![FieldDescriptor::remoteness(1)]).unwrap();
        let default_record = layout.default_record().unwrap();
        let body = BodyLayout {
            layout: &layout,
            default_record: &default_record,
            chunk_bits: 2,
            chunk_base: 0,
        };
        let mut solved = SolvedPositions::new(7);
        solved.insert(6, 5).unwrap();
        let mut progress = ProgressReporter::new(2, Duration::ZERO, false);
        let mut out = Cursor::new(Vec::new());
        let err = write_body(&mut out, &solved, &body, &mut progress).unwrap_err();
        assert!(matches!(err, DbError::EncodingOverflow { value: 5, .. }));
    }

    #[test]
    fn invalid_puzzle_fails_before_io() {
        let solved = SolvedPositions::new(10);
        let mut out = Cursor::new(Vec::new());
        let err =
            write_database_to(&mut out, "../x", &PuzzleOptions::new(), &solved, &quiet()).unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
        assert!(out.get_ref().is_empty());
    }
}
