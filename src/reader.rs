use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{DbError, Result};
use crate::header::{chunk_base, read_header, DatabaseHeader};
use crate::record::{RecordLayout, REMOTENESS_FIELD};

/// Random-access lookups into a written database.
///
/// A chunk region that lies past the end of the file, or that reads back
/// entirely zero-filled, holds no chunk data and every position in it reads
/// as `None`. Holes inside the file read back as zeros, so they land in the
/// second case. A written chunk whose records are all the zero default is
/// indistinguishable from a hole and also reads as `None`; inside any other
/// written chunk, unreached positions decode like the default record.
pub struct DatabaseReader<R> {
    src: R,
    header: DatabaseHeader,
    header_len: u64,
    layout: RecordLayout,
    chunk_base: u64,
    len: u64,
    /// Last chunk read: index and bytes, `None` bytes for no chunk data.
    cached: Option<(u64, Option<Vec<u8>>)>,
}

impl DatabaseReader<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> DatabaseReader<R> {
    pub fn new(mut src: R) -> Result<Self> {
        let len = src.seek(SeekFrom::End(0))?;
        src.seek(SeekFrom::Start(0))?;
        let (header, header_len) = read_header(BufReader::new(&mut src))?;
        let layout = header.layout()?;
        let stride = header.chunk_len() * layout.record_len() as u64;
        Ok(Self {
            src,
            chunk_base: chunk_base(header_len, stride),
            header,
            header_len,
            layout,
            len,
            cached: None,
        })
    }

    pub fn header(&self) -> &DatabaseHeader {
        &self.header
    }

    pub fn header_len(&self) -> u64 {
        self.header_len
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    pub fn chunk_base(&self) -> u64 {
        self.chunk_base
    }

    /// Size of one chunk region in bytes.
    pub fn chunk_stride(&self) -> u64 {
        self.header.chunk_len() * self.layout.record_len() as u64
    }

    /// Byte offset of the record for `position`.
    pub fn record_offset(&self, position: u64) -> u64 {
        let chunk = position >> self.header.chunk_bits;
        let slot = position & (self.header.chunk_len() - 1);
        (self.chunk_base + chunk) * self.chunk_stride() + slot * self.layout.record_len() as u64
    }

    /// Whether the chunk holding `position` lies within the file.
    pub fn chunk_present(&self, position: u64) -> bool {
        let chunk = position >> self.header.chunk_bits;
        (self.chunk_base + 1)
            .checked_add(chunk)
            .and_then(|end| end.checked_mul(self.chunk_stride()))
            .is_some_and(|end| end <= self.len)
    }

    /// Load the chunk holding `position` into the cache.
    fn load_chunk(&mut self, position: u64) -> Result<Option<&[u8]>> {
        let chunk = position >> self.header.chunk_bits;
        let hit = matches!(&self.cached, Some((idx, _)) if *idx == chunk);
        if !hit {
            let data = if self.chunk_present(position) {
                let stride = self.chunk_stride();
                let mut buf = vec![0u8; stride as usize];
                self.src
                    .seek(SeekFrom::Start((self.chunk_base + chunk) * stride))?;
                self.src.read_exact(&mut buf)?;
                if buf.iter().all(|&b| b == 0) {
                    None
                } else {
                    Some(buf)
                }
            } else {
                None
            };
            self.cached = Some((chunk, data));
        }
        Ok(self.cached.as_ref().and_then(|(_, data)| data.as_deref()))
    }

    /// Decoded field values stored for `position`, or `None` when its chunk
    /// holds no chunk data.
    pub fn record(&mut self, position: u64) -> Result<Option<Vec<u64>>> {
        let rec_len = self.layout.record_len();
        let slot = (position & (self.header.chunk_len() - 1)) as usize;
        let Some(chunk) = self.load_chunk(position)? else {
            return Ok(None);
        };
        let bytes = chunk[slot * rec_len..(slot + 1) * rec_len].to_vec();
        Ok(Some(self.layout.decode(&bytes)?))
    }

    /// Stored remoteness for `position`.
    pub fn remoteness(&mut self, position: u64) -> Result<Option<u64>> {
        let idx = self
            .layout
            .fields()
            .iter()
            .position(|f| f.name == REMOTENESS_FIELD)
            .ok_or_else(|| DbError::Header("no remoteness field".into()))?;
        Ok(self.record(position)?.map(|values| values[idx]))
    }
}
