//! Solved position sets consumed by the database writer.

use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;

use crate::error::{DbError, Result};

/// Read-only view of a completed search.
pub trait SearchResult {
    /// Inclusive upper bound on positions.
    fn max_hash(&self) -> u64;
    /// Largest remoteness over all reached positions (0 if none).
    fn max_level(&self) -> u64;
    /// Remoteness of `position`, or `None` if the search never reached it.
    fn get(&self, position: u64) -> Option<u64>;
    /// Number of reached positions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hash map backed [`SearchResult`].
#[derive(Debug, Clone, Default)]
pub struct SolvedPositions {
    max_hash: u64,
    max_level: u64,
    seen: HashMap<u64, u64>,
}

#[derive(Deserialize)]
struct PositionRow {
    position: u64,
    remoteness: u64,
}

impl SolvedPositions {
    pub fn new(max_hash: u64) -> Self {
        Self {
            max_hash,
            max_level: 0,
            seen: HashMap::new(),
        }
    }

    /// Record the remoteness of a reached position.
    pub fn insert(&mut self, position: u64, remoteness: u64) -> Result<()> {
        if position > self.max_hash {
            return Err(DbError::Input(format!(
                "position {position} exceeds max hash {}",
                self.max_hash
            )));
        }
        self.seen.insert(position, remoteness);
        self.max_level = self.max_level.max(remoteness);
        Ok(())
    }

    /// Load `position,remoteness` rows from CSV.
    ///
    /// Without an explicit `max_hash` the largest listed position is used.
    pub fn from_csv<R: Read>(reader: R, max_hash: Option<u64>) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut rows = Vec::new();
        for row in rdr.deserialize::<PositionRow>() {
            rows.push(row?);
        }
        let max_hash = match max_hash {
            Some(h) => h,
            None => rows.iter().map(|r| r.position).max().unwrap_or(0),
        };
        let mut solved = Self::new(max_hash);
        for row in rows {
            solved.insert(row.position, row.remoteness)?;
        }
        Ok(solved)
    }
}

impl SearchResult for SolvedPositions {
    fn max_hash(&self) -> u64 {
        self.max_hash
    }

    fn max_level(&self) -> u64 {
        self.max_level
    }

    fn get(&self, position: u64) -> Option<u64> {
        self.seen.get(&position).copied()
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}
