//! Periodic status reporting for long write passes.

use std::time::{Duration, Instant};

use indicatif::HumanDuration;

/// One progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub chunk_index: u64,
    pub total_chunks: u64,
    pub percent: f64,
    /// Linear estimate of the time left. `None` on the first chunk.
    pub remaining: Option<Duration>,
}

pub struct ProgressReporter {
    start: Instant,
    last_report: Instant,
    total_chunks: u64,
    min_interval: Duration,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(total_chunks: u64, min_interval: Duration, enabled: bool) -> Self {
        Self::starting_at(Instant::now(), total_chunks, min_interval, enabled)
    }

    pub fn starting_at(
        start: Instant,
        total_chunks: u64,
        min_interval: Duration,
        enabled: bool,
    ) -> Self {
        Self {
            start,
            last_report: start,
            total_chunks,
            min_interval,
            enabled,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Decide whether `chunk_index` warrants a report at time `now`.
    ///
    /// The first chunk is always reported. Later chunks are reported when at
    /// least `min_interval` has passed since the last report, and the second
    /// chunk is always reported to give an early estimate.
    pub fn update_at(&mut self, chunk_index: u64, now: Instant) -> Option<ProgressUpdate> {
        let percent = 100.0 * (chunk_index + 1) as f64 / self.total_chunks.max(1) as f64;
        if chunk_index == 0 {
            return Some(ProgressUpdate {
                chunk_index,
                total_chunks: self.total_chunks,
                percent,
                remaining: None,
            });
        }
        let since_last = now.saturating_duration_since(self.last_report);
        if since_last < self.min_interval && chunk_index != 1 {
            return None;
        }
        self.last_report = now;
        let elapsed = now.saturating_duration_since(self.start);
        let left = self.total_chunks.saturating_sub(chunk_index);
        Some(ProgressUpdate {
            chunk_index,
            total_chunks: self.total_chunks,
            percent,
            remaining: Some(Duration::from_nanos(
                (elapsed.as_nanos() * left as u128 / chunk_index as u128) as u64,
            )),
        })
    }

    /// Report progress after `chunk_index` has been processed.
    pub fn update(&mut self, chunk_index: u64) {
        if !self.enabled {
            return;
        }
        let Some(u) = self.update_at(chunk_index, Instant::now()) else {
            return;
        };
        match u.remaining {
            None => tracing::info!(
                total_chunks = u.total_chunks,
                "writing first chunk out of {}",
                u.total_chunks
            ),
            Some(remaining) => tracing::info!(
                chunk = u.chunk_index,
                total_chunks = u.total_chunks,
                "[{:3.2}%] writing chunk {}/{}, {} left",
                u.percent,
                u.chunk_index,
                u.total_chunks,
                HumanDuration(remaining)
            ),
        }
    }
}
