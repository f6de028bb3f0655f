//! Chunked validation for large uploads.
//!
//! The host drives validation one bounded chunk at a time so it can report
//! progress between chunks or stop early. The result never depends on the
//! chunk size, and a single record is never split across chunks.

use crate::report::BatchReport;
use crate::validation::{validate_record, ValidationOptions};
use serde_json::Value;

/// Items validated per step when the host does not choose.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    pub processed: usize,
    pub total: usize,
}

impl ChunkProgress {
    /// Completed share in `[0.0, 1.0]`. An empty batch counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// Resumable validation over a borrowed batch.
///
/// Dropping the validator (or calling [`ChunkedValidator::into_report`])
/// between chunks cancels the run; everything validated so far stays usable.
pub struct ChunkedValidator<'a> {
    items: &'a [Value],
    chunk_size: usize,
    options: ValidationOptions,
    report: BatchReport,
}

impl<'a> ChunkedValidator<'a> {
    pub fn new(items: &'a [Value], chunk_size: usize) -> Self {
        Self::resume(items, chunk_size, BatchReport::default())
    }

    /// Continue from a partial report produced by an earlier, abandoned run
    /// over the same items.
    pub fn resume(items: &'a [Value], chunk_size: usize, report: BatchReport) -> Self {
        Self {
            items,
            chunk_size: chunk_size.max(1),
            options: ValidationOptions::default(),
            report,
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate the next chunk. Returns `None` once every item is processed.
    pub fn next_chunk(&mut self) -> Option<ChunkProgress> {
        let start = self.report.processed();
        if start >= self.items.len() {
            return None;
        }
        let end = start.saturating_add(self.chunk_size).min(self.items.len());
        for (offset, item) in self.items[start..end].iter().enumerate() {
            self.report
                .push(start + offset, validate_record(item, &self.options));
        }
        tracing::debug!("Validated items {}..{} of {}", start, end, self.items.len());
        Some(self.progress())
    }

    pub fn progress(&self) -> ChunkProgress {
        ChunkProgress {
            processed: self.report.processed(),
            total: self.items.len(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.report.processed() >= self.items.len()
    }

    pub fn report(&self) -> &BatchReport {
        &self.report
    }

    pub fn into_report(self) -> BatchReport {
        self.report
    }
}

impl Iterator for ChunkedValidator<'_> {
    type Item = ChunkProgress;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk()
    }
}

/// Run chunked validation to completion.
pub fn validate_items_chunked(
    items: &[Value],
    chunk_size: usize,
    options: &ValidationOptions,
) -> BatchReport {
    let mut validator = ChunkedValidator::new(items, chunk_size).with_options(*options);
    while validator.next_chunk().is_some() {}
    validator.into_report()
}
