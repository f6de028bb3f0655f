//! Batch validation results and the summary shown to users after an upload.

use crate::models::BattleRecord;
use crate::validation::{RecordError, Violation};
use serde::Serialize;
use std::fmt;

/// Valid records plus per-index errors for one batch.
///
/// Every processed item lands in exactly one of the two lists, so
/// `processed()` doubles as the resume position for chunked validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub records: Vec<BattleRecord>,
    pub errors: Vec<RecordError>,
}

impl BatchReport {
    pub fn push(&mut self, index: usize, outcome: Result<BattleRecord, Vec<Violation>>) {
        match outcome {
            Ok(record) => self.records.push(record),
            Err(violations) => self.errors.push(RecordError { index, violations }),
        }
    }

    pub fn processed(&self) -> usize {
        self.records.len() + self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records outside the map, whether rejected or accepted with a warning.
    pub fn out_of_bounds(&self) -> usize {
        let rejected = self
            .errors
            .iter()
            .filter(|e| e.has_range_violation())
            .count();
        let accepted = self.records.iter().filter(|r| !r.in_map_bounds()).count();
        rejected + accepted
    }

    pub fn summary(&self, max_reasons: usize) -> IngestSummary {
        IngestSummary {
            loaded: self.records.len(),
            failed: self.errors.len(),
            out_of_bounds: self.out_of_bounds(),
            reasons: self
                .errors
                .iter()
                .take(max_reasons)
                .map(ToString::to_string)
                .collect(),
        }
    }

    pub fn into_records(self) -> Vec<BattleRecord> {
        self.records
    }
}

/// What a host tells the user after an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub loaded: usize,
    pub failed: usize,
    pub out_of_bounds: usize,
    /// First few failures, formatted `index N: reason, reason`.
    pub reasons: Vec<String>,
}

impl IngestSummary {
    pub fn total(&self) -> usize {
        self.loaded + self.failed
    }
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} records loaded, {} failed",
            self.loaded,
            self.total(),
            self.failed
        )?;
        if self.out_of_bounds > 0 {
            write!(f, ", {} outside map bounds", self.out_of_bounds)?;
        }
        Ok(())
    }
}
