//! Distinct values used to populate filter choices.

use crate::models::BattleRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Each map id with the number of records on it, sorted by map id.
pub fn map_counts(records: &[BattleRecord]) -> Vec<(i64, usize)> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.map_id).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Sorted, deduplicated participant names across all records.
pub fn distinct_participant_names(records: &[BattleRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|r| r.participants.iter().map(|p| p.name.as_str()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
