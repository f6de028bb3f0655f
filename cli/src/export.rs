//! Writes filtered records to JSON or CSV.

use anyhow::{Context, Result};
use battlemap_core::BattleRecord;
use serde::Serialize;
use std::path::Path;

/// Flat per-record row for spreadsheet use.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: i64,
    map_id: i64,
    x: i64,
    y: i64,
    floor: i64,
    field: i64,
    participant_count: i64,
    has_player: bool,
    is_event: bool,
    source: &'a str,
    exp: Option<i64>,
    gold: Option<i64>,
}

impl<'a> From<&'a BattleRecord> for CsvRow<'a> {
    fn from(record: &'a BattleRecord) -> Self {
        Self {
            id: record.id,
            map_id: record.map_id,
            x: record.x,
            y: record.y,
            floor: record.floor,
            field: record.field,
            participant_count: record.participant_count,
            has_player: record.has_player(),
            is_event: record.is_event,
            source: &record.source,
            exp: record.reward.as_ref().map(|r| r.exp),
            gold: record.reward.as_ref().map(|r| r.gold),
        }
    }
}

pub async fn write_json(path: &Path, records: &[&BattleRecord]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(records)?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

pub fn write_csv(path: &Path, records: &[&BattleRecord]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    for record in records {
        writer.serialize(CsvRow::from(*record))?;
    }
    writer.flush()?;
    Ok(())
}
