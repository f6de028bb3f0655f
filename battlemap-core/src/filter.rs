//! Multi-predicate filtering of validated records.
//!
//! Every predicate is optional. An absent predicate imposes no constraint;
//! present predicates are AND-combined. Integer comparisons run first, then
//! set membership, then string matching and date parsing.

use crate::models::{BattleRecord, Reward};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub map_id: Option<i64>,
    pub is_event: Option<bool>,
    pub coordinate_box: Option<CoordinateBox>,
    pub reward_range: Option<RewardRange>,
    pub participant_kind: Option<ParticipantKindFilter>,
    /// Matches when any participant's name is in the set. Empty means unset.
    pub participant_names_any_of: Option<BTreeSet<String>>,
    /// Case-insensitive substring of any participant name. Empty means unset.
    pub participant_name_contains: Option<String>,
    pub source_date_range: Option<DateRange>,
}

/// Inclusive bounds on the reward. A record without a reward fails as soon
/// as any bound is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardRange {
    pub min_exp: Option<i64>,
    pub max_exp: Option<i64>,
    pub min_gold: Option<i64>,
    pub max_gold: Option<i64>,
}

/// Inclusive world-map rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateBox {
    pub min_x: Option<i64>,
    pub max_x: Option<i64>,
    pub min_y: Option<i64>,
    pub max_y: Option<i64>,
}

/// Which battles to keep, keyed on whether any participant is a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantKindFilter {
    pub include_player_battles: bool,
    pub include_monster_battles: bool,
}

impl Default for ParticipantKindFilter {
    fn default() -> Self {
        Self {
            include_player_battles: true,
            include_monster_battles: true,
        }
    }
}

/// Inclusive range on the timestamp parsed from a record's `source`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

/// Total and matched record counts for a filter run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterCounts {
    pub total: usize,
    pub matched: usize,
}

fn within(value: i64, min: Option<i64>, max: Option<i64>) -> bool {
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}

impl RewardRange {
    pub fn is_active(&self) -> bool {
        self.min_exp.is_some()
            || self.max_exp.is_some()
            || self.min_gold.is_some()
            || self.max_gold.is_some()
    }

    pub fn matches(&self, reward: Option<&Reward>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(reward) = reward else {
            return false;
        };
        within(reward.exp, self.min_exp, self.max_exp)
            && within(reward.gold, self.min_gold, self.max_gold)
    }
}

impl CoordinateBox {
    pub fn is_active(&self) -> bool {
        self.min_x.is_some() || self.max_x.is_some() || self.min_y.is_some() || self.max_y.is_some()
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        within(x, self.min_x, self.max_x) && within(y, self.min_y, self.max_y)
    }
}

impl ParticipantKindFilter {
    pub fn is_active(&self) -> bool {
        !(self.include_player_battles && self.include_monster_battles)
    }

    pub fn matches(&self, has_player: bool) -> bool {
        if has_player {
            self.include_player_battles
        } else {
            self.include_monster_battles
        }
    }
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Unparseable sources never match an active range.
    pub fn matches(&self, source: &str) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(at) = parse_source_timestamp(source) else {
            return false;
        };
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}

/// Interpret a `source` tag as a timestamp. Accepts RFC 3339,
/// `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD`.
pub fn parse_source_timestamp(source: &str) -> Option<NaiveDateTime> {
    let source = source.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(source) {
        return Some(at.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(source, format) {
            return Some(at);
        }
    }
    NaiveDate::parse_from_str(source, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

impl FilterSpec {
    /// True when no predicate constrains anything.
    pub fn is_empty(&self) -> bool {
        self.map_id.is_none()
            && self.is_event.is_none()
            && !self.coordinate_box.is_some_and(|b| b.is_active())
            && !self.reward_range.is_some_and(|r| r.is_active())
            && !self.participant_kind.is_some_and(|k| k.is_active())
            && self.names_any_of().is_none()
            && self.name_needle().is_none()
            && !self.source_date_range.is_some_and(|d| d.is_active())
    }

    fn names_any_of(&self) -> Option<&BTreeSet<String>> {
        self.participant_names_any_of
            .as_ref()
            .filter(|names| !names.is_empty())
    }

    fn name_needle(&self) -> Option<String> {
        self.participant_name_contains
            .as_deref()
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase)
    }

    fn matches_with(&self, record: &BattleRecord, needle: Option<&str>) -> bool {
        if self.map_id.is_some_and(|map_id| record.map_id != map_id) {
            return false;
        }
        if self.is_event.is_some_and(|is_event| record.is_event != is_event) {
            return false;
        }
        if let Some(bounds) = &self.coordinate_box {
            if !bounds.contains(record.x, record.y) {
                return false;
            }
        }
        if let Some(range) = &self.reward_range {
            if !range.matches(record.reward.as_ref()) {
                return false;
            }
        }
        if let Some(kind) = &self.participant_kind {
            if !kind.matches(record.has_player()) {
                return false;
            }
        }
        if let Some(names) = self.names_any_of() {
            if !record.participants.iter().any(|p| names.contains(&p.name)) {
                return false;
            }
        }
        if let Some(needle) = needle {
            if !record
                .participants
                .iter()
                .any(|p| p.name.to_lowercase().contains(needle))
            {
                return false;
            }
        }
        if let Some(range) = &self.source_date_range {
            if !range.matches(&record.source) {
                return false;
            }
        }
        true
    }
}

/// Records matching `spec`, in input order, without cloning.
pub fn matching<'a>(
    records: &'a [BattleRecord],
    spec: &'a FilterSpec,
) -> impl Iterator<Item = &'a BattleRecord> + 'a {
    let needle = spec.name_needle();
    records
        .iter()
        .filter(move |record| spec.matches_with(record, needle.as_deref()))
}

/// Order-preserving subsequence of `records` matching every predicate.
pub fn apply(records: &[BattleRecord], spec: &FilterSpec) -> Vec<BattleRecord> {
    matching(records, spec).cloned().collect()
}

pub fn counts(records: &[BattleRecord], spec: &FilterSpec) -> FilterCounts {
    FilterCounts {
        total: records.len(),
        matched: matching(records, spec).count(),
    }
}
