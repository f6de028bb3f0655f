//! Data models for battle telemetry records.
//!
//! Field names on the wire are camelCase. Every struct keeps the fields it
//! does not interpret in `extra` so uploads survive a re-serialization
//! unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Width of the world map in game units (inclusive upper bound for `x`).
pub const MAP_WIDTH: i64 = 6000;

/// Height of the world map in game units (inclusive upper bound for `y`).
pub const MAP_HEIGHT: i64 = 8000;

/// One combat event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRecord {
    pub id: i64,
    pub map_id: i64,
    pub x: i64,
    pub y: i64,
    pub floor: i64,
    /// Sub-area / terrain code.
    pub field: i64,
    /// Declared participant count. Not checked against `participants`.
    pub participant_count: i64,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub results: Vec<Outcome>,
    pub is_event: bool,
    /// Provenance tag, usually a packet file path or a timestamp.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BattleRecord {
    /// True when at least one participant is player-controlled.
    pub fn has_player(&self) -> bool {
        self.participants.iter().any(Participant::is_player_controlled)
    }

    /// True when the coordinates lie inside the world map.
    pub fn in_map_bounds(&self) -> bool {
        (0..=MAP_WIDTH).contains(&self.x) && (0..=MAP_HEIGHT).contains(&self.y)
    }
}

/// One combatant, player or non-player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: i64,
    /// Position inside the battle field, not on the world map.
    pub x: i64,
    pub y: i64,
    pub name: String,
    pub current_hp: i64,
    pub max_hp: i64,
    pub job_code: i64,
    /// Raw flag as uploaded: 0 for players, anything else (usually the
    /// 32-bit all-ones value 4294967295) for NPCs and monsters. Kept as a JSON
    /// number so unsigned values above `i64::MAX` survive unchanged.
    pub is_npc: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Participant {
    pub fn is_player_controlled(&self) -> bool {
        self.is_npc.as_i64() == Some(0)
    }

    pub fn is_npc(&self) -> bool {
        !self.is_player_controlled()
    }
}

/// One combat action entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: i64,
    pub action_type: i64,
    /// Meaning depends on `action_type` (skill id, item id, ...).
    pub value: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One result entry, e.g. `status_change` or `battle_end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: String,
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Battle reward. Unknown numeric fields ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub exp: i64,
    pub gold: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
