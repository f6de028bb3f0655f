//! Validation and normalization of uploaded battle records.
//!
//! Every check on a record runs and every violation is collected; a record is
//! valid only when nothing was flagged. Bad records never abort the batch.

use crate::error::{BattleMapError, Result};
use crate::models::{Action, BattleRecord, Outcome, Participant, Reward, MAP_HEIGHT, MAP_WIDTH};
use crate::report::BatchReport;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

const RECORD_FIELDS: &[&str] = &[
    "id",
    "mapId",
    "x",
    "y",
    "floor",
    "field",
    "participantCount",
    "participants",
    "actions",
    "results",
    "isEvent",
    "source",
    "reward",
];
const PARTICIPANT_FIELDS: &[&str] = &[
    "id",
    "x",
    "y",
    "name",
    "currentHp",
    "maxHp",
    "jobCode",
    "isNpc",
    "guildName",
];
const ACTION_FIELDS: &[&str] = &["id", "actionType", "value"];
const OUTCOME_FIELDS: &[&str] = &["kind", "message"];
const REWARD_FIELDS: &[&str] = &["exp", "gold"];

/// What is wrong with a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    Missing,
    NotAnObject,
    NotANumber,
    NotAnInteger,
    /// Integral, but outside what a signed 64-bit field can hold.
    Overflow,
    NotAList,
    NotABoolean,
    NotAString,
    Negative,
    OutOfRange { min: i64, max: i64 },
}

/// One failed check. `field` is a path such as `participants[0].name`;
/// it is empty when the record itself is not an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub problem: Problem,
}

impl Violation {
    pub fn new(field: impl Into<String>, problem: Problem) -> Self {
        Self {
            field: field.into(),
            problem,
        }
    }

    /// Coordinate or numeric bound outside declared limits.
    pub fn is_range_violation(&self) -> bool {
        matches!(self.problem, Problem::OutOfRange { .. })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            return match self.problem {
                Problem::NotAnObject => write!(f, "not an object"),
                _ => write!(f, "record is invalid"),
            };
        }
        let field = &self.field;
        match self.problem {
            Problem::Missing => write!(f, "{field} is missing"),
            Problem::NotAnObject => write!(f, "{field} is not an object"),
            Problem::NotANumber => write!(f, "{field} is not a number"),
            Problem::NotAnInteger => write!(f, "{field} is not an integer"),
            Problem::Overflow => write!(f, "{field} does not fit in a 64-bit integer"),
            Problem::NotAList => write!(f, "{field} is not a list"),
            Problem::NotABoolean => write!(f, "{field} is not a boolean"),
            Problem::NotAString => write!(f, "{field} is not a string"),
            Problem::Negative => write!(f, "{field} is negative"),
            Problem::OutOfRange { min, max } => {
                write!(f, "{field} is out of range [{min}, {max}]")
            }
        }
    }
}

/// A record that failed validation, identified by its position in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub index: usize,
    pub violations: Vec<Violation>,
}

impl RecordError {
    /// Human-readable reasons, one per violation, in check order.
    pub fn reasons(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    pub fn has_range_violation(&self) -> bool {
        self.violations.iter().any(Violation::is_range_violation)
    }

    /// True if any violation is about `field` (exact path match).
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index {}: {}", self.index, self.reasons().join(", "))
    }
}

/// How out-of-map coordinates are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsPolicy {
    /// Out-of-range coordinates make the record invalid.
    #[default]
    Reject,
    /// Out-of-range coordinates are accepted and only counted as warnings.
    Warn,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    pub bounds: BoundsPolicy,
}

impl ValidationOptions {
    pub fn with_bounds(bounds: BoundsPolicy) -> Self {
        Self { bounds }
    }
}

/// Split a parsed payload into its items. A bare object is a one-element batch.
pub fn batch_items(payload: &Value) -> Result<&[Value]> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(std::slice::from_ref(payload)),
        _ => Err(BattleMapError::BatchStructure(
            "batch is not a list".to_string(),
        )),
    }
}

/// Parse upload text into a list of raw items.
pub fn parse_batch(text: &str) -> Result<Vec<Value>> {
    let payload: Value = serde_json::from_str(text)?;
    if let Value::Array(items) = payload {
        return Ok(items);
    }
    batch_items(&payload)?;
    Ok(vec![payload])
}

/// Validate a whole payload with the default options.
pub fn validate_batch(payload: &Value) -> Result<BatchReport> {
    validate_batch_with(payload, &ValidationOptions::default())
}

pub fn validate_batch_with(payload: &Value, options: &ValidationOptions) -> Result<BatchReport> {
    let items = batch_items(payload)?;
    Ok(validate_items_with(items, options))
}

/// Validate already-split items with the default options.
pub fn validate_items(items: &[Value]) -> BatchReport {
    validate_items_with(items, &ValidationOptions::default())
}

pub fn validate_items_with(items: &[Value], options: &ValidationOptions) -> BatchReport {
    let mut report = BatchReport::default();
    for (index, item) in items.iter().enumerate() {
        report.push(index, validate_record(item, options));
    }
    tracing::debug!(
        "Validated {} items: {} records, {} errors",
        items.len(),
        report.records.len(),
        report.errors.len()
    );
    report
}

/// Validate and normalize one raw item.
pub fn validate_record(
    value: &Value,
    options: &ValidationOptions,
) -> std::result::Result<BattleRecord, Vec<Violation>> {
    let Some(object) = value.as_object() else {
        return Err(vec![Violation::new("", Problem::NotAnObject)]);
    };

    let mut checker = Checker::new(options.bounds);
    let record = checker.record(object);
    match record {
        Some(record) if checker.violations.is_empty() => {
            if record.participant_count != record.participants.len() as i64 {
                tracing::debug!(
                    "Record {} declares {} participants but lists {}",
                    record.id,
                    record.participant_count,
                    record.participants.len()
                );
            }
            Ok(record)
        }
        _ => Err(checker.violations),
    }
}

/// Interpret a JSON value as an integer. Floats are accepted when integral.
fn as_integer(value: &Value) -> std::result::Result<i64, Problem> {
    let Value::Number(number) = value else {
        return Err(Problem::NotANumber);
    };
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    if number.is_u64() {
        return Err(Problem::Overflow);
    }
    match number.as_f64() {
        // 2^63 itself is exactly representable but one past i64::MAX.
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        Some(f) if f.fract() == 0.0 => Err(Problem::Overflow),
        _ => Err(Problem::NotAnInteger),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Fields not in `known`, kept verbatim.
fn extras(object: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    object
        .iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

type EntryReader<T> = fn(&mut Checker, &Map<String, Value>, &str) -> Option<T>;

/// Collects violations while reading typed values out of JSON objects.
/// Getters return `None` for any field they flagged.
struct Checker {
    bounds: BoundsPolicy,
    violations: Vec<Violation>,
}

impl Checker {
    fn new(bounds: BoundsPolicy) -> Self {
        Self {
            bounds,
            violations: Vec::new(),
        }
    }

    fn flag(&mut self, field: String, problem: Problem) {
        self.violations.push(Violation::new(field, problem));
    }

    fn int(&mut self, object: &Map<String, Value>, path: &str, key: &str) -> Option<i64> {
        let Some(value) = object.get(key) else {
            self.flag(join(path, key), Problem::Missing);
            return None;
        };
        match as_integer(value) {
            Ok(n) => Some(n),
            Err(problem) => {
                self.flag(join(path, key), problem);
                None
            }
        }
    }

    /// Like `int`, but unsigned values above `i64::MAX` are kept as they are.
    fn raw_int(&mut self, object: &Map<String, Value>, path: &str, key: &str) -> Option<Number> {
        match object.get(key) {
            Some(Value::Number(number)) if number.is_u64() => Some(number.clone()),
            _ => self.int(object, path, key).map(Number::from),
        }
    }

    fn non_negative(&mut self, object: &Map<String, Value>, path: &str, key: &str) -> Option<i64> {
        let n = self.int(object, path, key)?;
        if n < 0 {
            self.flag(join(path, key), Problem::Negative);
            return None;
        }
        Some(n)
    }

    fn coordinate(&mut self, object: &Map<String, Value>, key: &str, max: i64) -> Option<i64> {
        let n = self.int(object, "", key)?;
        if !(0..=max).contains(&n) && self.bounds == BoundsPolicy::Reject {
            self.flag(key.to_string(), Problem::OutOfRange { min: 0, max });
            return None;
        }
        Some(n)
    }

    fn string(&mut self, object: &Map<String, Value>, path: &str, key: &str) -> Option<String> {
        match object.get(key) {
            None => {
                self.flag(join(path, key), Problem::Missing);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.flag(join(path, key), Problem::NotAString);
                None
            }
        }
    }

    /// Missing and `null` both read as absent. Outer `None` means flagged.
    fn optional_string(
        &mut self,
        object: &Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<Option<String>> {
        match object.get(key) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(s)) => Some(Some(s.clone())),
            Some(_) => {
                self.flag(join(path, key), Problem::NotAString);
                None
            }
        }
    }

    fn boolean(&mut self, object: &Map<String, Value>, key: &str) -> Option<bool> {
        match object.get(key) {
            None => {
                self.flag(key.to_string(), Problem::Missing);
                None
            }
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                self.flag(key.to_string(), Problem::NotABoolean);
                None
            }
        }
    }

    /// Read a list of objects. A missing list is an error only when `required`;
    /// otherwise missing or `null` normalizes to an empty list.
    fn entries<T>(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        required: bool,
        read: EntryReader<T>,
    ) -> Option<Vec<T>> {
        let items = match object.get(key) {
            None | Some(Value::Null) if !required => return Some(Vec::new()),
            None => {
                self.flag(key.to_string(), Problem::Missing);
                return None;
            }
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.flag(key.to_string(), Problem::NotAList);
                return None;
            }
        };

        let mut out = Vec::with_capacity(items.len());
        let mut complete = true;
        for (i, item) in items.iter().enumerate() {
            let entry_path = format!("{key}[{i}]");
            let Some(entry) = item.as_object() else {
                self.flag(entry_path, Problem::NotAnObject);
                complete = false;
                continue;
            };
            match read(self, entry, &entry_path) {
                Some(parsed) => out.push(parsed),
                None => complete = false,
            }
        }
        complete.then_some(out)
    }

    fn reward(&mut self, object: &Map<String, Value>) -> Option<Option<Reward>> {
        let reward = match object.get("reward") {
            None | Some(Value::Null) => return Some(None),
            Some(Value::Object(reward)) => reward,
            Some(_) => {
                self.flag("reward".to_string(), Problem::NotAnObject);
                return None;
            }
        };
        let exp = self.non_negative(reward, "reward", "exp");
        let gold = self.non_negative(reward, "reward", "gold");
        Some(Some(Reward {
            exp: exp?,
            gold: gold?,
            extra: extras(reward, REWARD_FIELDS),
        }))
    }

    fn record(&mut self, object: &Map<String, Value>) -> Option<BattleRecord> {
        let id = self.int(object, "", "id");
        let map_id = self.int(object, "", "mapId");
        let x = self.coordinate(object, "x", MAP_WIDTH);
        let y = self.coordinate(object, "y", MAP_HEIGHT);
        let floor = self.int(object, "", "floor");
        let field = self.int(object, "", "field");
        let participant_count = self.int(object, "", "participantCount");
        let participants = self.entries(object, "participants", true, read_participant);
        let actions = self.entries(object, "actions", false, read_action);
        let results = self.entries(object, "results", false, read_outcome);
        let is_event = self.boolean(object, "isEvent");
        let source = self.string(object, "", "source");
        let reward = self.reward(object);

        Some(BattleRecord {
            id: id?,
            map_id: map_id?,
            x: x?,
            y: y?,
            floor: floor?,
            field: field?,
            participant_count: participant_count?,
            participants: participants?,
            actions: actions?,
            results: results?,
            is_event: is_event?,
            source: source?,
            reward: reward?,
            extra: extras(object, RECORD_FIELDS),
        })
    }
}

fn read_participant(c: &mut Checker, object: &Map<String, Value>, path: &str) -> Option<Participant> {
    let id = c.int(object, path, "id");
    let x = c.int(object, path, "x");
    let y = c.int(object, path, "y");
    let name = c.string(object, path, "name");
    let current_hp = c.non_negative(object, path, "currentHp");
    let max_hp = c.non_negative(object, path, "maxHp");
    let job_code = c.int(object, path, "jobCode");
    let is_npc = c.raw_int(object, path, "isNpc");
    let guild_name = c.optional_string(object, path, "guildName");

    Some(Participant {
        id: id?,
        x: x?,
        y: y?,
        name: name?,
        current_hp: current_hp?,
        max_hp: max_hp?,
        job_code: job_code?,
        is_npc: is_npc?,
        guild_name: guild_name?,
        extra: extras(object, PARTICIPANT_FIELDS),
    })
}

fn read_action(c: &mut Checker, object: &Map<String, Value>, path: &str) -> Option<Action> {
    let id = c.int(object, path, "id");
    let action_type = c.int(object, path, "actionType");
    let value = c.int(object, path, "value");

    Some(Action {
        id: id?,
        action_type: action_type?,
        value: value?,
        extra: extras(object, ACTION_FIELDS),
    })
}

fn read_outcome(c: &mut Checker, object: &Map<String, Value>, path: &str) -> Option<Outcome> {
    let kind = c.string(object, path, "kind");
    let message = c.string(object, path, "message");

    Some(Outcome {
        kind: kind?,
        message: message?,
        extra: extras(object, OUTCOME_FIELDS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_record() -> Value {
        json!({
            "id": 1,
            "mapId": 5,
            "x": 100,
            "y": 200,
            "floor": 0,
            "field": 1,
            "participantCount": 1,
            "participants": [{
                "id": 1, "x": 0, "y": 0, "name": "A",
                "currentHp": 10, "maxHp": 10, "jobCode": 1, "isNpc": 0
            }],
            "isEvent": false,
            "source": "t"
        })
    }

    fn reject(value: &Value) -> Vec<Violation> {
        validate_record(value, &ValidationOptions::default()).unwrap_err()
    }

    #[test]
    fn test_valid_record_defaults_optional_lists() {
        let record = validate_record(&valid_record(), &ValidationOptions::default()).unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.map_id, 5);
        assert!(record.actions.is_empty());
        assert!(record.results.is_empty());
        assert!(record.reward.is_none());
        assert!(record.has_player());
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_scalar_and_array_items_are_not_objects() {
        for item in [json!(null), json!(3), json!("x"), json!([1, 2])] {
            let violations = reject(&item);
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].to_string(), "not an object");
        }
    }

    #[test]
    fn test_every_offending_field_is_reported() {
        let violations = reject(&json!({"id": 2, "x": "bad"}));
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "mapId",
                "x",
                "y",
                "floor",
                "field",
                "participantCount",
                "participants",
                "isEvent",
                "source"
            ]
        );
        assert_eq!(violations[1].to_string(), "x is not a number");
        assert_eq!(violations[0].to_string(), "mapId is missing");
    }

    #[test]
    fn test_wrong_types_are_named() {
        let mut raw = valid_record();
        raw["id"] = json!("1");
        raw["participants"] = json!({});
        raw["isEvent"] = json!(0);
        raw["source"] = json!(7);
        let reasons: Vec<String> = reject(&raw).iter().map(ToString::to_string).collect();
        assert_eq!(
            reasons,
            vec![
                "id is not a number",
                "participants is not a list",
                "isEvent is not a boolean",
                "source is not a string"
            ]
        );
    }

    #[test]
    fn test_coordinate_bounds_are_inclusive() {
        let mut raw = valid_record();
        raw["x"] = json!(0);
        raw["y"] = json!(8000);
        assert!(validate_record(&raw, &ValidationOptions::default()).is_ok());

        raw["x"] = json!(6000);
        raw["y"] = json!(0);
        assert!(validate_record(&raw, &ValidationOptions::default()).is_ok());
    }

    #[test]
    fn test_out_of_range_coordinates_cite_the_field() {
        let mut raw = valid_record();
        raw["x"] = json!(6001);
        let violations = reject(&raw);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "x");
        assert!(violations[0].is_range_violation());
        assert_eq!(violations[0].to_string(), "x is out of range [0, 6000]");

        let mut raw = valid_record();
        raw["y"] = json!(-1);
        let violations = reject(&raw);
        assert_eq!(violations[0].field, "y");
        assert!(violations[0].is_range_violation());
    }

    #[test]
    fn test_range_violation_does_not_hide_other_checks() {
        let mut raw = valid_record();
        raw["x"] = json!(9999);
        raw["source"] = json!(null);
        let violations = reject(&raw);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].field, "x");
        assert_eq!(violations[1].field, "source");
    }

    #[test]
    fn test_warn_policy_accepts_out_of_bounds() {
        let mut raw = valid_record();
        raw["x"] = json!(7000);
        let options = ValidationOptions::with_bounds(BoundsPolicy::Warn);
        let record = validate_record(&raw, &options).unwrap();
        assert_eq!(record.x, 7000);
        assert!(!record.in_map_bounds());
    }

    #[test]
    fn test_integral_floats_accepted_fractional_rejected() {
        let mut raw = valid_record();
        raw["floor"] = json!(2.0);
        assert_eq!(
            validate_record(&raw, &ValidationOptions::default()).unwrap().floor,
            2
        );

        raw["floor"] = json!(2.5);
        assert_eq!(reject(&raw)[0].to_string(), "floor is not an integer");
    }

    #[test]
    fn test_npc_sentinel_preserved() {
        let mut raw = valid_record();
        raw["participants"][0]["isNpc"] = json!(4294967295u64);
        let record = validate_record(&raw, &ValidationOptions::default()).unwrap();
        assert_eq!(record.participants[0].is_npc.as_u64(), Some(4294967295));
        assert!(!record.participants[0].is_player_controlled());
        assert!(!record.has_player());
    }

    #[test]
    fn test_npc_flag_accepts_full_u64_range() {
        let mut raw = valid_record();
        raw["participants"][0]["isNpc"] = json!(u64::MAX);
        let record = validate_record(&raw, &ValidationOptions::default()).unwrap();
        assert_eq!(record.participants[0].is_npc.as_u64(), Some(u64::MAX));
        assert!(record.participants[0].is_npc());
        assert!(!record.has_player());

        raw["participants"][0]["isNpc"] = json!(0.0);
        let record = validate_record(&raw, &ValidationOptions::default()).unwrap();
        assert!(record.participants[0].is_player_controlled());
    }

    #[test]
    fn test_oversized_integers_report_overflow() {
        let mut raw = valid_record();
        raw["id"] = json!(u64::MAX);
        raw["floor"] = json!(9223372036854775808.0);
        let reasons: Vec<String> = reject(&raw).iter().map(ToString::to_string).collect();
        assert_eq!(
            reasons,
            vec![
                "id does not fit in a 64-bit integer",
                "floor does not fit in a 64-bit integer"
            ]
        );
    }

    #[test]
    fn test_nested_entries_report_paths() {
        let mut raw = valid_record();
        raw["participants"] = json!([
            {"id": 1, "x": 0, "y": 0, "name": 5, "currentHp": -1, "maxHp": 10, "jobCode": 1, "isNpc": 0},
            "monster"
        ]);
        raw["actions"] = json!([{"id": 1, "actionType": 2}]);
        raw["results"] = json!([{"kind": "battle_end"}]);
        let reasons: Vec<String> = reject(&raw).iter().map(ToString::to_string).collect();
        assert_eq!(
            reasons,
            vec![
                "participants[0].name is not a string",
                "participants[0].currentHp is negative",
                "participants[1] is not an object",
                "actions[0].value is missing",
                "results[0].message is missing"
            ]
        );
    }

    #[test]
    fn test_reward_is_checked_and_extras_kept() {
        let mut raw = valid_record();
        raw["reward"] = json!({"exp": 100, "gold": 10, "unknown_001": 4});
        let record = validate_record(&raw, &ValidationOptions::default()).unwrap();
        let reward = record.reward.unwrap();
        assert_eq!((reward.exp, reward.gold), (100, 10));
        assert_eq!(reward.extra.get("unknown_001"), Some(&json!(4)));

        raw["reward"] = json!(null);
        assert!(validate_record(&raw, &ValidationOptions::default())
            .unwrap()
            .reward
            .is_none());

        raw["reward"] = json!({"exp": -5, "gold": "a lot"});
        let reasons: Vec<String> = reject(&raw).iter().map(ToString::to_string).collect();
        assert_eq!(reasons, vec!["reward.exp is negative", "reward.gold is not a number"]);

        raw["reward"] = json!([1]);
        assert_eq!(reject(&raw)[0].to_string(), "reward is not an object");
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let mut raw = valid_record();
        raw["weather"] = json!("rain");
        raw["participants"][0]["sex"] = json!(1);
        raw["results"] = json!([{"kind": "battle_end", "message": "won", "skill": 12}]);
        let record = validate_record(&raw, &ValidationOptions::default()).unwrap();
        assert_eq!(record.extra.get("weather"), Some(&json!("rain")));
        assert_eq!(record.participants[0].extra.get("sex"), Some(&json!(1)));
        assert_eq!(record.results[0].extra.get("skill"), Some(&json!(12)));
    }

    #[test]
    fn test_parse_batch_accepts_object_or_list() {
        let one = parse_batch(r#"{"id": 1}"#).unwrap();
        assert_eq!(one.len(), 1);

        let many = parse_batch(r#"[{"id": 1}, 3]"#).unwrap();
        assert_eq!(many.len(), 2);

        let err = parse_batch("42").unwrap_err();
        assert!(matches!(err, BattleMapError::BatchStructure(_)));
        assert!(err.to_string().contains("batch is not a list"));

        assert!(matches!(
            parse_batch("[{").unwrap_err(),
            BattleMapError::Serialization(_)
        ));
    }

    #[test]
    fn test_validate_batch_rejects_scalar_payload() {
        let err = validate_batch(&json!("records")).unwrap_err();
        assert!(matches!(err, BattleMapError::BatchStructure(_)));
    }

    #[test]
    fn test_validate_batch_treats_object_as_single_item() {
        let report = validate_batch(&valid_record()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert!(report.errors.is_empty());
        assert_eq!(report.records[0].id, 1);

        let mut bad = valid_record();
        bad["x"] = json!(6001);
        let report = validate_batch(&bad).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].index, 0);
        assert!(report.errors[0].mentions("x"));
    }
}
