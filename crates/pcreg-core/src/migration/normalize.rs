//! Normalization pass run on every document, whatever its original version.
//!
//! Works on the untyped JSON map so that missing, null or wrongly typed
//! fields can be repaired before the typed model is built.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::str::FromStr;

use crate::models::document::{
    clamp_rp_offset, DEFAULT_OPERATOR_NAME, DEFAULT_SAVED_BY, DEFAULT_ZONE_NAME,
};
use crate::models::train::{clamp_delay, clamp_priority};
use crate::models::{
    Document, IncidentId, IncidentStatus, LogId, LogType, NetworkStatus, TrainId, TrainStatus,
};

const DEFAULT_PRIORITY: i64 = 2;
const DEFAULT_POSITION: &str = "-";
const DEFAULT_REGULATOR: &str = "PC";

pub(super) fn document(mut map: Map<String, Value>, now: DateTime<Utc>) -> Document {
    normalize_meta(ensure_object(&mut map, "meta"), now);
    normalize_settings(ensure_object(&mut map, "settings"));

    normalize_collection(&mut map, "trains", now, normalize_train);
    normalize_collection(&mut map, "incidents", now, normalize_incident);
    normalize_collection(&mut map, "logs", now, normalize_log);

    match serde_json::from_value::<Document>(Value::Object(map)) {
        Ok(document) => document,
        Err(e) => {
            tracing::error!(error = %e, "Normalized document failed to load, starting from defaults");
            Document::new_default(now)
        }
    }
}

fn normalize_meta(meta: &mut Map<String, Value>, now: DateTime<Utc>) {
    let created_at = meta.get("createdAt").and_then(timestamp).unwrap_or(now);
    put_timestamp(meta, "createdAt", created_at);
    put_timestamp(meta, "updatedAt", now);

    let last_saved_at = meta
        .get("lastSavedAt")
        .and_then(timestamp)
        .map(|at| Value::String(format_timestamp(at)))
        .unwrap_or(Value::Null);
    meta.insert("lastSavedAt".to_string(), last_saved_at);

    let last_saved_by = text(meta.get("lastSavedBy")).unwrap_or_else(|| DEFAULT_SAVED_BY.to_string());
    meta.insert("lastSavedBy".to_string(), Value::String(last_saved_by));
}

fn normalize_settings(settings: &mut Map<String, Value>) {
    put_label::<NetworkStatus>(settings, "networkStatus");
    put_non_empty_text(settings, "zoneName", DEFAULT_ZONE_NAME);
    put_non_empty_text(settings, "operatorName", DEFAULT_OPERATOR_NAME);

    let offset = settings.get("rpOffsetMinutes").and_then(integer).unwrap_or(0);
    settings.insert("rpOffsetMinutes".to_string(), Value::from(clamp_rp_offset(offset)));

    // Only an explicit `false` turns autosave off.
    let autosave = !matches!(settings.get("autosave"), Some(Value::Bool(false)));
    settings.insert("autosave".to_string(), Value::Bool(autosave));
}

fn normalize_collection(
    map: &mut Map<String, Value>,
    key: &str,
    now: DateTime<Utc>,
    normalize_record: fn(&mut Map<String, Value>, &mut HashSet<String>, DateTime<Utc>),
) {
    let records = match map.remove(key) {
        Some(Value::Array(records)) => records,
        Some(other) => {
            tracing::warn!(collection = key, found = %type_name(&other), "Collection is not an array, resetting it");
            Vec::new()
        }
        None => Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(records.len());
    for (position, record) in records.into_iter().enumerate() {
        match record {
            Value::Object(mut fields) => {
                normalize_record(&mut fields, &mut seen, now);
                normalized.push(Value::Object(fields));
            }
            other => {
                tracing::warn!(collection = key, position, found = %type_name(&other), "Dropping record that is not an object");
            }
        }
    }
    map.insert(key.to_string(), Value::Array(normalized));
}

fn normalize_train(train: &mut Map<String, Value>, seen: &mut HashSet<String>, now: DateTime<Utc>) {
    put_unique_id(train, seen, || TrainId::generate().0);
    for key in ["number", "mission", "line", "od", "decision"] {
        put_text(train, key, "");
    }
    put_text(train, "position", DEFAULT_POSITION);
    put_text(train, "regulator", DEFAULT_REGULATOR);

    let delay = train.get("delayMin").and_then(integer).unwrap_or(0);
    train.insert("delayMin".to_string(), Value::from(clamp_delay(delay)));

    let priority = train.get("priority").and_then(integer).unwrap_or(DEFAULT_PRIORITY);
    train.insert("priority".to_string(), Value::from(clamp_priority(priority)));

    put_label::<TrainStatus>(train, "status");
    let updated_at = train.get("updatedAt").and_then(timestamp).unwrap_or(now);
    put_timestamp(train, "updatedAt", updated_at);
}

fn normalize_incident(
    incident: &mut Map<String, Value>,
    seen: &mut HashSet<String>,
    now: DateTime<Utc>,
) {
    put_unique_id(incident, seen, || IncidentId::generate().0);
    let created_at = incident.get("createdAt").and_then(timestamp).unwrap_or(now);
    put_timestamp(incident, "createdAt", created_at);
    put_label::<IncidentStatus>(incident, "status");
    for key in ["kind", "location", "severity", "description"] {
        put_text(incident, key, "");
    }
    put_reference(incident, "trainId");
    put_text(incident, "assignedTo", DEFAULT_REGULATOR);
}

fn normalize_log(log: &mut Map<String, Value>, seen: &mut HashSet<String>, now: DateTime<Utc>) {
    put_unique_id(log, seen, || LogId::generate().0);
    let at = log.get("at").and_then(timestamp).unwrap_or(now);
    put_timestamp(log, "at", at);
    put_label::<LogType>(log, "type");
    put_text(log, "text", "");
    put_reference(log, "trainId");
    put_reference(log, "incidentId");
    put_text(log, "author", DEFAULT_REGULATOR);
}

/// Get the object under `key`, replacing anything else found there with an empty object
pub(super) fn ensure_object<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map.entry(key.to_string()).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(object) => object,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

/// Lenient integer reading: numbers (truncated) and numeric strings
pub(super) fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// Lenient timestamp reading: RFC 3339 strings or epoch milliseconds.
/// Only four-digit years are kept so the value can be written back as RFC 3339.
fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let at = match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }?;
    (0..=9999).contains(&at.year()).then_some(at)
}

pub(super) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Scalars become strings; null, arrays and objects do not
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn put_text(map: &mut Map<String, Value>, key: &str, default: &str) {
    let value = text(map.get(key)).unwrap_or_else(|| default.to_string());
    map.insert(key.to_string(), Value::String(value));
}

fn put_non_empty_text(map: &mut Map<String, Value>, key: &str, default: &str) {
    let value = text(map.get(key))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    map.insert(key.to_string(), Value::String(value));
}

fn put_timestamp(map: &mut Map<String, Value>, key: &str, at: DateTime<Utc>) {
    map.insert(key.to_string(), Value::String(format_timestamp(at)));
}

/// Replace an enum label with its canonical form, or the default variant if unknown
fn put_label<T>(map: &mut Map<String, Value>, key: &str)
where
    T: FromStr + Serialize + Default,
{
    let parsed = match map.get(key) {
        Some(Value::String(label)) => label.parse::<T>().unwrap_or_default(),
        _ => T::default(),
    };
    map.insert(key.to_string(), serde_json::to_value(parsed).unwrap_or_default());
}

/// Optional weak reference: a non-empty id or null
fn put_reference(map: &mut Map<String, Value>, key: &str) {
    let value = text(map.get(key))
        .filter(|s| !s.trim().is_empty())
        .map(Value::String)
        .unwrap_or(Value::Null);
    map.insert(key.to_string(), value);
}

/// Keep the record's id if it is usable and not taken, otherwise mint a fresh one
fn put_unique_id(map: &mut Map<String, Value>, seen: &mut HashSet<String>, generate: fn() -> String) {
    let current = text(map.get("id")).filter(|id| !id.trim().is_empty());
    let id = match current {
        Some(id) if !seen.contains(&id) => id,
        previous => {
            let mut fresh = generate();
            while seen.contains(&fresh) {
                fresh = generate();
            }
            if let Some(previous) = previous {
                tracing::warn!(previous = %previous, replacement = %fresh, "Duplicate record id replaced");
            }
            fresh
        }
    };
    seen.insert(id.clone());
    map.insert("id".to_string(), Value::String(id));
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize_json(raw: Value) -> Document {
        let Value::Object(map) = raw else { panic!("test input must be an object") };
        document(map, Utc::now())
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(integer(&json!(5)), Some(5));
        assert_eq!(integer(&json!(-7.9)), Some(-7));
        assert_eq!(integer(&json!(" 30 ")), Some(30));
        assert_eq!(integer(&json!("2.5")), Some(2));
        assert_eq!(integer(&json!("abc")), None);
        assert_eq!(integer(&json!(true)), None);
        assert_eq!(integer(&json!(null)), None);
    }

    #[test]
    fn test_settings_are_filled_and_coerced() {
        let doc = normalize_json(json!({
            "settings": {
                "networkStatus": "Perturbé",
                "zoneName": "",
                "rpOffsetMinutes": "-30",
                "autosave": "no"
            }
        }));

        assert_eq!(doc.settings.network_status, NetworkStatus::Disrupted);
        assert_eq!(doc.settings.zone_name, DEFAULT_ZONE_NAME);
        assert_eq!(doc.settings.operator_name, DEFAULT_OPERATOR_NAME);
        assert_eq!(doc.settings.rp_offset_minutes, -30);
        // Anything but a literal false keeps autosave on
        assert!(doc.settings.autosave);
    }

    #[test]
    fn test_rp_offset_is_clamped() {
        let doc = normalize_json(json!({ "settings": { "rpOffsetMinutes": 9_000_000_000_000i64 } }));
        assert_eq!(doc.settings.rp_offset_minutes, crate::models::MAX_RP_OFFSET_MINUTES);

        let doc = normalize_json(json!({ "settings": { "rpOffsetMinutes": "-99999999" } }));
        assert_eq!(doc.settings.rp_offset_minutes, -crate::models::MAX_RP_OFFSET_MINUTES);
    }

    #[test]
    fn test_blank_position_is_kept_and_missing_one_defaulted() {
        let doc = normalize_json(json!({
            "trains": [{ "id": "TRN_a", "position": "" }, { "id": "TRN_b" }]
        }));
        assert_eq!(doc.trains[0].position, "");
        assert_eq!(doc.trains[1].position, "-");
    }

    #[test]
    fn test_wrong_typed_collections_become_empty() {
        let doc = normalize_json(json!({
            "trains": "not a list",
            "incidents": { "a": 1 },
            "logs": null
        }));
        assert!(doc.trains.is_empty());
        assert!(doc.incidents.is_empty());
        assert!(doc.logs.is_empty());
    }

    #[test]
    fn test_train_fields_are_clamped_and_defaulted() {
        let doc = normalize_json(json!({
            "trains": [
                { "id": "TRN_a", "number": 8123, "delayMin": 5000, "priority": 0, "status": "Supprimé" },
                { "id": "TRN_b", "delayMin": "-400", "priority": "9", "status": "teleported" },
                "garbage"
            ]
        }));

        assert_eq!(doc.trains.len(), 2);
        let first = &doc.trains[0];
        assert_eq!(first.number, "8123");
        assert_eq!(first.delay_min, 999);
        assert_eq!(first.priority, 1);
        assert_eq!(first.status, TrainStatus::Cancelled);
        assert_eq!(first.position, "-");
        assert_eq!(first.regulator, "PC");

        let second = &doc.trains[1];
        assert_eq!(second.delay_min, -120);
        assert_eq!(second.priority, 3);
        assert_eq!(second.status, TrainStatus::InService);
    }

    #[test]
    fn test_missing_and_duplicate_ids_are_replaced() {
        let doc = normalize_json(json!({
            "logs": [
                { "id": "LOG_1", "text": "a" },
                { "id": "LOG_1", "text": "b" },
                { "text": "c" },
                { "id": "", "text": "d" }
            ]
        }));

        let ids: HashSet<&str> = doc.logs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(doc.logs[0].id.as_str(), "LOG_1");
        assert!(doc.logs[1].id.as_str().starts_with("LOG_"));
        assert_eq!(doc.logs[1].text, "b");
    }

    #[test]
    fn test_references_are_kept_even_when_dangling() {
        let doc = normalize_json(json!({
            "incidents": [{ "id": "INC_1", "trainId": "TRN_gone", "status": "En cours" }],
            "logs": [{ "id": "LOG_1", "type": "Ordre", "trainId": "", "incidentId": "INC_1" }]
        }));

        let incident = &doc.incidents[0];
        assert_eq!(incident.train_id.as_ref().map(|t| t.as_str()), Some("TRN_gone"));
        assert_eq!(incident.status, IncidentStatus::InProgress);
        assert!(doc.find_train(incident.train_id.as_ref().unwrap()).is_none());

        let log = &doc.logs[0];
        assert_eq!(log.entry_type, LogType::Order);
        assert_eq!(log.train_id, None);
        assert_eq!(log.incident_id.as_ref().map(|i| i.as_str()), Some("INC_1"));
    }

    #[test]
    fn test_meta_keeps_created_at_and_last_save() {
        let doc = normalize_json(json!({
            "meta": {
                "createdAt": "2024-01-02T03:04:05Z",
                "lastSavedAt": "2024-01-02T04:00:00+01:00",
                "lastSavedBy": "autosave"
            }
        }));

        assert_eq!(format_timestamp(doc.meta.created_at), "2024-01-02T03:04:05Z");
        assert_eq!(
            doc.meta.last_saved_at.map(format_timestamp).as_deref(),
            Some("2024-01-02T03:00:00Z")
        );
        assert_eq!(doc.meta.last_saved_by, "autosave");
    }

    #[test]
    fn test_unparseable_timestamps_fall_back() {
        let doc = normalize_json(json!({
            "meta": { "createdAt": "yesterday", "lastSavedAt": "soon" },
            "trains": [{ "id": "TRN_1", "updatedAt": 1700000000000i64 }]
        }));
        assert_eq!(doc.meta.last_saved_at, None);
        assert_eq!(doc.trains[0].updated_at.timestamp_millis(), 1_700_000_000_000);
    }
}
