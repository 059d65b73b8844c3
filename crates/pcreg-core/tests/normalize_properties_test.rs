//! Property tests for the migration engine
//!
//! Whatever JSON comes in, the document that comes out satisfies the model
//! invariants and survives a second pass unchanged.

use chrono::{TimeZone, Utc};
use pcreg_core::migration::{normalize, normalize_with_report};
use pcreg_core::models::train::{MAX_DELAY_MINUTES, MAX_PRIORITY, MIN_DELAY_MINUTES, MIN_PRIORITY};
use pcreg_core::models::{Document, CURRENT_SCHEMA_VERSION};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[a-zA-Zéà ]{0,12}".prop_map(Value::String),
        prop_oneof![
            Just("Retenu"),
            Just("held"),
            Just("En cours"),
            Just("Décision"),
            Just("2024-05-01T08:00:00Z"),
            Just("12"),
        ]
        .prop_map(|s| Value::String(s.to_string())),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(arb_key(), inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("id"),
        Just("number"),
        Just("delayMin"),
        Just("priority"),
        Just("status"),
        Just("type"),
        Just("trainId"),
        Just("updatedAt"),
        Just("rpOffsetMinutes"),
        Just("autosave"),
        Just("other"),
    ]
    .prop_map(str::to_string)
}

/// A document-shaped value whose collections hold arbitrary records
fn arb_document_like() -> impl Strategy<Value = Value> {
    (
        prop::option::of(0u32..5),
        arb_json(),
        prop::collection::vec(arb_json(), 0..6),
        prop::collection::vec(arb_json(), 0..6),
        prop::collection::vec(arb_json(), 0..6),
    )
        .prop_map(|(version, settings, trains, incidents, logs)| {
            let mut map = Map::new();
            if let Some(version) = version {
                map.insert("schemaVersion".to_string(), Value::from(version));
            }
            map.insert("settings".to_string(), settings);
            map.insert("trains".to_string(), Value::Array(trains));
            map.insert("incidents".to_string(), Value::Array(incidents));
            map.insert("logs".to_string(), Value::Array(logs));
            Value::Object(map)
        })
}

fn assert_invariants(doc: &Document) {
    assert_eq!(doc.schema_version, CURRENT_SCHEMA_VERSION);
    assert!(!doc.settings.zone_name.is_empty());
    assert!(!doc.settings.operator_name.is_empty());

    let mut ids = HashSet::new();
    for train in &doc.trains {
        assert!((MIN_DELAY_MINUTES..=MAX_DELAY_MINUTES).contains(&train.delay_min));
        assert!((MIN_PRIORITY..=MAX_PRIORITY).contains(&train.priority));
        assert!(!train.id.as_str().is_empty());
        assert!(ids.insert(train.id.as_str().to_string()), "duplicate train id");
    }

    let mut ids = HashSet::new();
    for incident in &doc.incidents {
        assert!(ids.insert(incident.id.as_str().to_string()), "duplicate incident id");
    }

    let mut ids = HashSet::new();
    for log in &doc.logs {
        assert!(ids.insert(log.id.as_str().to_string()), "duplicate log id");
    }
}

proptest! {
    #[test]
    fn prop_any_json_normalizes_to_a_valid_document(raw in arb_json()) {
        let doc = normalize(Some(raw), Utc::now());
        assert_invariants(&doc);
    }

    #[test]
    fn prop_document_like_input_keeps_every_object_record(raw in arb_document_like()) {
        let object_records = |key: &str| {
            raw[key].as_array().map_or(0, |records| records.iter().filter(|r| r.is_object()).count())
        };
        let expected = (object_records("trains"), object_records("incidents"), object_records("logs"));

        let doc = normalize(Some(raw.clone()), Utc::now());
        assert_invariants(&doc);
        prop_assert_eq!((doc.trains.len(), doc.incidents.len(), doc.logs.len()), expected);
    }

    #[test]
    fn prop_normalizing_twice_changes_nothing(raw in arb_document_like()) {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let once = normalize(Some(raw), now);
        let twice = normalize(Some(serde_json::to_value(&once).unwrap()), now);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_delay_is_clamped(delay in any::<i64>()) {
        let raw = json!({ "schemaVersion": 2, "trains": [{ "id": "T1", "delayMin": delay }] });
        let doc = normalize(Some(raw), Utc::now());
        prop_assert_eq!(doc.trains[0].delay_min, delay.clamp(MIN_DELAY_MINUTES, MAX_DELAY_MINUTES));
    }
}

#[test]
fn test_v1_import_preserves_records() {
    let raw = json!({
        "trains": [
            { "id": "T1", "number": "TER 1", "mission": "TER", "status": "Retenu", "delayMin": 7 },
            { "id": "T2", "number": "TER 2", "priority": "1" }
        ],
        "incidents": [
            { "id": "I1", "status": "En cours", "location": "Molsheim", "trainId": "T1" }
        ],
        "logs": [
            { "id": "L1", "type": "Décision", "text": "Hold at platform", "trainId": "T1" }
        ],
        "settings": { "networkStatus": "Perturbé", "operatorName": "" }
    });

    let (doc, report) = normalize_with_report(Some(raw), Utc::now());
    assert_eq!(report.applied, vec![(1, 2)]);

    assert_eq!(doc.trains.len(), 2);
    assert_eq!(doc.trains[0].status.as_str(), "held");
    assert_eq!(doc.trains[0].delay_min, 7);
    assert_eq!(doc.trains[1].priority, 1);
    assert_eq!(doc.incidents[0].status.as_str(), "in-progress");
    assert_eq!(doc.logs[0].entry_type, pcreg_core::models::LogType::Decision);
    assert_eq!(doc.train_of(&doc.logs[0]).map(|t| t.number.as_str()), Some("TER 1"));

    assert_eq!(doc.settings.network_status.as_str(), "disrupted");
    assert_eq!(doc.settings.operator_name, "Régulateur");
    assert_eq!(doc.settings.rp_offset_minutes, 0);
    assert!(doc.settings.autosave);
}
