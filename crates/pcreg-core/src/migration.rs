//! Schema migration engine.
//!
//! [`normalize`] turns whatever was read from storage or an import file into
//! a current-schema [`Document`]. It never fails: input that is not a JSON
//! object becomes a fresh default document, older schemas are upgraded step
//! by step, and a normalization pass then fills and coerces every field.

mod normalize;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::models::{Document, CURRENT_SCHEMA_VERSION};

/// Version assumed for documents that carry no `schemaVersion`
pub const OLDEST_SCHEMA_VERSION: u32 = 1;

/// One upgrade between two consecutive schema versions.
///
/// Steps only add or retype fields; they never drop user data.
#[derive(Debug, Clone, Copy)]
pub struct MigrationStep {
    pub from: u32,
    pub to: u32,
    pub description: &'static str,
    apply: fn(&mut Map<String, Value>, DateTime<Utc>),
}

/// Known upgrade steps, in version order
pub const MIGRATIONS: &[MigrationStep] = &[MigrationStep {
    from: 1,
    to: 2,
    description: "Add meta block, regulation time offset and autosave setting",
    apply: upgrade_v1_to_v2,
}];

/// What happened while normalizing a raw value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version found in the input, `None` if the input was not a document at all
    pub from_version: Option<u32>,

    /// `(from, to)` pairs of the steps that ran
    pub applied: Vec<(u32, u32)>,
}

impl MigrationReport {
    pub fn upgraded(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Normalize a raw value into a current-schema document
pub fn normalize(raw: Option<Value>, now: DateTime<Utc>) -> Document {
    normalize_with_report(raw, now).0
}

/// Normalize a raw value, also reporting which upgrade steps ran
pub fn normalize_with_report(raw: Option<Value>, now: DateTime<Utc>) -> (Document, MigrationReport) {
    let Some(Value::Object(mut map)) = raw else {
        tracing::debug!("Raw document is not an object, starting from defaults");
        return (
            Document::new_default(now),
            MigrationReport { from_version: None, applied: Vec::new() },
        );
    };

    let found = schema_version_of(&map);
    let mut report = MigrationReport { from_version: Some(found), applied: Vec::new() };

    let mut version = found;
    if version > CURRENT_SCHEMA_VERSION {
        tracing::warn!(
            found,
            current = CURRENT_SCHEMA_VERSION,
            "Document was written by a newer schema, reading it as current"
        );
        version = CURRENT_SCHEMA_VERSION;
    }

    while version < CURRENT_SCHEMA_VERSION {
        match MIGRATIONS.iter().find(|step| step.from == version) {
            Some(step) => {
                (step.apply)(&mut map, now);
                tracing::info!(from = step.from, to = step.to, "Applied schema migration");
                report.applied.push((step.from, step.to));
                version = step.to;
            }
            None => {
                tracing::warn!(
                    version,
                    "No migration step for this version, relying on field defaults"
                );
                version = CURRENT_SCHEMA_VERSION;
            }
        }
    }

    map.insert("schemaVersion".to_string(), Value::from(CURRENT_SCHEMA_VERSION));
    (normalize::document(map, now), report)
}

/// Steps still to run for a document stored at `version`
pub fn pending_steps(version: u32) -> impl Iterator<Item = &'static MigrationStep> {
    MIGRATIONS.iter().filter(move |step| step.from >= version)
}

/// Advisory schema version of a raw document
pub fn schema_version_of(map: &Map<String, Value>) -> u32 {
    map.get("schemaVersion")
        .and_then(normalize::integer)
        .and_then(|v| u32::try_from(v).ok())
        .map(|v| v.max(OLDEST_SCHEMA_VERSION))
        .unwrap_or(OLDEST_SCHEMA_VERSION)
}

fn upgrade_v1_to_v2(map: &mut Map<String, Value>, now: DateTime<Utc>) {
    if !map.get("meta").is_some_and(Value::is_object) {
        let stamp = Value::String(normalize::format_timestamp(now));
        let mut meta = Map::new();
        meta.insert("createdAt".to_string(), stamp.clone());
        meta.insert("updatedAt".to_string(), stamp);
        meta.insert("lastSavedAt".to_string(), Value::Null);
        meta.insert("lastSavedBy".to_string(), Value::from("local"));
        map.insert("meta".to_string(), Value::Object(meta));
    }

    let settings = normalize::ensure_object(map, "settings");
    if settings.get("rpOffsetMinutes").map_or(true, Value::is_null) {
        settings.insert("rpOffsetMinutes".to_string(), Value::from(0));
    }
    if settings.get("autosave").map_or(true, Value::is_null) {
        settings.insert("autosave".to_string(), Value::Bool(true));
    }
}
