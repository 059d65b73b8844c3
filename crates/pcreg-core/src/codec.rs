//! Text encoding of the document and the snapshot list.
//!
//! Both are JSON. The document is stored compact and exported pretty-printed;
//! the snapshot list is wrapped in an envelope carrying the schema version.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{PcregError, Result};
use crate::models::{Document, Snapshot, CURRENT_SCHEMA_VERSION};

/// File name prefix for exported documents
pub const EXPORT_FILE_PREFIX: &str = "pcreg";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotListRecord<'a> {
    schema_version: u32,
    snapshots: &'a [Snapshot],
}

/// Encode the document for the storage substrate
pub fn encode_document(document: &Document) -> Result<String> {
    Ok(serde_json::to_string(document)?)
}

/// Encode the document in the portable, human-diffable export format
pub fn export_document(document: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Parse stored or imported text into an untyped value for the migration engine
pub fn decode_raw(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| PcregError::Serialization(e.to_string()))
}

/// Encode the snapshot list with its schema envelope
pub fn encode_snapshots(snapshots: &[Snapshot]) -> Result<String> {
    let record = SnapshotListRecord { schema_version: CURRENT_SCHEMA_VERSION, snapshots };
    Ok(serde_json::to_string(&record)?)
}

/// Decode a stored snapshot list.
///
/// Accepts the enveloped form as well as a bare array. Entries that do not
/// look like a snapshot are skipped; text that is not JSON at all is an error
/// the caller decides how to handle.
pub fn decode_snapshots(text: &str) -> Result<Vec<Snapshot>> {
    let raw = decode_raw(text)?;
    let entries = match raw {
        Value::Array(entries) => entries,
        Value::Object(mut envelope) => match envelope.remove("snapshots") {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => {
            return Err(PcregError::Serialization(
                "snapshot list is neither an array nor an object".to_string(),
            ))
        }
    };

    let mut snapshots = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Snapshot>(entry) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => tracing::warn!(position, error = %e, "Skipping unreadable snapshot entry"),
        }
    }
    Ok(snapshots)
}

/// Timestamped file name for an export, safe on every filesystem
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("{}_{}.json", EXPORT_FILE_PREFIX, now.format("%Y-%m-%dT%H-%M-%S"))
}
