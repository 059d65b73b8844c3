use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::Document;
use super::ids::SnapshotId;
use crate::error::Result;

/// Maximum number of snapshots kept; creating one more evicts the oldest
pub const SNAPSHOT_LIMIT: usize = 20;

/// Snapshot names are cut to this many characters
pub const SNAPSHOT_NAME_MAX_CHARS: usize = 60;

/// A named, independent copy of the document at a point in time.
///
/// The copy is kept as raw JSON rather than a typed [`Document`] so a
/// snapshot written by an older build still loads and can be upgraded by the
/// migration engine when it is restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: SnapshotId,

    pub name: String,

    pub created_at: DateTime<Utc>,

    pub state: serde_json::Value,
}

impl Snapshot {
    /// Deep-copy `document` into a new snapshot
    pub fn capture(document: &Document, name: &str, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: SnapshotId::generate(),
            name: truncate_name(name),
            created_at: now,
            state: serde_json::to_value(document)?,
        })
    }
}

/// Cut a snapshot name to [`SNAPSHOT_NAME_MAX_CHARS`] characters
pub fn truncate_name(name: &str) -> String {
    name.chars().take(SNAPSHOT_NAME_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name_counts_characters() {
        let long = "é".repeat(80);
        let truncated = truncate_name(&long);
        assert_eq!(truncated.chars().count(), SNAPSHOT_NAME_MAX_CHARS);
        assert_eq!(truncate_name("Start of shift 07:00"), "Start of shift 07:00");
    }

    #[test]
    fn test_capture_is_independent_of_live_document() {
        let mut doc = Document::new_default(Utc::now());
        let snapshot = Snapshot::capture(&doc, "before", Utc::now()).unwrap();

        doc.trains[0].number = "CHANGED".to_string();
        doc.trains.clear();

        assert_eq!(snapshot.state["trains"][0]["number"], "SD92");
        assert_eq!(snapshot.name, "before");
    }
}
