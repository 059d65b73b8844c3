//! Named snapshots of the document.
//!
//! The list lives under its own substrate key, newest first, capped at
//! [`SNAPSHOT_LIMIT`]. A list that does not decode is treated as empty and
//! never affects the live document; a failed read blocks writes to the list.

use pcreg_core::codec;
use pcreg_core::error::{PcregError, Result};
use pcreg_core::migration;
use pcreg_core::models::{Snapshot, SnapshotId, SNAPSHOT_LIMIT};
use pcreg_core::ports::SNAPSHOTS_KEY;

use crate::state::{SaveSource, StateStore};

impl StateStore {
    /// Snapshots, newest first. A list that cannot be read shows as empty.
    pub fn list_snapshots(&self) -> Vec<Snapshot> {
        self.read_snapshots().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read snapshot list, treating it as empty");
            Vec::new()
        })
    }

    /// Capture the live document under `name`, evicting the oldest snapshots
    /// past the cap. The live document is saved as well; if that save fails
    /// the snapshot still stands and the document write is left to autosave.
    pub fn create_snapshot(&mut self, name: &str) -> Result<Snapshot> {
        let now = self.now();
        let name = match name.trim() {
            "" => format!("Snapshot {}", now.format("%Y-%m-%d %H:%M:%S")),
            trimmed => trimmed.to_string(),
        };
        let snapshot = Snapshot::capture(&self.document, &name, now)?;

        let mut snapshots = self.read_snapshots()?;
        snapshots.insert(0, snapshot.clone());
        if snapshots.len() > SNAPSHOT_LIMIT {
            let evicted = snapshots.len() - SNAPSHOT_LIMIT;
            snapshots.truncate(SNAPSHOT_LIMIT);
            tracing::info!(evicted, "Oldest snapshots evicted");
        }
        self.write_snapshots(&snapshots)?;
        tracing::info!(id = %snapshot.id, name = %snapshot.name, "Snapshot created");

        if let Err(e) = self.save(SaveSource::SnapshotCreate) {
            tracing::error!(id = %snapshot.id, error = %e, "Snapshot stored but the document save failed");
            self.request_save();
        }
        Ok(snapshot)
    }

    /// Replace the live document with the snapshot's copy, upgraded to the
    /// current schema. The snapshot list is not touched.
    pub fn restore_snapshot(&mut self, id: &SnapshotId) -> Result<()> {
        let snapshot = self
            .read_snapshots()?
            .into_iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| PcregError::SnapshotNotFound { id: id.to_string() })?;

        let document = migration::normalize(Some(snapshot.state), self.now());
        self.replace_document(document, SaveSource::SnapshotRestore)?;
        tracing::info!(id = %id, name = %snapshot.name, "Snapshot restored");
        Ok(())
    }

    /// Remove a snapshot. Returns false if no snapshot had that id.
    pub fn delete_snapshot(&mut self, id: &SnapshotId) -> Result<bool> {
        let mut snapshots = self.read_snapshots()?;
        let before = snapshots.len();
        snapshots.retain(|s| &s.id != id);
        if snapshots.len() == before {
            tracing::debug!(id = %id, "No snapshot to delete");
            return Ok(false);
        }
        self.write_snapshots(&snapshots)?;
        tracing::info!(id = %id, "Snapshot deleted");
        Ok(true)
    }

    /// Stored list. Text that does not decode counts as an empty list; a
    /// substrate read error is returned so the stored list is never replaced
    /// on the strength of a failed read.
    fn read_snapshots(&self) -> Result<Vec<Snapshot>> {
        match self.substrate.get(SNAPSHOTS_KEY)? {
            Some(text) => Ok(codec::decode_snapshots(&text).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Snapshot list is unreadable, treating it as empty");
                Vec::new()
            })),
            None => Ok(Vec::new()),
        }
    }

    fn write_snapshots(&self, snapshots: &[Snapshot]) -> Result<()> {
        let text = codec::encode_snapshots(snapshots)?;
        self.substrate.set(SNAPSHOTS_KEY, &text)
    }
}
