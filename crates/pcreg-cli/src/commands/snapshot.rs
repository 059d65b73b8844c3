//! Snapshot commands

use crate::cli::SnapshotCommand;
use crate::output::OutputWriter;
use crate::output_types::SnapshotRow;
use crate::session::Session;
use anyhow::Result;
use pcreg_core::models::{SnapshotId, SNAPSHOT_LIMIT};

pub fn execute(command: SnapshotCommand, session: &mut Session, output: &OutputWriter) -> Result<()> {
    let store = &mut session.store;
    match command {
        SnapshotCommand::Create { name } => {
            let count_before = store.list_snapshots().len();
            let snapshot = store.create_snapshot(name.as_deref().unwrap_or(""))?;
            let row = SnapshotRow::from(&snapshot);

            if output.is_json() {
                output.result(row)?;
            } else {
                output.success(format!("Snapshot '{}' created ({})", row.name, row.id));
                if count_before >= SNAPSHOT_LIMIT {
                    output.info(format!("Only the {} most recent snapshots are kept", SNAPSHOT_LIMIT));
                }
            }
        }

        SnapshotCommand::List => {
            let rows: Vec<SnapshotRow> = store.list_snapshots().iter().map(SnapshotRow::from).collect();
            output.table(rows)?;
        }

        SnapshotCommand::Restore { id } => {
            let id = SnapshotId::from(id);
            store.restore_snapshot(&id)?;
            output.success(format!("Board restored from snapshot {}", id));
        }

        SnapshotCommand::Delete { id } => {
            let id = SnapshotId::from(id);
            if store.delete_snapshot(&id)? {
                output.success(format!("Snapshot {} deleted", id));
            } else {
                output.info(format!("No snapshot with id {}; nothing deleted", id));
            }
        }
    }

    Ok(())
}
