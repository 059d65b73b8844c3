//! Journal commands

use crate::cli::LogCommand;
use crate::output::OutputWriter;
use crate::output_types::LogRow;
use crate::session::Session;
use anyhow::Result;
use pcreg_core::editing::{LogFilter, NewLogEntry};
use pcreg_core::models::{IncidentId, LogId, TrainId};
use pcreg_core::PcregError;

pub fn execute(command: LogCommand, session: &mut Session, output: &OutputWriter) -> Result<()> {
    match command {
        LogCommand::Add { text, entry_type, train, incident } => {
            if text.trim().is_empty() {
                return Err(PcregError::MissingField { field: "text".to_string() }.into());
            }
            let new = NewLogEntry {
                entry_type,
                text,
                train_id: train.map(TrainId::from),
                incident_id: incident.map(IncidentId::from),
                author: session.config.log_author.value.clone(),
            };
            let row = session.store.mutate(|doc, now| {
                let entry = doc.add_log(new, now).clone();
                LogRow::new(&entry, doc.train_of(&entry))
            });
            session.commit()?;

            if output.is_json() {
                output.result(row)?;
            } else {
                output.success(format!("Journal entry {} added by {}", row.id, row.author));
            }
        }

        LogCommand::List { query, entry_type, incident, limit } => {
            let filter = LogFilter { query, entry_type, incident_id: incident.map(IncidentId::from) };
            let doc = session.store.document();
            let rows: Vec<LogRow> = doc
                .search_logs(&filter)
                .into_iter()
                .take(limit.unwrap_or(usize::MAX))
                .map(|entry| LogRow::new(entry, doc.train_of(entry)))
                .collect();
            output.table(rows)?;
        }

        LogCommand::Remove { id } => {
            let id = LogId::from(id);
            session.store.try_mutate(|doc, _| doc.remove_log(&id))?;
            session.commit()?;
            output.success(format!("Journal entry {} removed", id));
        }
    }

    Ok(())
}
