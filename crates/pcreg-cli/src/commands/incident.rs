//! Incident commands

use crate::cli::IncidentCommand;
use crate::output::OutputWriter;
use crate::output_types::IncidentRow;
use crate::session::Session;
use anyhow::Result;
use pcreg_core::editing::NewIncident;
use pcreg_core::models::{IncidentId, TrainId};

pub fn execute(command: IncidentCommand, session: &mut Session, output: &OutputWriter) -> Result<()> {
    match command {
        IncidentCommand::Add { location, description, kind, severity, train } => {
            let train_id = train.map(TrainId::from);
            if let Some(id) = &train_id {
                if session.store.document().find_train(id).is_none() {
                    output.warning(format!("No train with id {} on the board; keeping the reference anyway", id));
                }
            }

            let new = NewIncident { kind, location, severity, description, train_id };
            let row = session.store.try_mutate(|doc, now| {
                let incident = doc.add_incident(new, now)?.clone();
                let train = incident.train_id.as_ref().and_then(|id| doc.find_train(id));
                Ok(IncidentRow::new(&incident, train))
            })?;
            session.commit()?;

            if output.is_json() {
                output.result(row)?;
            } else {
                output.success(format!("Incident {} declared at {}", row.id, row.location));
            }
        }

        IncidentCommand::List { status } => {
            let doc = session.store.document();
            let rows: Vec<IncidentRow> = doc
                .incidents
                .iter()
                .filter(|i| status.map_or(true, |s| i.status == s))
                .map(|i| IncidentRow::new(i, i.train_id.as_ref().and_then(|id| doc.find_train(id))))
                .collect();
            output.table(rows)?;
        }

        IncidentCommand::Advance { id } => {
            let id = IncidentId::from(id);
            let status = session.store.try_mutate(|doc, now| doc.advance_incident(&id, now))?;
            session.commit()?;

            if output.is_json() {
                output.result(serde_json::json!({ "id": id, "status": status }))?;
            } else {
                output.success(format!("Incident {} is now {}", id, status));
            }
        }

        IncidentCommand::Remove { id } => {
            let id = IncidentId::from(id);
            let incident = session.store.try_mutate(|doc, now| doc.remove_incident(&id, now))?;
            session.commit()?;
            output.success(format!("Incident {} at {} removed", incident.id, incident.location));
        }
    }

    Ok(())
}
