//! Train commands

use crate::cli::TrainCommand;
use crate::output::OutputWriter;
use crate::output_types::{DelayOutput, TrainRow};
use crate::session::Session;
use anyhow::Result;
use pcreg_core::editing::{NewTrain, TrainFilter};
use pcreg_core::models::TrainId;

pub fn execute(command: TrainCommand, session: &mut Session, output: &OutputWriter) -> Result<()> {
    match command {
        TrainCommand::Add { number, mission, od, line, position, priority, regulator } => {
            let new = NewTrain { number, mission, line, od, position, priority, regulator };
            let row = session
                .store
                .try_mutate(|doc, now| doc.add_train(new, now).map(TrainRow::from))?;
            session.commit()?;

            if output.is_json() {
                output.result(row)?;
            } else {
                output.success(format!("Train {} ({}) is on the board as {}", row.number, row.mission, row.id));
            }
        }

        TrainCommand::List { query, status, line } => {
            let filter = TrainFilter { query, status, line };
            let rows: Vec<TrainRow> =
                session.store.document().search_trains(&filter).into_iter().map(TrainRow::from).collect();
            output.table(rows)?;
        }

        TrainCommand::Delay { id, minutes, cause } => {
            let id = TrainId::from(id);
            let stored =
                session.store.try_mutate(|doc, now| doc.apply_delay(&id, minutes, cause.as_deref(), now))?;
            session.commit()?;

            let number = session.store.document().find_train(&id).map(|t| t.number.clone()).unwrap_or_default();
            if output.is_json() {
                output.result(DelayOutput {
                    train_id: id.to_string(),
                    number,
                    requested_min: minutes,
                    stored_min: stored,
                })?;
            } else {
                output.success(format!("Delay for {} set to {} min", number, stored));
                if stored != minutes {
                    output.warning(format!("Requested {} min was outside the allowed range", minutes));
                }
            }
        }

        TrainCommand::Status { id, status } => {
            let id = TrainId::from(id);
            session.store.try_mutate(|doc, now| doc.set_train_status(&id, status, now))?;
            session.commit()?;
            output.success(format!("Train {} is now {}", id, status));
        }

        TrainCommand::Edit { id, position, decision } => {
            let id = TrainId::from(id);
            if position.is_none() && decision.is_none() {
                output.warning("Nothing to change: pass --position and/or --decision");
                return Ok(());
            }
            session.store.try_mutate(|doc, now| {
                if let Some(position) = &position {
                    doc.set_train_position(&id, position, now)?;
                }
                if let Some(decision) = &decision {
                    doc.set_train_decision(&id, decision, now)?;
                }
                Ok(())
            })?;
            session.commit()?;
            output.success(format!("Train {} updated", id));
        }

        TrainCommand::Remove { id } => {
            let id = TrainId::from(id);
            let train = session.store.try_mutate(|doc, now| doc.remove_train(&id, now))?;
            session.commit()?;
            output.success(format!("Train {} removed from the board", train.number));
        }
    }

    Ok(())
}
