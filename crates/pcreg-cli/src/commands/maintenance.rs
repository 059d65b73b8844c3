//! Save, reset and migration commands

use crate::cli::ResetArgs;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::{MigrationRow, MigrationsOutput};
use crate::session::Session;
use anyhow::{Context, Result};
use pcreg_core::migration::MIGRATIONS;
use pcreg_core::models::CURRENT_SCHEMA_VERSION;
use pcreg_store::BootOutcome;

pub fn save(session: &mut Session, output: &OutputWriter) -> Result<()> {
    session.store.save_manual().context("Failed to save the board")?;
    output.success("Board saved");
    Ok(())
}

pub fn reset(args: ResetArgs, session: &mut Session, output: &OutputWriter) -> Result<()> {
    if !args.yes {
        return Err(errors::reset_not_confirmed().into());
    }

    session.store.reset().context("Failed to reset the board")?;
    output.success("Board reset to defaults; snapshots were kept");
    Ok(())
}

pub fn migrations(session: &Session, output: &OutputWriter) -> Result<()> {
    let stored_version = match session.store.boot_outcome() {
        BootOutcome::Loaded { from_version, .. } => Some(from_version),
        _ => None,
    };

    let steps: Vec<MigrationRow> = MIGRATIONS
        .iter()
        .map(|step| MigrationRow {
            from: step.from,
            to: step.to,
            description: step.description.to_string(),
            applied: stored_version.map_or(false, |v| step.from >= v && step.to <= CURRENT_SCHEMA_VERSION),
        })
        .collect();

    if output.is_json() {
        return output.result(MigrationsOutput { current_version: CURRENT_SCHEMA_VERSION, stored_version, steps });
    }

    output.section("Schema");
    output.kv("Current version", CURRENT_SCHEMA_VERSION);
    match stored_version {
        Some(v) if v < CURRENT_SCHEMA_VERSION => {
            output.kv("Stored version", format!("{} (upgraded in memory, written on next save)", v))
        }
        Some(v) => output.kv("Stored version", v),
        None => output.kv("Stored version", "-"),
    }

    output.section("Migrations");
    output.table(steps)
}
