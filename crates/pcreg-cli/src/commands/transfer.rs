//! Export and import commands

use crate::cli::{ExportArgs, ImportArgs};
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::{ExportOutput, ImportOutput};
use crate::session::Session;
use anyhow::{Context, Result};
use pcreg_core::PcregError;
use std::fs;

pub fn export(args: ExportArgs, session: &Session, output: &OutputWriter) -> Result<()> {
    let text = session.store.export_document()?;

    if args.stdout {
        output.raw(&text);
        return Ok(());
    }

    let dir = args.output.unwrap_or_else(|| session.config.export_dir.value.clone());
    let dir = if dir.is_relative() { session.root.join(dir) } else { dir };
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(session.store.export_file_name());
    fs::write(&path, &text).with_context(|| format!("Failed to write {}", path.display()))?;

    if output.is_json() {
        output.result(ExportOutput { path: path.display().to_string(), bytes: text.len() })?;
    } else {
        output.success(format!("Exported board to {}", path.display()));
    }
    Ok(())
}

pub fn import(args: ImportArgs, session: &mut Session, output: &OutputWriter) -> Result<()> {
    let blob = fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    match session.store.import_document(&blob) {
        Ok(()) => {}
        Err(PcregError::InvalidImport { reason }) => {
            return Err(errors::invalid_import(&args.path, &reason).into());
        }
        Err(e) => return Err(e).context("Failed to save the imported board"),
    }

    let doc = session.store.document();
    if output.is_json() {
        output.result(ImportOutput {
            path: args.path.display().to_string(),
            trains: doc.trains.len(),
            incidents: doc.incidents.len(),
            logs: doc.logs.len(),
        })?;
    } else {
        output.success(format!(
            "Imported {} trains, {} incidents and {} journal entries from {}",
            doc.trains.len(),
            doc.incidents.len(),
            doc.logs.len(),
            args.path.display()
        ));
    }
    Ok(())
}
