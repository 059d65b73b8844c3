//! Settings commands

use crate::cli::SettingsCommand;
use crate::output::OutputWriter;
use crate::session::Session;
use anyhow::{Context, Result};
use pcreg_core::editing::SettingsUpdate;

pub fn execute(command: SettingsCommand, session: &mut Session, output: &OutputWriter) -> Result<()> {
    match command {
        SettingsCommand::Show => show(session, output),

        SettingsCommand::Set { zone, operator, network_status, rp_offset, autosave } => {
            let update = SettingsUpdate {
                zone_name: zone,
                operator_name: operator,
                network_status,
                rp_offset_minutes: rp_offset,
                autosave,
            };
            if update.zone_name.is_none()
                && update.operator_name.is_none()
                && update.network_status.is_none()
                && update.rp_offset_minutes.is_none()
                && update.autosave.is_none()
            {
                output.warning("Nothing to change; see 'pcreg settings set --help'");
                return Ok(());
            }

            session.store.update_settings(update).context("Failed to save settings")?;
            if !output.is_json() {
                output.success("Settings saved");
            }
            show(session, output)
        }
    }
}

fn show(session: &Session, output: &OutputWriter) -> Result<()> {
    let settings = &session.store.document().settings;
    if output.is_json() {
        return output.result(settings);
    }

    output.section("Settings");
    output.kv("Zone", &settings.zone_name);
    output.kv("Operator", &settings.operator_name);
    output.kv("Network status", settings.network_status);
    output.kv("RP offset", format!("{} min", settings.rp_offset_minutes));
    output.kv("RP time", settings.rp_time(session.store.now()).format("%H:%M:%S"));
    output.kv("Autosave", if settings.autosave { "on" } else { "off" });
    Ok(())
}
