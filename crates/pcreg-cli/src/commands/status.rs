//! Status command implementation

use crate::cli::StatusArgs;
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, StatusOutput};
use crate::session::Session;
use anyhow::Result;

pub fn execute(args: StatusArgs, session: &Session, output: &OutputWriter) -> Result<()> {
    let store = &session.store;
    let doc = store.document();
    let summary = doc.summary();
    let snapshot_count = store.list_snapshots().len();
    let rp_time = doc.settings.rp_time(store.now());

    let config_entries = args.config.then(|| {
        let mut entries: Vec<ConfigEntry> = session
            .config
            .to_inspection_map()
            .into_iter()
            .map(|(key, (value, source))| ConfigEntry { key, value, source: format!("{:?}", source) })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    });

    if output.is_json() {
        return output.result(StatusOutput {
            workspace_path: session.root.display().to_string(),
            schema_version: doc.schema_version,
            zone_name: doc.settings.zone_name.clone(),
            operator_name: doc.settings.operator_name.clone(),
            network_status: doc.settings.network_status.to_string(),
            rp_time,
            summary,
            snapshot_count,
            last_saved_at: doc.meta.last_saved_at,
            last_saved_by: doc.meta.last_saved_by.clone(),
            boot: store.boot_outcome().label().to_string(),
            config: config_entries,
        });
    }

    output.section(&doc.settings.zone_name);
    output.kv("Location", session.root.display());
    output.kv("Operator", &doc.settings.operator_name);
    output.kv("Network", doc.settings.network_status);
    output.kv("RP time", rp_time.format("%H:%M:%S"));

    output.section("Board");
    output.kv("Trains", summary.trains);
    output.kv("Open incidents", summary.open_incidents);
    output.kv("Average delay", format!("{} min", summary.average_delay_min));
    output.kv("Held trains", summary.held_trains);

    output.section("Store");
    output.kv("Schema version", doc.schema_version);
    match doc.meta.last_saved_at {
        Some(at) => output.kv(
            "Last saved",
            format!("{} ({})", at.format("%Y-%m-%d %H:%M:%S UTC"), doc.meta.last_saved_by),
        ),
        None => output.kv("Last saved", "never"),
    }
    output.kv("Autosave", if doc.settings.autosave { "on" } else { "off" });
    output.kv("Snapshots", snapshot_count);

    if let Some(entries) = config_entries {
        output.section("Configuration");
        output.table(entries)?;
        output.info("CLI arguments > Environment variables > Config file > Defaults");
    }

    Ok(())
}
