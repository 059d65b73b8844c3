//! Init command implementation

use crate::cli::{Cli, InitArgs};
use crate::config_loader::{config_path, store_path, WORKSPACE_DIR};
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::InitOutput;
use crate::session::Session;
use anyhow::{Context, Result};
use pcreg_core::config::DEFAULT_AUTOSAVE_DELAY_MS;
use std::fs;

pub fn execute(args: &InitArgs, cli: &Cli, output: &OutputWriter) -> Result<()> {
    let workspace_dir = args.path.join(WORKSPACE_DIR);
    if workspace_dir.exists() && !args.force {
        return Err(errors::workspace_exists(&args.path).into());
    }

    fs::create_dir_all(&workspace_dir).context("Failed to create .pcreg directory")?;

    let config_toml = format!(
        r#"# pcreg workspace configuration
#
# Values here are overridden by PCREG_* environment variables,
# which are overridden by command-line flags.

# Autosave debounce window in milliseconds (PCREG_AUTOSAVE_DELAY_MS)
autosave_delay_ms = {}

# Directory where `pcreg export` writes files (PCREG_EXPORT_DIR)
export_dir = "."

# Author for journal entries added with `pcreg log add` (PCREG_AUTHOR)
# Defaults to the operator name from the board settings.
# log_author = "Night shift"
"#,
        DEFAULT_AUTOSAVE_DELAY_MS
    );
    let config_file = config_path(&args.path);
    fs::write(&config_file, config_toml).context("Failed to write config.toml")?;

    // Booting an empty store seeds and saves the default board
    let session = Session::open_at(args.path.clone(), cli, output)?;
    let boot = session.store.boot_outcome().label().to_string();

    if output.is_json() {
        output.result(InitOutput {
            workspace_path: args.path.display().to_string(),
            config_path: config_file.display().to_string(),
            store_path: store_path(&args.path).display().to_string(),
            boot,
        })?;
    } else {
        output.success(format!("Initialized pcreg workspace at {}", args.path.display()));

        output.section("Workspace");
        output.kv("Config", config_file.display());
        output.kv("Store", store_path(&args.path).display());
        output.kv("Board", boot);
        output.kv("Zone", &session.store.document().settings.zone_name);
    }

    Ok(())
}
