//! Workspace discovery and configuration loading for CLI commands

use crate::cli::Cli;
use crate::errors;
use anyhow::{Context, Result};
use pcreg_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Name of the per-workspace directory
pub const WORKSPACE_DIR: &str = ".pcreg";

pub fn config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(WORKSPACE_DIR).join("config.toml")
}

/// Directory holding the key/value store files
pub fn store_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(WORKSPACE_DIR).join("store")
}

/// Load layered configuration for a workspace
pub fn load_workspace_config(workspace_root: &Path) -> Result<LayeredConfig> {
    let config = LayeredConfig::with_defaults()
        .load_optional_file(config_path(workspace_root))
        .context("Failed to load configuration file")?
        .load_from_env();
    Ok(config)
}

/// Load layered configuration with the global CLI flags applied on top
pub fn load_workspace_config_with_overrides(workspace_root: &Path, cli: &Cli) -> Result<LayeredConfig> {
    let mut config = load_workspace_config(workspace_root)?;
    config.update_from_cli(CliConfigOverrides {
        autosave_delay_ms: cli.autosave_delay_ms,
        export_dir: None,
        log_author: cli.author.clone(),
    });
    Ok(config)
}

/// Resolve the workspace root from `--workspace` or by walking up from the current directory
pub fn find_workspace_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        if root.join(WORKSPACE_DIR).is_dir() {
            return Ok(root.to_path_buf());
        }
        return Err(errors::workspace_not_found().into());
    }

    let mut current = std::env::current_dir()?;
    loop {
        if current.join(WORKSPACE_DIR).is_dir() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(errors::workspace_not_found().into());
        }
    }
}
