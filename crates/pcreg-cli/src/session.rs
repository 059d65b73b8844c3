use crate::cli::Cli;
use crate::config_loader::{find_workspace_root, load_workspace_config_with_overrides, store_path};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use pcreg_core::clock::SystemClock;
use pcreg_core::config::LayeredConfig;
use pcreg_store::{BootOutcome, FileKvStore, SaveSource, StateStore, StoreOptions};
use std::path::PathBuf;
use std::sync::Arc;

/// An open workspace: its configuration and the booted state store
pub struct Session {
    pub root: PathBuf,
    pub config: LayeredConfig,
    pub store: StateStore,
}

impl Session {
    /// Find the workspace, load its configuration and boot the store
    pub fn open(cli: &Cli, output: &OutputWriter) -> Result<Self> {
        let root = find_workspace_root(cli.workspace.as_deref())?;
        Self::open_at(root, cli, output)
    }

    pub fn open_at(root: PathBuf, cli: &Cli, output: &OutputWriter) -> Result<Self> {
        let config = load_workspace_config_with_overrides(&root, cli)?;
        let substrate = Arc::new(FileKvStore::new(store_path(&root)));
        let store = StateStore::boot(substrate, Arc::new(SystemClock), StoreOptions::from(&config));

        match store.boot_outcome() {
            BootOutcome::Recovered => {
                output.warning("Stored board was unreadable and has been replaced with a fresh one")
            }
            BootOutcome::Unreadable => output.warning(
                "Could not read the store; working on a fresh board that will not overwrite it unless saved",
            ),
            _ => {}
        }

        Ok(Self { root, config, store })
    }

    /// Persist the changes of a one-shot command.
    ///
    /// A pending autosave is written straight away. With autosave turned
    /// off nothing is pending, so the command's edit is saved as a manual
    /// save instead of being dropped when the process exits.
    pub fn commit(&mut self) -> Result<()> {
        if self.store.flush().context("Failed to save the board")? {
            return Ok(());
        }
        if !self.store.document().settings.autosave {
            self.store.save(SaveSource::Manual).context("Failed to save the board")?;
        }
        Ok(())
    }
}
