//! The state store: owner of the single live document.
//!
//! Boot reads the substrate and never fails; every later write goes through
//! [`StateStore::save`], which stamps the save metadata into the document
//! before encoding it.

use chrono::{DateTime, Duration, Utc};
use pcreg_core::clock::Clock;
use pcreg_core::codec;
use pcreg_core::config::{LayeredConfig, MAX_AUTOSAVE_DELAY_MS};
use pcreg_core::editing::SettingsUpdate;
use pcreg_core::error::Result;
use pcreg_core::migration;
use pcreg_core::models::Document;
use pcreg_core::ports::{KeyValueStore, DOCUMENT_KEY};
use std::fmt;
use std::sync::Arc;

use crate::autosave::AutosaveScheduler;

/// Provenance tag recorded in `meta.lastSavedBy`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveSource {
    Init,
    Recover,
    Autosave,
    Manual,
    Import,
    Reset,
    SnapshotRestore,
    SnapshotCreate,
    Settings,
    Custom(String),
}

impl SaveSource {
    pub fn as_str(&self) -> &str {
        match self {
            SaveSource::Init => "init",
            SaveSource::Recover => "recover",
            SaveSource::Autosave => "autosave",
            SaveSource::Manual => "manual",
            SaveSource::Import => "import",
            SaveSource::Reset => "reset",
            SaveSource::SnapshotRestore => "snapshot:restore",
            SaveSource::SnapshotCreate => "snapshot:create",
            SaveSource::Settings => "settings",
            SaveSource::Custom(tag) => tag,
        }
    }
}

impl fmt::Display for SaveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the document was obtained at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    /// A stored document was read and migrated from `from_version`
    Loaded { from_version: u32, upgraded: bool },
    /// Nothing was stored; a default document was created and saved
    Initialized,
    /// The stored value could not be decoded; a default document replaced it
    Recovered,
    /// The substrate could not be read; a default document is held in memory
    /// only, and stored data is left alone
    Unreadable,
}

impl BootOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            BootOutcome::Loaded { upgraded: true, .. } => "loaded (upgraded)",
            BootOutcome::Loaded { .. } => "loaded",
            BootOutcome::Initialized => "initialized",
            BootOutcome::Recovered => "recovered",
            BootOutcome::Unreadable => "unreadable",
        }
    }
}

/// Tunables for the state store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub autosave_delay: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { autosave_delay: AutosaveScheduler::default().delay() }
    }
}

impl From<&LayeredConfig> for StoreOptions {
    fn from(config: &LayeredConfig) -> Self {
        let millis = config.autosave_delay_ms.value.min(MAX_AUTOSAVE_DELAY_MS);
        let millis = i64::try_from(millis).unwrap_or(0);
        Self { autosave_delay: Duration::milliseconds(millis) }
    }
}

/// Owner of the live document and its persistence
pub struct StateStore {
    pub(crate) substrate: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    pub(crate) document: Document,
    autosave: AutosaveScheduler,
    outcome: BootOutcome,
}

impl StateStore {
    /// Load the document from the substrate, creating or recovering it as needed
    pub fn boot(
        substrate: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        options: StoreOptions,
    ) -> Self {
        let now = clock.now();
        let (document, outcome) = match substrate.get(DOCUMENT_KEY) {
            Ok(None) => (Document::new_default(now), BootOutcome::Initialized),
            Ok(Some(text)) => match codec::decode_raw(&text) {
                Ok(raw) => {
                    let (document, report) = migration::normalize_with_report(Some(raw), now);
                    match report.from_version {
                        Some(from_version) => (
                            document,
                            BootOutcome::Loaded { from_version, upgraded: report.upgraded() },
                        ),
                        None => {
                            tracing::warn!("Stored document is not an object, recovering");
                            (document, BootOutcome::Recovered)
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Stored document is corrupt, recovering");
                    (Document::new_default(now), BootOutcome::Recovered)
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stored document, working in memory");
                (Document::new_default(now), BootOutcome::Unreadable)
            }
        };

        let mut store = Self {
            substrate,
            clock,
            document,
            autosave: AutosaveScheduler::new(options.autosave_delay),
            outcome,
        };

        let source = match outcome {
            BootOutcome::Initialized => Some(SaveSource::Init),
            BootOutcome::Recovered => Some(SaveSource::Recover),
            _ => None,
        };
        if let Some(source) = source {
            if let Err(e) = store.save(source) {
                tracing::error!(error = %e, "Failed to persist document at boot");
            }
        }

        tracing::info!(outcome = outcome.label(), "State store booted");
        store
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn boot_outcome(&self) -> BootOutcome {
        self.outcome
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Apply an edit and schedule an autosave
    pub fn mutate<T>(&mut self, edit: impl FnOnce(&mut Document, DateTime<Utc>) -> T) -> T {
        let now = self.clock.now();
        let result = edit(&mut self.document, now);
        self.request_save();
        result
    }

    /// Apply a fallible edit; an autosave is scheduled only if it succeeds
    pub fn try_mutate<T>(
        &mut self,
        edit: impl FnOnce(&mut Document, DateTime<Utc>) -> Result<T>,
    ) -> Result<T> {
        let now = self.clock.now();
        let result = edit(&mut self.document, now)?;
        self.request_save();
        Ok(result)
    }

    /// Persist the document now, tagged with `source`.
    ///
    /// On failure the document's save metadata is left as it was and the
    /// pending autosave, if any, stays pending.
    pub fn save(&mut self, source: SaveSource) -> Result<()> {
        let previous = self.document.meta.clone();
        self.document.meta.mark_saved(self.clock.now(), source.as_str());

        let written = codec::encode_document(&self.document)
            .and_then(|text| self.substrate.set(DOCUMENT_KEY, &text));

        match written {
            Ok(()) => {
                self.autosave.cancel();
                tracing::debug!(source = %source, "Document saved");
                Ok(())
            }
            Err(e) => {
                self.document.meta = previous;
                tracing::error!(source = %source, error = %e, "Failed to save document");
                Err(e)
            }
        }
    }

    /// Schedule a debounced autosave. Returns false when autosave is off.
    pub fn request_save(&mut self) -> bool {
        if !self.document.settings.autosave {
            tracing::debug!("Autosave disabled, save request ignored");
            return false;
        }
        let deadline = self.autosave.request(self.clock.now());
        tracing::trace!(%deadline, "Autosave scheduled");
        true
    }

    /// Run the pending autosave if its deadline has passed. Returns whether a write happened.
    pub fn poll(&mut self) -> Result<bool> {
        if !self.autosave.is_due(self.clock.now()) {
            return Ok(false);
        }
        self.save(SaveSource::Autosave)?;
        Ok(true)
    }

    /// Write a pending autosave immediately instead of waiting for its deadline
    pub fn flush(&mut self) -> Result<bool> {
        if !self.autosave.is_pending() {
            return Ok(false);
        }
        self.save(SaveSource::Autosave)?;
        Ok(true)
    }

    /// Explicit save, superseding any pending autosave
    pub fn save_manual(&mut self) -> Result<()> {
        self.autosave.cancel();
        self.save(SaveSource::Manual)
    }

    pub fn pending_autosave(&self) -> Option<DateTime<Utc>> {
        self.autosave.deadline()
    }

    /// Change settings and persist them straight away
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<()> {
        let now = self.clock.now();
        self.document.apply_settings(update, now);
        self.save(SaveSource::Settings)
    }

    /// Discard the stored document and start over. Snapshots are kept.
    pub fn reset(&mut self) -> Result<()> {
        self.substrate.remove(DOCUMENT_KEY)?;
        self.autosave.cancel();
        self.document = Document::new_default(self.clock.now());
        tracing::info!("Document reset to defaults");
        self.save(SaveSource::Reset)
    }

    /// Swap in a new document and persist it; the old one is put back if the write fails
    pub(crate) fn replace_document(&mut self, document: Document, source: SaveSource) -> Result<()> {
        let previous = std::mem::replace(&mut self.document, document);
        if let Err(e) = self.save(source) {
            self.document = previous;
            return Err(e);
        }
        Ok(())
    }
}
