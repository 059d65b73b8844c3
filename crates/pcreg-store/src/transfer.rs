//! JSON import and export of the whole document.

use pcreg_core::codec;
use pcreg_core::error::{PcregError, Result};
use pcreg_core::migration;

use crate::state::{SaveSource, StateStore};

impl StateStore {
    /// Pretty-printed JSON of the live document. Has no side effects.
    pub fn export_document(&self) -> Result<String> {
        codec::export_document(&self.document)
    }

    /// Suggested file name for an export taken now
    pub fn export_file_name(&self) -> String {
        codec::export_file_name(self.now())
    }

    /// Replace the live document with an imported one.
    ///
    /// Text that is not JSON is rejected with `InvalidImport` and nothing
    /// changes. Anything that parses goes through the migration engine, so
    /// documents from older schemas are upgraded on the way in.
    pub fn import_document(&mut self, blob: &str) -> Result<()> {
        let raw = codec::decode_raw(blob).map_err(|e| PcregError::InvalidImport {
            reason: e.to_string(),
        })?;

        let (document, report) = migration::normalize_with_report(Some(raw), self.now());
        self.replace_document(document, SaveSource::Import)?;
        tracing::info!(
            from_version = ?report.from_version,
            upgraded = report.upgraded(),
            "Document imported"
        );
        Ok(())
    }
}
