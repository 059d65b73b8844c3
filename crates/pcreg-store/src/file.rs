//! File-backed key/value substrate.
//!
//! Each key is one file `<root>/<key>.json`. Writes go to a temporary file
//! that is then renamed over the target, so a crash mid-write leaves either
//! the old value or the new one, never a torn file.

use pcreg_core::error::{PcregError, Result};
use pcreg_core::ports::KeyValueStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const VALUE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";

/// Directory-backed implementation of KeyValueStore
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }

    fn storage_error(key: &str, action: &str, e: std::io::Error) -> PcregError {
        PcregError::Storage { key: key.to_string(), reason: format!("Failed to {}: {}", action, e) }
    }
}

/// Keys become file names, so only a safe character set is accepted
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(PcregError::Storage {
            key: key.to_string(),
            reason: "key must be ASCII letters, digits, '_', '-' or '.'".to_string(),
        })
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::storage_error(key, "read value", e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)
            .map_err(|e| Self::storage_error(key, "create store directory", e))?;

        let temp_path = path.with_extension(TEMP_EXTENSION);
        fs::write(&temp_path, value).map_err(|e| Self::storage_error(key, "write temp file", e))?;
        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            Self::storage_error(key, "replace value", e)
        })?;

        tracing::debug!(key, bytes = value.len(), path = %path.display(), "Value written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_error(key, "remove value", e)),
        }
    }
}
