use crate::error::Result;

/// Substrate key holding the live document
pub const DOCUMENT_KEY: &str = "PCREG_STATE_V2";

/// Substrate key holding the snapshot list, kept apart from the document so
/// that a damaged list can never take the live document down with it
pub const SNAPSHOTS_KEY: &str = "PCREG_SNAPSHOTS_V2";

/// Port for durable string-valued key/value storage.
///
/// Calls are synchronous and there is no transaction spanning several keys:
/// the last write to a key wins.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if nothing is stored
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Drop the value stored under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
