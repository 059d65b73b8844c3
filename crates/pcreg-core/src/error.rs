//! Error types for the PC Regulation tracker

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PcregError {
    // Document errors
    #[error("Train not found: {id}")]
    TrainNotFound { id: String },

    #[error("Incident not found: {id}")]
    IncidentNotFound { id: String },

    #[error("Log entry not found: {id}")]
    LogEntryNotFound { id: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    // Snapshot errors
    #[error("Snapshot not found: {id}")]
    SnapshotNotFound { id: String },

    // Import errors
    #[error("Invalid import format: {reason}")]
    InvalidImport { reason: String },

    // Substrate errors
    #[error("Storage error on key {key}: {reason}")]
    Storage { key: String, reason: String },

    #[error("Storage quota exceeded writing {key}: {needed} bytes needed, {limit} bytes available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PcregError {
    fn from(err: serde_json::Error) -> Self {
        PcregError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PcregError>;
