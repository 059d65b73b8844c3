pub mod document;
pub mod ids;
pub mod incident;
pub mod journal;
pub mod snapshot;
pub mod train;

pub use document::{
    clamp_rp_offset, Document, DocumentMeta, NetworkStatus, Settings, CURRENT_SCHEMA_VERSION,
    MAX_RP_OFFSET_MINUTES,
};
pub use ids::{IncidentId, LogId, SnapshotId, TrainId};
pub use incident::{Incident, IncidentStatus};
pub use journal::{LogEntry, LogType};
pub use snapshot::{Snapshot, SNAPSHOT_LIMIT, SNAPSHOT_NAME_MAX_CHARS};
pub use train::{Train, TrainStatus};
