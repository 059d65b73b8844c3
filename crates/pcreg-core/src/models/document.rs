use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{IncidentId, LogId, TrainId};
use super::incident::Incident;
use super::journal::{LogEntry, LogType};
use super::train::{Train, TrainStatus};
use crate::error::{PcregError, Result};

/// Schema version written by this build. Every document held in memory or
/// persisted carries exactly this version.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

pub const DEFAULT_ZONE_NAME: &str = "CCR / PC Régulation";
pub const DEFAULT_OPERATOR_NAME: &str = "Régulateur";
pub const DEFAULT_SAVED_BY: &str = "local";

/// Bound on the regulation time offset, one week either way
pub const MAX_RP_OFFSET_MINUTES: i64 = 7 * 24 * 60;

/// Overall state of the network as declared by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NetworkStatus {
    #[default]
    #[serde(rename = "normal", alias = "Normal")]
    Normal,
    #[serde(rename = "disrupted", alias = "Perturbé")]
    Disrupted,
    #[serde(rename = "major-incident", alias = "Incident majeur")]
    MajorIncident,
}

impl NetworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkStatus::Normal => "normal",
            NetworkStatus::Disrupted => "disrupted",
            NetworkStatus::MajorIncident => "major-incident",
        }
    }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkStatus {
    type Err = PcregError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(NetworkStatus::Normal),
            "disrupted" | "perturbé" => Ok(NetworkStatus::Disrupted),
            "major-incident" | "incident majeur" => Ok(NetworkStatus::MajorIncident),
            _ => Err(PcregError::InvalidValue {
                field: "networkStatus".to_string(),
                reason: format!(
                    "Invalid network status: {}. Use normal, disrupted, or major-incident",
                    s
                ),
            }),
        }
    }
}

/// Save provenance and timestamps of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Time of the last successful persisted write
    pub last_saved_at: Option<DateTime<Utc>>,

    /// Provenance tag of the last successful persisted write
    pub last_saved_by: String,
}

impl DocumentMeta {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            last_saved_at: None,
            last_saved_by: DEFAULT_SAVED_BY.to_string(),
        }
    }

    /// Record a persisted write
    pub fn mark_saved(&mut self, now: DateTime<Utc>, source: &str) {
        self.updated_at = now;
        self.last_saved_at = Some(now);
        self.last_saved_by = source.to_string();
    }
}

/// Operator-configurable settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub network_status: NetworkStatus,

    pub zone_name: String,

    pub operator_name: String,

    /// Regulation time offset: RP time = wall time + offset
    pub rp_offset_minutes: i64,

    /// Whether mutations schedule a debounced write
    pub autosave: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network_status: NetworkStatus::Normal,
            zone_name: DEFAULT_ZONE_NAME.to_string(),
            operator_name: DEFAULT_OPERATOR_NAME.to_string(),
            rp_offset_minutes: 0,
            autosave: true,
        }
    }
}

impl Settings {
    /// Regulation time for the given wall time. An offset that cannot be
    /// applied leaves the wall time as is.
    pub fn rp_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_minutes(self.rp_offset_minutes)
            .and_then(|offset| now.checked_add_signed(offset))
            .unwrap_or(now)
    }
}

pub fn clamp_rp_offset(minutes: i64) -> i64 {
    minutes.clamp(-MAX_RP_OFFSET_MINUTES, MAX_RP_OFFSET_MINUTES)
}

/// The single persisted root of the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub schema_version: u32,

    pub meta: DocumentMeta,

    pub settings: Settings,

    pub trains: Vec<Train>,

    pub incidents: Vec<Incident>,

    pub logs: Vec<LogEntry>,
}

impl Document {
    /// Fresh document as created on first boot or reset: one seeded train
    /// and the shift-start journal entry.
    pub fn new_default(now: DateTime<Utc>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            meta: DocumentMeta::new(now),
            settings: Settings::default(),
            trains: vec![Train {
                id: TrainId::generate(),
                number: "SD92".to_string(),
                mission: "TER".to_string(),
                line: "L1".to_string(),
                od: "STRASBOURG → SAVERNE".to_string(),
                position: "Strasbourg (départ)".to_string(),
                delay_min: 0,
                priority: 2,
                status: TrainStatus::InService,
                decision: String::new(),
                regulator: "PC".to_string(),
                updated_at: now,
            }],
            incidents: Vec::new(),
            logs: vec![LogEntry {
                id: LogId::generate(),
                at: now,
                entry_type: LogType::Information,
                text: "Shift taken over at PC Regulation (RP).".to_string(),
                train_id: None,
                incident_id: None,
                author: "PC".to_string(),
            }],
        }
    }

    pub fn find_train(&self, id: &TrainId) -> Option<&Train> {
        self.trains.iter().find(|t| &t.id == id)
    }

    pub fn find_train_mut(&mut self, id: &TrainId) -> Option<&mut Train> {
        self.trains.iter_mut().find(|t| &t.id == id)
    }

    pub fn find_incident(&self, id: &IncidentId) -> Option<&Incident> {
        self.incidents.iter().find(|i| &i.id == id)
    }

    pub fn find_incident_mut(&mut self, id: &IncidentId) -> Option<&mut Incident> {
        self.incidents.iter_mut().find(|i| &i.id == id)
    }

    pub fn find_log(&self, id: &LogId) -> Option<&LogEntry> {
        self.logs.iter().find(|l| &l.id == id)
    }

    /// Train referenced by a journal entry, if it still exists
    pub fn train_of(&self, entry: &LogEntry) -> Option<&Train> {
        entry.train_id.as_ref().and_then(|id| self.find_train(id))
    }

    /// Incident referenced by a journal entry, if it still exists
    pub fn incident_of(&self, entry: &LogEntry) -> Option<&Incident> {
        entry.incident_id.as_ref().and_then(|id| self.find_incident(id))
    }
}
