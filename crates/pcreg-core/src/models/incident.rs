use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{IncidentId, TrainId};
use crate::error::{PcregError, Result};

/// Handling status of an incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IncidentStatus {
    #[default]
    #[serde(rename = "open", alias = "Ouvert")]
    Open,
    #[serde(rename = "in-progress", alias = "En cours")]
    InProgress,
    #[serde(rename = "closed", alias = "Clos")]
    Closed,
}

impl IncidentStatus {
    /// Next status in the open -> in-progress -> closed -> open cycle
    pub fn next(self) -> Self {
        match self {
            IncidentStatus::Open => IncidentStatus::InProgress,
            IncidentStatus::InProgress => IncidentStatus::Closed,
            IncidentStatus::Closed => IncidentStatus::Open,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::InProgress => "in-progress",
            IncidentStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = PcregError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" | "ouvert" => Ok(IncidentStatus::Open),
            "in-progress" | "en cours" => Ok(IncidentStatus::InProgress),
            "closed" | "clos" => Ok(IncidentStatus::Closed),
            _ => Err(PcregError::InvalidValue {
                field: "status".to_string(),
                reason: format!("Invalid incident status: {}. Use open, in-progress, or closed", s),
            }),
        }
    }
}

/// An incident declared on the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: IncidentId,

    pub created_at: DateTime<Utc>,

    pub status: IncidentStatus,

    /// Incident category (equipment failure, signalling, ...)
    pub kind: String,

    pub location: String,

    pub severity: String,

    pub description: String,

    /// Train involved, if any. Weak reference: the train may since have been removed.
    #[serde(default)]
    pub train_id: Option<TrainId>,

    /// Operator handling the incident
    pub assigned_to: String,
}
