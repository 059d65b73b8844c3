use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::TrainId;
use crate::error::{PcregError, Result};

/// Earliest a train may be reported (minutes ahead of schedule)
pub const MIN_DELAY_MINUTES: i64 = -120;

/// Latest a train may be reported (minutes behind schedule)
pub const MAX_DELAY_MINUTES: i64 = 999;

/// Highest priority (most urgent)
pub const MIN_PRIORITY: u8 = 1;

/// Lowest priority
pub const MAX_PRIORITY: u8 = 3;

/// Operating status of a train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrainStatus {
    #[default]
    #[serde(rename = "in-service", alias = "En circulation")]
    InService,
    #[serde(rename = "at-platform", alias = "À quai")]
    AtPlatform,
    #[serde(rename = "held", alias = "Retenu")]
    Held,
    #[serde(rename = "cancelled", alias = "Supprimé")]
    Cancelled,
    #[serde(rename = "diverted", alias = "Détourné")]
    Diverted,
}

impl TrainStatus {
    pub const ALL: [TrainStatus; 5] = [
        TrainStatus::InService,
        TrainStatus::AtPlatform,
        TrainStatus::Held,
        TrainStatus::Cancelled,
        TrainStatus::Diverted,
    ];

    /// Canonical wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainStatus::InService => "in-service",
            TrainStatus::AtPlatform => "at-platform",
            TrainStatus::Held => "held",
            TrainStatus::Cancelled => "cancelled",
            TrainStatus::Diverted => "diverted",
        }
    }
}

impl fmt::Display for TrainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainStatus {
    type Err = PcregError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "in-service" | "en circulation" => Ok(TrainStatus::InService),
            "at-platform" | "à quai" => Ok(TrainStatus::AtPlatform),
            "held" | "retenu" => Ok(TrainStatus::Held),
            "cancelled" | "supprimé" => Ok(TrainStatus::Cancelled),
            "diverted" | "détourné" => Ok(TrainStatus::Diverted),
            _ => Err(PcregError::InvalidValue {
                field: "status".to_string(),
                reason: format!(
                    "Invalid train status: {}. Use in-service, at-platform, held, cancelled, or diverted",
                    s
                ),
            }),
        }
    }
}

/// A train followed on the regulation board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    /// Unique identifier
    pub id: TrainId,

    /// Commercial train number (e.g. "SD92")
    pub number: String,

    /// Mission code (TER, TGV, ...)
    pub mission: String,

    /// Line served
    pub line: String,

    /// Origin and destination, free text
    pub od: String,

    /// Last reported position, free text
    pub position: String,

    /// Delay in minutes, always within [MIN_DELAY_MINUTES, MAX_DELAY_MINUTES]
    pub delay_min: i64,

    /// Priority, always within [MIN_PRIORITY, MAX_PRIORITY]
    pub priority: u8,

    pub status: TrainStatus,

    /// Regulation decision taken for this train
    pub decision: String,

    /// Regulator in charge
    pub regulator: String,

    pub updated_at: DateTime<Utc>,
}

impl Train {
    /// Set the delay, clamped to the allowed range. Returns the stored value.
    pub fn set_delay(&mut self, minutes: i64, now: DateTime<Utc>) -> i64 {
        self.delay_min = clamp_delay(minutes);
        self.updated_at = now;
        self.delay_min
    }

    /// Set the priority, clamped to the allowed range. Returns the stored value.
    pub fn set_priority(&mut self, priority: i64, now: DateTime<Utc>) -> u8 {
        self.priority = clamp_priority(priority);
        self.updated_at = now;
        self.priority
    }
}

pub fn clamp_delay(minutes: i64) -> i64 {
    minutes.clamp(MIN_DELAY_MINUTES, MAX_DELAY_MINUTES)
}

pub fn clamp_priority(priority: i64) -> u8 {
    priority.clamp(MIN_PRIORITY as i64, MAX_PRIORITY as i64) as u8
}
