use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{IncidentId, LogId, TrainId};
use crate::error::{PcregError, Result};

/// Category of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LogType {
    #[default]
    Information,
    #[serde(alias = "Ordre")]
    Order,
    #[serde(alias = "Décision")]
    Decision,
    Incident,
}

impl LogType {
    pub const ALL: [LogType; 4] =
        [LogType::Information, LogType::Order, LogType::Decision, LogType::Incident];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Information => "Information",
            LogType::Order => "Order",
            LogType::Decision => "Decision",
            LogType::Incident => "Incident",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = PcregError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "information" | "info" => Ok(LogType::Information),
            "order" | "ordre" => Ok(LogType::Order),
            "decision" | "décision" => Ok(LogType::Decision),
            "incident" => Ok(LogType::Incident),
            _ => Err(PcregError::InvalidValue {
                field: "type".to_string(),
                reason: format!(
                    "Invalid log type: {}. Use information, order, decision, or incident",
                    s
                ),
            }),
        }
    }
}

/// An entry of the regulation journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: LogId,

    pub at: DateTime<Utc>,

    #[serde(rename = "type")]
    pub entry_type: LogType,

    pub text: String,

    /// Weak reference to a train
    #[serde(default)]
    pub train_id: Option<TrainId>,

    /// Weak reference to an incident
    #[serde(default)]
    pub incident_id: Option<IncidentId>,

    pub author: String,
}

impl LogEntry {
    /// Case-insensitive match against type, text and author
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.entry_type.as_str().to_lowercase().contains(&needle)
            || self.text.to_lowercase().contains(&needle)
            || self.author.to_lowercase().contains(&needle)
    }
}
