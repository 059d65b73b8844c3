use chrono::{DateTime, Utc};
use pcreg_core::editing::BoardSummary;
use pcreg_core::models::{Incident, LogEntry, Snapshot, Train};
use serde::Serialize;
use tabled::Tabled;

/// Output for init command
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub workspace_path: String,
    pub config_path: String,
    pub store_path: String,
    pub boot: String,
}

/// Output for status command
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub workspace_path: String,
    pub schema_version: u32,
    pub zone_name: String,
    pub operator_name: String,
    pub network_status: String,
    pub rp_time: DateTime<Utc>,
    pub summary: BoardSummary,
    pub snapshot_count: usize,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_saved_by: String,
    pub boot: String,
    pub config: Option<Vec<ConfigEntry>>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct TrainRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Number")]
    pub number: String,
    #[tabled(rename = "Mission")]
    pub mission: String,
    #[tabled(rename = "Line")]
    pub line: String,
    #[tabled(rename = "O/D")]
    pub od: String,
    #[tabled(rename = "Position")]
    pub position: String,
    #[tabled(rename = "Delay")]
    pub delay: String,
    #[tabled(rename = "Prio")]
    pub priority: u8,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Decision")]
    pub decision: String,
}

impl From<&Train> for TrainRow {
    fn from(t: &Train) -> Self {
        Self {
            id: t.id.to_string(),
            number: t.number.clone(),
            mission: t.mission.clone(),
            line: t.line.clone(),
            od: t.od.clone(),
            position: t.position.clone(),
            delay: if t.delay_min > 0 {
                format!("+{} min", t.delay_min)
            } else {
                format!("{} min", t.delay_min)
            },
            priority: t.priority,
            status: t.status.to_string(),
            decision: t.decision.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct IncidentRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Declared")]
    pub created_at: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Location")]
    pub location: String,
    #[tabled(rename = "Severity")]
    pub severity: String,
    #[tabled(rename = "Train")]
    pub train: String,
    #[tabled(rename = "Assigned")]
    pub assigned_to: String,
}

impl IncidentRow {
    /// `train` is the train number when the reference still resolves
    pub fn new(incident: &Incident, train: Option<&Train>) -> Self {
        Self {
            id: incident.id.to_string(),
            created_at: incident.created_at.format("%Y-%m-%d %H:%M").to_string(),
            status: incident.status.to_string(),
            kind: incident.kind.clone(),
            location: incident.location.clone(),
            severity: incident.severity.clone(),
            train: describe_reference(incident.train_id.as_ref().map(|id| id.as_str()), train.map(|t| t.number.as_str())),
            assigned_to: incident.assigned_to.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct LogRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "At")]
    pub at: String,
    #[tabled(rename = "Type")]
    pub entry_type: String,
    #[tabled(rename = "Text")]
    pub text: String,
    #[tabled(rename = "Train")]
    pub train: String,
    #[tabled(rename = "Author")]
    pub author: String,
}

impl LogRow {
    pub fn new(entry: &LogEntry, train: Option<&Train>) -> Self {
        Self {
            id: entry.id.to_string(),
            at: entry.at.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry_type: entry.entry_type.to_string(),
            text: entry.text.clone(),
            train: describe_reference(entry.train_id.as_ref().map(|id| id.as_str()), train.map(|t| t.number.as_str())),
            author: entry.author.clone(),
        }
    }
}

/// Weak references show the train number, or the raw id marked as removed
fn describe_reference(id: Option<&str>, resolved: Option<&str>) -> String {
    match (id, resolved) {
        (_, Some(number)) => number.to_string(),
        (Some(id), None) => format!("{} (removed)", id),
        (None, None) => "-".to_string(),
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct SnapshotRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Created")]
    pub created_at: String,
}

impl From<&Snapshot> for SnapshotRow {
    fn from(s: &Snapshot) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            created_at: s.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Output for train delay command
#[derive(Debug, Serialize)]
pub struct DelayOutput {
    pub train_id: String,
    pub number: String,
    pub requested_min: i64,
    pub stored_min: i64,
}

/// Output for export command
#[derive(Debug, Serialize)]
pub struct ExportOutput {
    pub path: String,
    pub bytes: usize,
}

/// Output for import command
#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub path: String,
    pub trains: usize,
    pub incidents: usize,
    pub logs: usize,
}

#[derive(Debug, Serialize, Tabled)]
pub struct MigrationRow {
    #[tabled(rename = "From")]
    pub from: u32,
    #[tabled(rename = "To")]
    pub to: u32,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Applied at boot")]
    pub applied: bool,
}

/// Output for migrations command
#[derive(Debug, Serialize)]
pub struct MigrationsOutput {
    pub current_version: u32,
    pub stored_version: Option<u32>,
    pub steps: Vec<MigrationRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_reference() {
        assert_eq!(describe_reference(Some("TRN_1"), Some("SD92")), "SD92");
        assert_eq!(describe_reference(Some("TRN_1"), None), "TRN_1 (removed)");
        assert_eq!(describe_reference(None, None), "-");
    }
}
