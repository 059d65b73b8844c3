//! Editing operations on the document.
//!
//! These are what the board, incident and journal views call. Each one keeps
//! the model invariants (clamped delay and priority, fresh unique ids) and
//! records a journal entry the way an operator would expect to see it.
//! Persisting the change is the caller's job (see the state store).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{PcregError, Result};
use crate::models::document::{clamp_rp_offset, DEFAULT_OPERATOR_NAME, DEFAULT_ZONE_NAME};
use crate::models::train::clamp_priority;
use crate::models::{
    Document, Incident, IncidentId, IncidentStatus, LogEntry, LogId, LogType, NetworkStatus,
    Train, TrainId, TrainStatus,
};

const FALLBACK_AUTHOR: &str = "PC";

/// Input for [`Document::add_train`]
#[derive(Debug, Clone, Default)]
pub struct NewTrain {
    pub number: String,
    pub mission: String,
    pub line: String,
    pub od: String,
    pub position: Option<String>,
    pub priority: i64,
    pub regulator: Option<String>,
}

/// Input for [`Document::add_incident`]
#[derive(Debug, Clone, Default)]
pub struct NewIncident {
    pub kind: String,
    pub location: String,
    pub severity: String,
    pub description: String,
    pub train_id: Option<TrainId>,
}

/// Input for [`Document::add_log`]
#[derive(Debug, Clone, Default)]
pub struct NewLogEntry {
    pub entry_type: LogType,
    pub text: String,
    pub train_id: Option<TrainId>,
    pub incident_id: Option<IncidentId>,
    /// Defaults to the operator name
    pub author: Option<String>,
}

/// Partial settings change; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub zone_name: Option<String>,
    pub operator_name: Option<String>,
    pub network_status: Option<NetworkStatus>,
    pub rp_offset_minutes: Option<i64>,
    pub autosave: Option<bool>,
}

/// Journal filter; every set criterion must match
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub query: Option<String>,
    pub entry_type: Option<LogType>,
    pub incident_id: Option<IncidentId>,
}

/// Board filter; every set criterion must match
#[derive(Debug, Clone, Default)]
pub struct TrainFilter {
    pub query: Option<String>,
    pub status: Option<TrainStatus>,
    pub line: Option<String>,
}

/// Headline figures for the regulation board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSummary {
    pub trains: usize,
    pub open_incidents: usize,
    pub average_delay_min: i64,
    pub held_trains: usize,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PcregError::MissingField { field: field.to_string() });
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn signed_minutes(minutes: i64) -> String {
    if minutes >= 0 {
        format!("+{}", minutes)
    } else {
        minutes.to_string()
    }
}

impl Document {
    /// Put a new train on the board (newest first)
    pub fn add_train(&mut self, new: NewTrain, now: DateTime<Utc>) -> Result<&Train> {
        require("number", &new.number)?;
        require("mission", &new.mission)?;
        require("od", &new.od)?;

        let mut id = TrainId::generate();
        while self.find_train(&id).is_some() {
            id = TrainId::generate();
        }

        let train = Train {
            id: id.clone(),
            number: new.number.trim().to_string(),
            mission: new.mission.trim().to_string(),
            line: new.line.trim().to_string(),
            od: new.od.trim().to_string(),
            position: non_blank(new.position).unwrap_or_else(|| "-".to_string()),
            delay_min: 0,
            priority: clamp_priority(new.priority),
            status: TrainStatus::InService,
            decision: String::new(),
            regulator: non_blank(new.regulator).unwrap_or_else(|| FALLBACK_AUTHOR.to_string()),
            updated_at: now,
        };
        let text = format!("Train in service: {} ({})", train.number, train.mission);
        self.trains.insert(0, train);

        self.add_log(
            NewLogEntry {
                entry_type: LogType::Information,
                text,
                train_id: Some(id),
                ..Default::default()
            },
            now,
        );
        Ok(&self.trains[0])
    }

    /// Report a delay; the stored value is clamped. Returns the stored delay.
    pub fn apply_delay(
        &mut self,
        id: &TrainId,
        minutes: i64,
        cause: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let train = self
            .find_train_mut(id)
            .ok_or_else(|| PcregError::TrainNotFound { id: id.to_string() })?;
        let stored = train.set_delay(minutes, now);

        let mut text = format!("Delay {}: {} min", train.number, signed_minutes(stored));
        if let Some(cause) = cause.map(str::trim).filter(|c| !c.is_empty()) {
            text.push_str(&format!(" • Cause: {}", cause));
        }

        self.add_log(
            NewLogEntry {
                entry_type: LogType::Decision,
                text,
                train_id: Some(id.clone()),
                ..Default::default()
            },
            now,
        );
        Ok(stored)
    }

    pub fn set_train_status(
        &mut self,
        id: &TrainId,
        status: TrainStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let train = self
            .find_train_mut(id)
            .ok_or_else(|| PcregError::TrainNotFound { id: id.to_string() })?;
        train.status = status;
        train.updated_at = now;
        let text = format!("Status {}: {}", train.number, status);

        self.add_log(
            NewLogEntry {
                entry_type: LogType::Decision,
                text,
                train_id: Some(id.clone()),
                ..Default::default()
            },
            now,
        );
        Ok(())
    }

    /// Free-text position edit, no journal entry
    pub fn set_train_position(&mut self, id: &TrainId, position: &str, now: DateTime<Utc>) -> Result<()> {
        let train = self
            .find_train_mut(id)
            .ok_or_else(|| PcregError::TrainNotFound { id: id.to_string() })?;
        train.position = position.trim().to_string();
        train.updated_at = now;
        Ok(())
    }

    /// Free-text decision edit, no journal entry
    pub fn set_train_decision(&mut self, id: &TrainId, decision: &str, now: DateTime<Utc>) -> Result<()> {
        let train = self
            .find_train_mut(id)
            .ok_or_else(|| PcregError::TrainNotFound { id: id.to_string() })?;
        train.decision = decision.trim().to_string();
        train.updated_at = now;
        Ok(())
    }

    /// Take a train off the board. Journal entries and incidents keep their
    /// (now dangling) reference to it.
    pub fn remove_train(&mut self, id: &TrainId, now: DateTime<Utc>) -> Result<Train> {
        let position = self
            .trains
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| PcregError::TrainNotFound { id: id.to_string() })?;
        let train = self.trains.remove(position);

        self.add_log(
            NewLogEntry {
                entry_type: LogType::Information,
                text: format!("Train removed from tracking: {}", train.number),
                train_id: Some(id.clone()),
                ..Default::default()
            },
            now,
        );
        Ok(train)
    }

    /// Declare an incident, assigned to the current operator
    pub fn add_incident(&mut self, new: NewIncident, now: DateTime<Utc>) -> Result<&Incident> {
        require("location", &new.location)?;
        require("description", &new.description)?;

        let mut id = IncidentId::generate();
        while self.find_incident(&id).is_some() {
            id = IncidentId::generate();
        }

        let incident = Incident {
            id: id.clone(),
            created_at: now,
            status: IncidentStatus::Open,
            kind: new.kind.trim().to_string(),
            location: new.location.trim().to_string(),
            severity: new.severity.trim().to_string(),
            description: new.description.trim().to_string(),
            train_id: new.train_id.clone(),
            assigned_to: self.operator_or_fallback(),
        };
        let text = format!(
            "Incident declared: {} • {} • Severity: {}",
            incident.kind, incident.location, incident.severity
        );
        self.incidents.insert(0, incident);

        self.add_log(
            NewLogEntry {
                entry_type: LogType::Incident,
                text,
                train_id: new.train_id,
                incident_id: Some(id),
                author: None,
            },
            now,
        );
        Ok(&self.incidents[0])
    }

    /// Move an incident to its next status. Returns the new status.
    pub fn advance_incident(&mut self, id: &IncidentId, now: DateTime<Utc>) -> Result<IncidentStatus> {
        let incident = self
            .find_incident_mut(id)
            .ok_or_else(|| PcregError::IncidentNotFound { id: id.to_string() })?;
        incident.status = incident.status.next();
        let status = incident.status;
        let train_id = incident.train_id.clone();

        self.add_log(
            NewLogEntry {
                entry_type: LogType::Decision,
                text: format!("Incident {}: status → {}", id, status),
                train_id,
                incident_id: Some(id.clone()),
                author: None,
            },
            now,
        );
        Ok(status)
    }

    pub fn remove_incident(&mut self, id: &IncidentId, now: DateTime<Utc>) -> Result<Incident> {
        let position = self
            .incidents
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| PcregError::IncidentNotFound { id: id.to_string() })?;
        let incident = self.incidents.remove(position);

        self.add_log(
            NewLogEntry {
                entry_type: LogType::Information,
                text: format!("Incident removed: {} • {}", incident.kind, incident.location),
                train_id: incident.train_id.clone(),
                ..Default::default()
            },
            now,
        );
        Ok(incident)
    }

    /// Append a journal entry (newest first)
    pub fn add_log(&mut self, new: NewLogEntry, now: DateTime<Utc>) -> &LogEntry {
        let mut id = LogId::generate();
        while self.find_log(&id).is_some() {
            id = LogId::generate();
        }

        let author = non_blank(new.author).unwrap_or_else(|| self.operator_or_fallback());
        self.logs.insert(
            0,
            LogEntry {
                id,
                at: now,
                entry_type: new.entry_type,
                text: new.text,
                train_id: new.train_id,
                incident_id: new.incident_id,
                author,
            },
        );
        &self.logs[0]
    }

    pub fn remove_log(&mut self, id: &LogId) -> Result<LogEntry> {
        let position = self
            .logs
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| PcregError::LogEntryNotFound { id: id.to_string() })?;
        Ok(self.logs.remove(position))
    }

    /// Apply a settings change and journal it. Blank names fall back to the defaults.
    pub fn apply_settings(&mut self, update: SettingsUpdate, now: DateTime<Utc>) {
        let settings = &mut self.settings;
        if let Some(zone) = update.zone_name {
            settings.zone_name = non_blank(Some(zone)).unwrap_or_else(|| DEFAULT_ZONE_NAME.to_string());
        }
        if let Some(operator) = update.operator_name {
            settings.operator_name =
                non_blank(Some(operator)).unwrap_or_else(|| DEFAULT_OPERATOR_NAME.to_string());
        }
        if let Some(status) = update.network_status {
            settings.network_status = status;
        }
        if let Some(offset) = update.rp_offset_minutes {
            settings.rp_offset_minutes = clamp_rp_offset(offset);
        }
        if let Some(autosave) = update.autosave {
            settings.autosave = autosave;
        }

        let text = format!(
            "Settings changed: network status={}, RP offset={} min.",
            self.settings.network_status, self.settings.rp_offset_minutes
        );
        self.add_log(NewLogEntry { text, ..Default::default() }, now);
    }

    /// Journal entries matching `filter`, newest first
    pub fn search_logs(&self, filter: &LogFilter) -> Vec<&LogEntry> {
        self.logs
            .iter()
            .filter(|l| filter.query.as_deref().map_or(true, |q| l.matches(q)))
            .filter(|l| filter.entry_type.map_or(true, |t| l.entry_type == t))
            .filter(|l| {
                filter
                    .incident_id
                    .as_ref()
                    .map_or(true, |id| l.incident_id.as_ref() == Some(id))
            })
            .collect()
    }

    /// Trains matching `filter`, in board order
    pub fn search_trains(&self, filter: &TrainFilter) -> Vec<&Train> {
        let query = filter.query.as_deref().map(|q| q.trim().to_lowercase()).unwrap_or_default();
        self.trains
            .iter()
            .filter(|t| {
                query.is_empty()
                    || [&t.number, &t.mission, &t.line, &t.od, &t.position]
                        .iter()
                        .any(|field| field.to_lowercase().contains(&query))
            })
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| filter.line.as_deref().map_or(true, |line| t.line == line))
            .collect()
    }

    pub fn summary(&self) -> BoardSummary {
        let trains = self.trains.len();
        let total_delay: i64 = self.trains.iter().map(|t| t.delay_min).sum();
        let average_delay_min = if trains == 0 {
            0
        } else {
            (total_delay as f64 / trains as f64).round() as i64
        };
        BoardSummary {
            trains,
            open_incidents: self
                .incidents
                .iter()
                .filter(|i| i.status != IncidentStatus::Closed)
                .count(),
            average_delay_min,
            held_trains: self.trains.iter().filter(|t| t.status == TrainStatus::Held).count(),
        }
    }

    fn operator_or_fallback(&self) -> String {
        non_blank(Some(self.settings.operator_name.clone()))
            .unwrap_or_else(|| FALLBACK_AUTHOR.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_RP_OFFSET_MINUTES;

    fn new_train(number: &str) -> NewTrain {
        NewTrain {
            number: number.to_string(),
            mission: "TER".to_string(),
            line: "L4".to_string(),
            od: "METZ → NANCY".to_string(),
            priority: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_add_train_logs_and_defaults() {
        let now = Utc::now();
        let mut doc = Document::new_default(now);

        let train = doc.add_train(NewTrain { priority: 9, ..new_train("TER 830") }, now).unwrap();
        let id = train.id.clone();
        assert_eq!(train.priority, 3);
        assert_eq!(train.position, "-");
        assert_eq!(train.regulator, "PC");

        assert_eq!(doc.trains[0].id, id);
        assert_eq!(doc.logs[0].train_id.as_ref(), Some(&id));
        assert_eq!(doc.logs[0].author, "Régulateur");
        assert!(doc.logs[0].text.contains("TER 830"));
    }

    #[test]
    fn test_add_train_requires_fields() {
        let mut doc = Document::new_default(Utc::now());
        let err = doc.add_train(NewTrain { od: " ".to_string(), ..new_train("X") }, Utc::now());
        assert!(matches!(err, Err(PcregError::MissingField { field }) if field == "od"));
        assert_eq!(doc.trains.len(), 1);
    }

    #[test]
    fn test_apply_delay_clamps_and_logs() {
        let now = Utc::now();
        let mut doc = Document::new_default(now);
        let id = doc.trains[0].id.clone();

        let stored = doc.apply_delay(&id, 5000, Some("signal failure"), now).unwrap();
        assert_eq!(stored, 999);
        assert_eq!(doc.find_train(&id).unwrap().delay_min, 999);
        assert_eq!(doc.logs[0].entry_type, LogType::Decision);
        assert_eq!(doc.logs[0].text, "Delay SD92: +999 min • Cause: signal failure");

        doc.apply_delay(&id, -3, None, now).unwrap();
        assert_eq!(doc.logs[0].text, "Delay SD92: -3 min");
    }

    #[test]
    fn test_unknown_train_is_reported() {
        let mut doc = Document::new_default(Utc::now());
        let missing = TrainId::from("TRN_missing");
        assert!(matches!(
            doc.apply_delay(&missing, 5, None, Utc::now()),
            Err(PcregError::TrainNotFound { .. })
        ));
        assert!(doc.remove_train(&missing, Utc::now()).is_err());
    }

    #[test]
    fn test_incident_lifecycle() {
        let now = Utc::now();
        let mut doc = Document::new_default(now);
        let train_id = doc.trains[0].id.clone();

        let incident = doc
            .add_incident(
                NewIncident {
                    kind: "Equipment failure".to_string(),
                    location: "Saverne".to_string(),
                    severity: "Minor".to_string(),
                    description: "Door fault car 3".to_string(),
                    train_id: Some(train_id.clone()),
                },
                now,
            )
            .unwrap();
        let id = incident.id.clone();
        assert_eq!(incident.status, IncidentStatus::Open);
        assert_eq!(incident.assigned_to, "Régulateur");
        assert_eq!(doc.logs[0].entry_type, LogType::Incident);
        assert_eq!(doc.logs[0].incident_id.as_ref(), Some(&id));

        assert_eq!(doc.advance_incident(&id, now).unwrap(), IncidentStatus::InProgress);
        assert_eq!(doc.summary().open_incidents, 1);
        assert_eq!(doc.advance_incident(&id, now).unwrap(), IncidentStatus::Closed);
        assert_eq!(doc.summary().open_incidents, 0);

        doc.remove_incident(&id, now).unwrap();
        assert!(doc.find_incident(&id).is_none());
        // Journal entries still point at the removed incident
        let filter = LogFilter { incident_id: Some(id), ..Default::default() };
        assert_eq!(doc.search_logs(&filter).len(), 3);
    }

    #[test]
    fn test_remove_train_leaves_dangling_references() {
        let now = Utc::now();
        let mut doc = Document::new_default(now);
        let id = doc.trains[0].id.clone();
        doc.apply_delay(&id, 4, None, now).unwrap();

        doc.remove_train(&id, now).unwrap();
        let delay_entry = doc.logs.iter().find(|l| l.text.starts_with("Delay")).unwrap();
        assert_eq!(delay_entry.train_id.as_ref(), Some(&id));
        assert!(doc.train_of(delay_entry).is_none());
    }

    #[test]
    fn test_apply_settings_falls_back_on_blank_names() {
        let now = Utc::now();
        let mut doc = Document::new_default(now);
        doc.apply_settings(
            SettingsUpdate {
                zone_name: Some("  ".to_string()),
                operator_name: Some("J. Martin".to_string()),
                network_status: Some(NetworkStatus::Disrupted),
                rp_offset_minutes: Some(5),
                autosave: Some(false),
            },
            now,
        );

        assert_eq!(doc.settings.zone_name, DEFAULT_ZONE_NAME);
        assert_eq!(doc.settings.operator_name, "J. Martin");
        assert!(!doc.settings.autosave);
        assert_eq!(doc.logs[0].author, "J. Martin");
        assert_eq!(doc.logs[0].text, "Settings changed: network status=disrupted, RP offset=5 min.");
    }

    #[test]
    fn test_out_of_range_rp_offset_is_clamped() {
        let now = Utc::now();
        let mut doc = Document::new_default(now);
        doc.apply_settings(
            SettingsUpdate { rp_offset_minutes: Some(9_000_000_000_000), ..Default::default() },
            now,
        );

        assert_eq!(doc.settings.rp_offset_minutes, MAX_RP_OFFSET_MINUTES);
        assert_eq!(doc.settings.rp_time(now), now + chrono::Duration::minutes(MAX_RP_OFFSET_MINUTES));
    }

    #[test]
    fn test_search_and_summary() {
        let now = Utc::now();
        let mut doc = Document::new_default(now);
        let id = doc.add_train(new_train("K123"), now).unwrap().id.clone();
        doc.set_train_status(&id, TrainStatus::Held, now).unwrap();
        doc.apply_delay(&id, 10, None, now).unwrap();

        let held = doc.search_trains(&TrainFilter { status: Some(TrainStatus::Held), ..Default::default() });
        assert_eq!(held.len(), 1);
        let by_text = doc.search_trains(&TrainFilter { query: Some("nancy".to_string()), ..Default::default() });
        assert_eq!(by_text.len(), 1);
        let by_line = doc.search_trains(&TrainFilter { line: Some("L1".to_string()), ..Default::default() });
        assert_eq!(by_line[0].number, "SD92");

        let summary = doc.summary();
        assert_eq!(summary.trains, 2);
        assert_eq!(summary.held_trains, 1);
        assert_eq!(summary.average_delay_min, 5);

        let decisions = doc.search_logs(&LogFilter { entry_type: Some(LogType::Decision), ..Default::default() });
        assert_eq!(decisions.len(), 2);
    }

    #[test]
    fn test_remove_log() {
        let mut doc = Document::new_default(Utc::now());
        let id = doc.logs[0].id.clone();
        doc.remove_log(&id).unwrap();
        assert!(doc.logs.is_empty());
        assert!(matches!(doc.remove_log(&id), Err(PcregError::LogEntryNotFound { .. })));
    }
}
