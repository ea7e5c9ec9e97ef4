//! Run log for pipewright.
//!
//! Every run appends events in NDJSON format (one JSON object per line) to
//! `.pipewright/events/events.ndjson`, so a finished or aborted run can be
//! audited afterwards.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: What happened (run_start, step_complete, ...)
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `run`: Run identifier
//! - `step`: Optional step name for step-specific events
//! - `details`: Freeform object with action-specific details
//!
//! Secret parameter values must be masked before they reach `details`.

use crate::error::{PipewrightError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the run log inside the events directory.
pub const EVENTS_FILE_NAME: &str = "events.ndjson";

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Parameter check finished (ready or not).
    Preflight,
    /// Run started (Pending -> Running(0))
    RunStart,
    /// A step started
    StepStart,
    /// A step finished, successfully or not
    StepComplete,
    /// Run reached a terminal state
    RunComplete,
    /// A held resource was released
    Cleanup,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Preflight => write!(f, "preflight"),
            EventAction::RunStart => write!(f, "run_start"),
            EventAction::StepStart => write!(f, "step_start"),
            EventAction::StepComplete => write!(f, "step_complete"),
            EventAction::RunComplete => write!(f, "run_complete"),
            EventAction::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// An event record for the run log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// Who ran the pipeline (e.g., `user@HOST`).
    pub actor: String,

    /// Run identifier.
    pub run: String,

    /// Optional step name for step-specific events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event for a run.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: EventAction, run: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            run: run.into(),
            step: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the step name for this event.
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            PipewrightError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Get the actor string for event metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Destination for run events; a disabled log drops everything.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    /// Log to `<events_dir>/events.ndjson`.
    pub fn new<P: AsRef<Path>>(events_dir: P) -> Self {
        Self {
            path: Some(events_dir.as_ref().join(EVENTS_FILE_NAME)),
        }
    }

    /// A log that records nothing.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an event. A no-op when disabled.
    pub fn append(&self, event: &Event) -> Result<()> {
        match &self.path {
            Some(path) => append_event(path, event),
            None => Ok(()),
        }
    }
}

/// Append an event to the NDJSON file at `events_file`.
///
/// The file and its directory are created if needed. Each append writes one
/// line with a trailing newline and syncs it to disk.
pub fn append_event(events_file: &Path, event: &Event) -> Result<()> {
    let json_line = event.to_ndjson_line()?;

    if let Some(events_dir) = events_file.parent()
        && !events_dir.exists()
    {
        fs::create_dir_all(events_dir).map_err(|e| {
            PipewrightError::UserError(format!(
                "failed to create events directory '{}': {}",
                events_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(events_file)
        .map_err(|e| {
            PipewrightError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to sync events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Read all events from an NDJSON file, skipping blank lines.
pub fn read_events(events_file: &Path) -> Result<Vec<Event>> {
    let content = fs::read_to_string(events_file).map_err(|e| {
        PipewrightError::UserError(format!(
            "failed to read events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| {
                PipewrightError::UserError(format!(
                    "malformed event in '{}': {}",
                    events_file.display(),
                    e
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventAction::RunStart, "go-docker-20260101000000");

        assert_eq!(event.action, EventAction::RunStart);
        assert_eq!(event.run, "go-docker-20260101000000");
        assert!(!event.actor.is_empty());
        assert!(event.step.is_none());
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn test_event_with_step_and_details() {
        let event = Event::new(EventAction::StepComplete, "run-1")
            .with_step("docker-build")
            .with_details(json!({"exit_code": 0, "success": true}));

        assert_eq!(event.step.as_deref(), Some("docker-build"));
        assert_eq!(event.details["exit_code"], 0);
        assert_eq!(event.details["success"], true);
    }

    #[test]
    fn test_event_serialization_is_single_line() {
        let event = Event::new(EventAction::StepStart, "run-1")
            .with_step("render")
            .with_details(json!({"dest": "inventory.ini\nsecond line"}));

        let line = event.to_ndjson_line().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"action\":\"step_start\""));

        let parsed: Event = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.action, EventAction::StepStart);
        assert_eq!(parsed.step.as_deref(), Some("render"));
    }

    #[test]
    fn test_step_omitted_when_none() {
        let line = Event::new(EventAction::RunComplete, "run-1")
            .to_ndjson_line()
            .unwrap();
        assert!(!line.contains("\"step\""));
    }

    #[test]
    fn test_append_creates_directory_and_appends() {
        let temp = TempDir::new().unwrap();
        let log = EventLog::new(temp.path().join("events"));

        log.append(&Event::new(EventAction::RunStart, "run-1")).unwrap();
        log.append(&Event::new(EventAction::RunComplete, "run-1")).unwrap();

        let events = read_events(log.path().unwrap()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, EventAction::RunStart);
        assert_eq!(events[1].action, EventAction::RunComplete);
    }

    #[test]
    fn test_disabled_log_writes_nothing() {
        let log = EventLog::disabled();
        assert!(log.path().is_none());
        log.append(&Event::new(EventAction::RunStart, "run-1")).unwrap();
    }

    #[test]
    fn test_action_display_matches_serde() {
        for action in [
            EventAction::Preflight,
            EventAction::RunStart,
            EventAction::StepStart,
            EventAction::StepComplete,
            EventAction::RunComplete,
            EventAction::Cleanup,
        ] {
            let serialized = serde_json::to_string(&action).unwrap();
            assert_eq!(serialized, format!("\"{}\"", action));
        }
    }
}
