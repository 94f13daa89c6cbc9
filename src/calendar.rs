/*!
 # Calendar collaborator interface

 The calendar provider itself (authentication, session renewal) lives
 outside this crate; all the decision engine consumes is a sequence of
 events in a time window. [`EventSource`] is that seam, and
 [`JsonFileSource`] is the file-backed implementation the CLI uses so an
 external fetcher can hand events over without linking against us.
*/

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// One calendar event, as handed over by the external provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Identifier of the calendar the event belongs to
    pub calendar_id: String,
    /// Event start, local time
    pub start: NaiveDateTime,
    /// Event end, local time
    pub end: NaiveDateTime,
    /// All-day events carry no meaningful start/end time of day
    #[serde(default)]
    pub all_day: bool,
}

/// Anything that can list calendar events in a window
pub trait EventSource {
    fn list_events(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<CalendarEvent>>;
}

/// Reads events from a JSON array file written by the external fetcher
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> JsonFileSource {
        JsonFileSource { path: path.into() }
    }
}

impl EventSource for JsonFileSource {
    fn list_events(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<CalendarEvent>> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            Error::Configuration(format!("reading events file {}: {e}", self.path.display()))
        })?;
        let events: Vec<CalendarEvent> = serde_json::from_str(&content).map_err(|e| {
            Error::Configuration(format!("parsing events file {}: {e}", self.path.display()))
        })?;

        let total = events.len();
        let events: Vec<CalendarEvent> = events
            .into_iter()
            .filter(|e| e.end >= from && e.start <= to)
            .collect();
        debug!(
            "Loaded {} events, {} overlap the requested window",
            total,
            events.len()
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn deserializes_provider_output() {
        let json = r#"[
            {"calendar_id": "work", "start": "2024-01-01T10:05:00", "end": "2024-01-01T10:30:00"},
            {"calendar_id": "home", "start": "2024-01-01T00:00:00", "end": "2024-01-02T00:00:00", "all_day": true}
        ]"#;
        let events: Vec<CalendarEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].calendar_id, "work");
        assert!(!events[0].all_day);
        assert!(events[1].all_day);
        assert_eq!(events[0].start, at(1, 10, 5));
    }

    #[test]
    fn file_source_filters_to_window() {
        let json = r#"[
            {"calendar_id": "work", "start": "2024-01-01T09:00:00", "end": "2024-01-01T09:30:00"},
            {"calendar_id": "work", "start": "2024-01-02T09:00:00", "end": "2024-01-02T09:30:00"}
        ]"#;
        let path = std::env::temp_dir().join("meeting-sign-events-test.json");
        fs::write(&path, json).unwrap();

        let source = JsonFileSource::new(&path);
        let events = source.list_events(at(1, 0, 0), at(1, 23, 59)).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, at(1, 9, 0));
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let source = JsonFileSource::new("/nonexistent/events.json");
        assert!(matches!(
            source.list_events(at(1, 0, 0), at(1, 23, 59)),
            Err(Error::Configuration(_))
        ));
    }
}
