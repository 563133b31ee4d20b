//! Structured feed output for external integrations.
//!
//! Records are emitted as JSON lines to stdout or a configured file, one
//! per engine-visible change. Scripts wrap `nudge watch --events -` to
//! react to reminders without scraping human output.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::event::Event;

pub const FEED_SCHEMA_VERSION: &str = "nudge.feed.v1";

#[derive(Debug, Clone)]
pub enum FeedDestination {
    Stdout,
    File(PathBuf),
}

impl FeedDestination {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            if trimmed == "-" {
                return Some(FeedDestination::Stdout);
            }
            Some(FeedDestination::File(PathBuf::from(trimmed)))
        })
    }

    pub fn open(&self) -> Result<FeedSink> {
        match self {
            FeedDestination::Stdout => Ok(FeedSink::stdout()),
            FeedDestination::File(path) => FeedSink::file(path),
        }
    }
}

/// Feed record kinds.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    ReminderDue,
    EventCreated,
    EventEdited,
    EventDeleted,
    EventCompleted,
    EventReopened,
}

/// A structured feed record with an optional event payload.
#[derive(Debug, Clone, Serialize)]
pub struct FeedRecord {
    pub schema_version: &'static str,
    pub kind: FeedKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
}

impl FeedRecord {
    pub fn new(kind: FeedKind) -> Self {
        Self {
            schema_version: FEED_SCHEMA_VERSION,
            kind,
            timestamp: Utc::now(),
            event: None,
        }
    }

    pub fn with_event(mut self, event: &Event) -> Self {
        self.event = Some(event.clone());
        self
    }
}

/// Sink writing JSONL records to a destination.
pub struct FeedSink {
    writer: Box<dyn Write + Send>,
}

impl FeedSink {
    pub fn stdout() -> Self {
        Self {
            writer: Box::new(std::io::stdout()),
        }
    }

    pub fn file(path: &Path) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            writer: Box::new(file),
        })
    }

    pub fn emit(&mut self, record: &FeedRecord) -> Result<()> {
        let serialized = serde_json::to_vec(record)?;
        self.writer.write_all(&serialized)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush().map_err(Error::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_parsing() {
        assert!(FeedDestination::parse(None).is_none());
        assert!(FeedDestination::parse(Some("  ")).is_none());
        assert!(matches!(
            FeedDestination::parse(Some("-")),
            Some(FeedDestination::Stdout)
        ));
        assert!(matches!(
            FeedDestination::parse(Some("/tmp/feed.jsonl")),
            Some(FeedDestination::File(_))
        ));
    }

    #[test]
    fn records_serialize_as_snake_case_kinds() {
        let record = FeedRecord::new(FeedKind::ReminderDue);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"reminder_due\""));
        assert!(json.contains(FEED_SCHEMA_VERSION));
    }
}
