//! Event model for nudge.
//!
//! An event is a title pinned to a local calendar date and wall-clock time.
//! The durable JSON layout uses camelCase keys (`createdAt`), matching the
//! store format consumed by every client instance.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const TIME_FORMAT_WITH_SECONDS: &str = "%H:%M:%S";

/// A single reminder-worthy event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique, stable id (epoch milliseconds at creation, kept monotonic).
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Wall-clock time, `HH:MM`, local timezone, no offset.
    pub time: String,
    #[serde(default)]
    pub completed: bool,
    /// Creation timestamp, epoch milliseconds. Immutable. Zero when the
    /// entry predates the field (such entries are exempt from retention).
    #[serde(default)]
    pub created_at: i64,
}

impl Event {
    /// Combine `date` and `time` into a local instant.
    ///
    /// Not stored; recomputed on demand so edits take effect immediately.
    pub fn scheduled_at(&self) -> Result<DateTime<Local>> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|_| malformed(self.id, &self.date, &self.time))?;
        let time = parse_time(self.time.trim())
            .ok_or_else(|| malformed(self.id, &self.date, &self.time))?;

        // DST gaps have no local representation; ambiguous instants take
        // the earlier mapping.
        date.and_time(time)
            .and_local_timezone(Local)
            .earliest()
            .ok_or_else(|| malformed(self.id, &self.date, &self.time))
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, TIME_FORMAT_WITH_SECONDS))
        .ok()
}

fn malformed(id: i64, date: &str, time: &str) -> Error {
    Error::MalformedTimestamp(format!("event {id}: {date:?} {time:?}"))
}

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Validated input for a new event.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
}

impl EventDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            date: date.into(),
            time: time.into(),
        }
    }

    /// Reject drafts that must never reach the repository: empty required
    /// fields or a date/time pair that cannot form an instant.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidEventInput("title must not be empty".into()));
        }
        validate_date(&self.date)?;
        validate_time(&self.time)?;
        Ok(())
    }
}

/// Partial edit of an existing event. `None` fields are left unchanged;
/// `id` and `created_at` are never editable.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.time.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidEventInput("title must not be empty".into()));
            }
        }
        if let Some(date) = &self.date {
            validate_date(date)?;
        }
        if let Some(time) = &self.time {
            validate_time(time)?;
        }
        Ok(())
    }

    /// Apply to an event, returning whether anything changed.
    pub fn apply(&self, event: &mut Event) -> bool {
        let mut changed = false;
        if let Some(title) = &self.title {
            if event.title != *title {
                event.title = title.clone();
                changed = true;
            }
        }
        if let Some(description) = &self.description {
            if event.description != *description {
                event.description = description.clone();
                changed = true;
            }
        }
        if let Some(date) = &self.date {
            if event.date != *date {
                event.date = date.clone();
                changed = true;
            }
        }
        if let Some(time) = &self.time {
            if event.time != *time {
                event.time = time.clone();
                changed = true;
            }
        }
        changed
    }
}

fn validate_date(raw: &str) -> Result<()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidEventInput("date must not be empty".into()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| Error::InvalidEventInput(format!("date must be YYYY-MM-DD, got {trimmed:?}")))
}

fn validate_time(raw: &str) -> Result<()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidEventInput("time must not be empty".into()));
    }
    parse_time(trimmed)
        .map(|_| ())
        .ok_or_else(|| Error::InvalidEventInput(format!("time must be HH:MM, got {trimmed:?}")))
}

/// Sort for display: soonest `scheduled_at` first, malformed entries last,
/// ties broken by id. Storage order (insertion order) is never touched;
/// this is a presentation concern.
pub fn sort_for_display(events: &mut [Event]) {
    events.sort_by_key(|event| {
        (
            event
                .scheduled_at()
                .map(|at| at.with_timezone(&Utc))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            event.id,
        )
    });
}
