//! Durable storage for the event collection.
//!
//! The whole collection lives as one JSON array in a single file
//! (`event_reminder_events.json`), by default under the per-user data
//! directory. Every save overwrites the entire blob; there is no incremental
//! patching. Reads fail soft: a missing or corrupt store is an empty
//! collection, never an error.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::event::{now_millis, Event};
use crate::lock::{lock_path_for, write_atomic, StoreLock, DEFAULT_LOCK_TIMEOUT_MS};

/// File name of the durable blob, the store's "named key".
pub const STORE_FILE: &str = "event_reminder_events.json";

/// Retention window: events older than this (by `createdAt`) are evicted
/// silently at load time.
pub const RETENTION_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct EventStorage {
    path: PathBuf,
    retention_days: i64,
}

impl EventStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retention_days: RETENTION_DAYS,
        }
    }

    pub fn with_retention_days(mut self, days: i64) -> Self {
        self.retention_days = days;
        self
    }

    /// Default store location under the user's data directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "nudge").ok_or_else(|| {
            Error::OperationFailed("could not resolve a user data directory".to_string())
        })?;
        Ok(dirs.data_dir().join(STORE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the durable collection.
    ///
    /// Missing, unreadable, or unparsable data yields an empty collection.
    /// Retention filtering applies; when it evicts anything, the filtered
    /// set is written back immediately so the eviction is itself durable.
    pub fn load(&self) -> Vec<Event> {
        self.load_at(now_millis())
    }

    /// `load` with an injected clock, for deterministic tests.
    pub fn load_at(&self, now_ms: i64) -> Vec<Event> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), %err, "store unreadable, starting empty");
                }
                return Vec::new();
            }
        };

        let events: Vec<Event> = match serde_json::from_str(&raw) {
            Ok(events) => events,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "store unparsable, starting empty");
                return Vec::new();
            }
        };

        let before = events.len();
        let cutoff = self.retention_days * MILLIS_PER_DAY;
        let kept: Vec<Event> = events
            .into_iter()
            // Entries without a creation timestamp predate the field and
            // are exempt.
            .filter(|event| event.created_at == 0 || now_ms - event.created_at <= cutoff)
            .collect();

        if kept.len() != before {
            debug!(
                evicted = before - kept.len(),
                "retention eviction, persisting filtered set"
            );
            if let Err(err) = self.save(&kept) {
                warn!(%err, "failed to persist retention eviction");
            }
        }

        kept
    }

    /// Overwrite the durable blob with the full collection.
    ///
    /// Serialized under an exclusive lock and written atomically, so a
    /// concurrent instance never observes a partial set.
    pub fn save(&self, events: &[Event]) -> Result<()> {
        let json = serde_json::to_string(events)?;
        let _lock = StoreLock::acquire(lock_path_for(&self.path), DEFAULT_LOCK_TIMEOUT_MS)?;
        write_atomic(&self.path, json.as_bytes())
    }

    /// Raw payload of the store, if present. Used by the sync path, which
    /// hands the payload to the engine unparsed.
    pub fn read_raw(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }
}
