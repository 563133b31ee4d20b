use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Local};
use nudge::config::Config;
use nudge::engine::ReminderEngine;
use nudge::event::Event;
use nudge::storage::{EventStorage, STORE_FILE};
use tempfile::TempDir;

/// A scratch store in a temp directory plus helpers for seeding and
/// inspecting the raw payload.
pub struct TestStore {
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join(STORE_FILE)
    }

    pub fn storage(&self) -> EventStorage {
        EventStorage::new(self.store_path())
    }

    /// Engine over this store with alert side-channels disabled, so tests
    /// never spawn notifier processes or ring the bell.
    pub fn engine(&self) -> ReminderEngine {
        let mut config = Config::default();
        config.alerts.desktop = false;
        config.alerts.sound = false;
        ReminderEngine::with_storage(self.storage(), &config)
    }

    pub fn write_payload(&self, raw: &str) {
        fs::write(self.store_path(), raw).expect("failed to seed store");
    }

    pub fn read_events(&self) -> Vec<Event> {
        let raw = fs::read_to_string(self.store_path()).expect("store missing");
        serde_json::from_str(&raw).expect("store unparsable")
    }
}

/// An event JSON object scheduled at `at`, for seeding raw payloads.
///
/// Uses the seconds-precise time form so an instant seeded "now" stays
/// inside the alert window regardless of where the minute boundary falls.
pub fn event_json(id: i64, title: &str, at: DateTime<Local>, created_at: i64) -> String {
    format!(
        r#"{{"id":{id},"title":"{title}","description":"","date":"{}","time":"{}","completed":false,"createdAt":{created_at}}}"#,
        at.format("%Y-%m-%d"),
        at.format("%H:%M:%S"),
    )
}

/// A local instant comfortably in the future, minute-aligned.
pub fn tomorrow_noonish() -> DateTime<Local> {
    (Local::now() + Duration::days(1))
        .date_naive()
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
        .and_local_timezone(Local)
        .earliest()
        .expect("valid local instant")
}
