//! The reminder engine: the single entry point for collaborators.
//!
//! Owns the repository and tracker behind one mutex, so the ticker
//! thread, user-driven mutations, and the store watcher all serialize.
//! Reminder-due callbacks and alert sinks run outside the lock; a
//! callback may call back into the engine freely.
//!
//! `start` spawns the periodic ticker and the store watcher as a pair;
//! `shutdown` (and drop) stops and joins both, so no tick can run against
//! torn-down state.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Local;
use tracing::{info, warn};

use crate::alert::{AlertSink, DesktopNotifier, SoundCue};
use crate::config::Config;
use crate::error::Result;
use crate::event::{Event, EventDraft, EventPatch};
use crate::repository::EventRepository;
use crate::scheduler::{collect_due, Ticker};
use crate::storage::EventStorage;
use crate::sync::{StoreWatcher, WATCH_DEBOUNCE_MS};

pub type ReminderCallback = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

struct EngineShared {
    repo: Mutex<EventRepository>,
    callbacks: Mutex<Vec<ReminderCallback>>,
    sinks: Vec<Box<dyn AlertSink + Send + Sync>>,
    window_secs: i64,
}

impl EngineShared {
    fn repo(&self) -> MutexGuard<'_, EventRepository> {
        // A panic while holding the lock must not wedge the scheduler for
        // the rest of the session.
        self.repo.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn callbacks(&self) -> MutexGuard<'_, Vec<ReminderCallback>> {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// One scheduler tick: collect due events under the lock, then deliver
    /// alerts and callbacks without it.
    fn run_tick(&self) {
        let due = collect_due(&mut self.repo(), Local::now(), self.window_secs);
        if due.is_empty() {
            return;
        }

        // Snapshot the handler list so delivery holds no lock at all.
        let callbacks: Vec<ReminderCallback> = self.callbacks().clone();

        for event in &due {
            info!(id = event.id, title = %event.title, "reminder due");

            for sink in &self.sinks {
                if let Err(err) = sink.alert(event) {
                    warn!(sink = sink.name(), %err, "alert channel failed");
                }
            }

            for callback in &callbacks {
                callback(event);
            }
        }
    }

    /// Cross-instance sync entry point. `None` means the durable blob was
    /// removed: replace with empty. A parseable payload replaces the
    /// collection wholesale; an unparsable one is dropped with a warning,
    /// keeping the current collection.
    fn apply_external(&self, payload: Option<&str>) {
        match payload {
            None => {
                info!("store removed externally, clearing collection");
                self.repo().replace_all(Vec::new());
            }
            Some(raw) => match serde_json::from_str::<Vec<Event>>(raw) {
                Ok(events) => {
                    info!(count = events.len(), "store changed externally, replacing collection");
                    self.repo().replace_all(events);
                }
                Err(err) => {
                    warn!(%err, "external store payload unparsable, keeping current collection");
                }
            },
        }
    }
}

pub struct ReminderEngine {
    shared: Arc<EngineShared>,
    storage: EventStorage,
    tick_period: Duration,
    ticker: Option<Ticker>,
    watcher: Option<StoreWatcher>,
}

impl ReminderEngine {
    /// Build an engine from configuration: resolve the store path, load
    /// the collection, set up alert sinks. The scheduler is not running
    /// until `start`.
    pub fn open(config: &Config) -> Result<Self> {
        let store_path = match &config.store {
            Some(path) => path.clone(),
            None => EventStorage::default_path()?,
        };
        let storage =
            EventStorage::new(store_path).with_retention_days(config.retention.days);
        Ok(Self::with_storage(storage, config))
    }

    /// Build over an explicit storage. Used by the CLI (`--store`) and
    /// tests.
    pub fn with_storage(storage: EventStorage, config: &Config) -> Self {
        let mut sinks: Vec<Box<dyn AlertSink + Send + Sync>> = Vec::new();
        if config.alerts.desktop {
            sinks.push(Box::new(DesktopNotifier::new(
                config.alerts.notify_command.clone(),
            )));
        }
        if config.alerts.sound {
            sinks.push(Box::new(SoundCue::new(config.alerts.sound_command.clone())));
        }

        let repo = EventRepository::open(storage.clone());
        Self {
            shared: Arc::new(EngineShared {
                repo: Mutex::new(repo),
                callbacks: Mutex::new(Vec::new()),
                sinks,
                window_secs: config.scheduler.window_secs,
            }),
            storage,
            tick_period: Duration::from_secs(config.scheduler.tick_secs),
            ticker: None,
            watcher: None,
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.storage.path().to_path_buf()
    }

    /// Spawn the periodic ticker and the store watcher.
    pub fn start(&mut self) -> Result<()> {
        if self.ticker.is_some() {
            return Ok(());
        }

        let for_tick = Arc::clone(&self.shared);
        self.ticker = Some(Ticker::spawn(self.tick_period, move || {
            for_tick.run_tick();
        }));

        let for_sync = Arc::clone(&self.shared);
        let storage = self.storage.clone();
        self.watcher = Some(StoreWatcher::spawn(
            self.storage.path(),
            Duration::from_millis(WATCH_DEBOUNCE_MS),
            move || {
                let raw = storage.read_raw();
                for_sync.apply_external(raw.as_deref());
            },
        )?);

        info!(
            store = %self.storage.path().display(),
            tick_secs = self.tick_period.as_secs(),
            "reminder engine started"
        );
        Ok(())
    }

    /// Stop ticker and watcher as a pair. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
    }

    /// Events in insertion order. Display sorting is the caller's concern.
    pub fn list_events(&self) -> Vec<Event> {
        self.shared.repo().all().to_vec()
    }

    /// Validate and insert a new event; returns the stored form.
    pub fn create_event(&self, draft: EventDraft) -> Result<Event> {
        draft.validate()?;
        Ok(self.shared.repo().add(draft))
    }

    /// Apply a validated patch to the matching event. An unknown id is a
    /// silent no-op.
    pub fn edit_event(&self, id: i64, patch: &EventPatch) -> Result<()> {
        patch.validate()?;
        self.shared.repo().update(id, patch);
        Ok(())
    }

    pub fn delete_event(&self, id: i64) {
        self.shared.repo().remove(id);
    }

    pub fn toggle_complete(&self, id: i64) {
        self.shared.repo().toggle_completed(id);
    }

    /// Register a handler invoked once per alert-worthy event per window.
    pub fn on_reminder_due(&self, callback: impl Fn(&Event) + Send + Sync + 'static) {
        self.shared.callbacks().push(Arc::new(callback));
    }

    /// Direct entry point for cross-instance sync (the watcher uses the
    /// same path internally).
    pub fn on_store_changed_externally(&self, payload: Option<&str>) {
        self.shared.apply_external(payload);
    }

    /// Run one evaluation pass immediately, outside the periodic cadence.
    pub fn evaluate_now(&self) {
        self.shared.run_tick();
    }
}

impl Drop for ReminderEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
