//! In-memory event repository.
//!
//! The authoritative collection for a running instance. Insertion order is
//! preserved; date ordering is a presentation concern. Every mutation
//! writes the full collection through to storage synchronously; a failed
//! write is logged and otherwise ignored, since the in-memory state stays
//! authoritative for the session.

use tracing::{debug, warn};

use crate::event::{now_millis, Event, EventDraft, EventPatch};
use crate::storage::EventStorage;
use crate::tracker::NotificationTracker;

#[derive(Debug)]
pub struct EventRepository {
    events: Vec<Event>,
    storage: EventStorage,
    tracker: NotificationTracker,
}

impl EventRepository {
    /// Load the durable collection and take ownership of it.
    pub fn open(storage: EventStorage) -> Self {
        let events = storage.load();
        Self {
            events,
            storage,
            tracker: NotificationTracker::new(),
        }
    }

    pub fn storage(&self) -> &EventStorage {
        &self.storage
    }

    pub fn tracker(&self) -> &NotificationTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut NotificationTracker {
        &mut self.tracker
    }

    /// All events in insertion order.
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    pub fn find(&self, id: i64) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Insert a new event built from a validated draft. Ids are epoch
    /// milliseconds, bumped past the highest existing id so concurrent
    /// same-millisecond creations within one instance stay unique.
    pub fn add(&mut self, draft: EventDraft) -> Event {
        let now = now_millis();
        let max_id = self.events.iter().map(|event| event.id).max().unwrap_or(0);
        let event = Event {
            id: now.max(max_id + 1),
            title: draft.title,
            description: draft.description,
            date: draft.date,
            time: draft.time,
            completed: false,
            created_at: now,
        };
        self.events.push(event.clone());
        self.persist();
        event
    }

    /// Replace fields of the event matching `id`. An unknown id is a
    /// silent no-op; `id` and `created_at` are never touched.
    pub fn update(&mut self, id: i64, patch: &EventPatch) {
        let Some(event) = self.events.iter_mut().find(|event| event.id == id) else {
            debug!(id, "update of unknown event id, ignoring");
            return;
        };
        if patch.apply(event) {
            self.persist();
        }
    }

    /// Delete the event matching `id` and drop its tracker state, so a
    /// future event reusing the id can alert independently.
    pub fn remove(&mut self, id: i64) {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        if self.events.len() != before {
            self.tracker.forget(id);
            self.persist();
        }
    }

    /// Flip completion. The id is marked fired either way: a just-completed
    /// event must never retroactively alert, and reopening does not re-arm
    /// it within this process.
    pub fn toggle_completed(&mut self, id: i64) {
        let Some(event) = self.events.iter_mut().find(|event| event.id == id) else {
            debug!(id, "toggle of unknown event id, ignoring");
            return;
        };
        event.completed = !event.completed;
        self.tracker.mark_fired(id);
        self.persist();
    }

    /// Wholesale replacement from cross-instance sync. Last writer wins; no
    /// merge. The tracker is left untouched (fired ids stay fired), and no
    /// save happens: the external writer already owns the durable copy.
    pub fn replace_all(&mut self, events: Vec<Event>) {
        self.events = events;
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save(&self.events) {
            warn!(%err, "event store write failed, in-memory state kept");
        }
    }
}
