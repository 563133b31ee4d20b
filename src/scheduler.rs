//! Reminder scheduling: periodic evaluation of the event collection.
//!
//! The engine polls on a coarse fixed period (10 s) rather than arming one
//! timer per event. With a ±60 s capture window every event is observed by
//! several ticks while inside the window, so detection survives scheduling
//! jitter, and the failure model stays trivial.
//!
//! `collect_due` is one evaluation pass; `Ticker` is the cancelable
//! periodic thread that drives it.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::event::Event;
use crate::repository::EventRepository;

/// Default evaluation period, seconds.
pub const DEFAULT_TICK_SECS: u64 = 10;

/// Default half-width of the alert window, seconds. An event fires from
/// `window` before its scheduled instant to `window` after it, inclusive.
pub const DEFAULT_WINDOW_SECS: i64 = 60;

/// One evaluation pass over the repository.
///
/// Walks events in insertion order; skips completed and already-fired ones;
/// an event whose scheduled instant lies within ±`window_secs` of `now`
/// (boundaries inclusive) is marked fired and collected. A malformed
/// date/time skips that event only; one bad entry never aborts the pass.
pub fn collect_due(
    repo: &mut EventRepository,
    now: DateTime<Local>,
    window_secs: i64,
) -> Vec<Event> {
    let mut due = Vec::new();

    let candidates: Vec<Event> = repo
        .all()
        .iter()
        .filter(|event| !event.completed && !repo.tracker().has_fired(event.id))
        .cloned()
        .collect();

    for event in candidates {
        let scheduled = match event.scheduled_at() {
            Ok(scheduled) => scheduled,
            Err(err) => {
                warn!(id = event.id, %err, "skipping event this tick");
                continue;
            }
        };

        let delta_ms = scheduled.signed_duration_since(now).num_milliseconds();
        if delta_ms.abs() <= window_secs * 1000 {
            debug!(id = event.id, delta_ms, "event entered alert window");
            repo.tracker_mut().mark_fired(event.id);
            due.push(event);
        }
    }

    due
}

/// A background thread invoking a closure on a fixed period until stopped.
///
/// The loop sleeps on a channel: a timeout is a tick, a message or a
/// disconnect ends the loop. `stop` joins the thread, so no tick can run
/// against torn-down state afterwards; dropping the ticker stops it too.
pub struct Ticker {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(period: Duration, mut tick: impl FnMut() + Send + 'static) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => tick(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDraft;
    use crate::repository::EventRepository;
    use crate::storage::{EventStorage, STORE_FILE};
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    // A fixed instant far from any DST transition, used as the scheduled
    // moment; ticks are derived by offsetting it.
    const DATE: &str = "2099-06-15";
    const TIME: &str = "12:00";

    fn repo_with_event(dir: &TempDir) -> (EventRepository, i64, DateTime<Local>) {
        let mut repo = EventRepository::open(EventStorage::new(dir.path().join(STORE_FILE)));
        let event = repo.add(EventDraft::new("lunch", "", DATE, TIME));
        let scheduled = event.scheduled_at().unwrap();
        (repo, event.id, scheduled)
    }

    #[test]
    fn window_is_symmetric_and_inclusive() {
        for (offset_secs, expected) in [
            (-61, false),
            (-60, true),
            (0, true),
            (60, true),
            (61, false),
        ] {
            let temp = TempDir::new().unwrap();
            let (mut repo, _, scheduled) = repo_with_event(&temp);
            let now = scheduled + ChronoDuration::seconds(offset_secs);
            let due = collect_due(&mut repo, now, DEFAULT_WINDOW_SECS);
            assert_eq!(
                !due.is_empty(),
                expected,
                "tick at scheduled{offset_secs:+}s"
            );
        }
    }

    #[test]
    fn fires_at_most_once_across_ticks() {
        let temp = TempDir::new().unwrap();
        let (mut repo, id, scheduled) = repo_with_event(&temp);

        let first = collect_due(&mut repo, scheduled, DEFAULT_WINDOW_SECS);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, id);

        // Every later tick inside the same window stays silent.
        for offset in [10, 30, 60] {
            let now = scheduled + ChronoDuration::seconds(offset);
            assert!(collect_due(&mut repo, now, DEFAULT_WINDOW_SECS).is_empty());
        }
    }

    #[test]
    fn completed_events_never_fire() {
        let temp = TempDir::new().unwrap();
        let (mut repo, id, scheduled) = repo_with_event(&temp);

        repo.toggle_completed(id);
        assert!(collect_due(&mut repo, scheduled, DEFAULT_WINDOW_SECS).is_empty());
    }

    #[test]
    fn malformed_event_does_not_abort_the_tick() {
        let temp = TempDir::new().unwrap();
        let mut repo = EventRepository::open(EventStorage::new(temp.path().join(STORE_FILE)));

        // A malformed entry ahead of a valid one, as a hostile store could
        // contain. Insertion order: bad first.
        let bad = crate::event::Event {
            id: 1,
            title: "bad".to_string(),
            description: String::new(),
            date: "junk".to_string(),
            time: "junk".to_string(),
            completed: false,
            created_at: 0,
        };
        repo.replace_all(vec![bad]);
        let good = repo.add(EventDraft::new("good", "", DATE, TIME));
        let scheduled = good.scheduled_at().unwrap();

        let due = collect_due(&mut repo, scheduled, DEFAULT_WINDOW_SECS);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, good.id);

        // The malformed entry is skipped, not consumed: it stays unfired.
        assert!(!repo.tracker().has_fired(1));
    }

    #[test]
    fn past_events_outside_window_stay_silent() {
        let temp = TempDir::new().unwrap();
        let (mut repo, _, scheduled) = repo_with_event(&temp);

        let now = scheduled + ChronoDuration::hours(3);
        assert!(collect_due(&mut repo, now, DEFAULT_WINDOW_SECS).is_empty());
    }

    #[test]
    fn ticker_ticks_and_stops() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();

        let mut ticker = Ticker::spawn(Duration::from_millis(10), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        std::thread::sleep(Duration::from_millis(100));
        ticker.stop();
        let ticks = count.load(Ordering::SeqCst);
        assert!(ticks >= 2, "expected a few ticks, got {ticks}");

        // No ticks after stop.
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), ticks);
    }
}
