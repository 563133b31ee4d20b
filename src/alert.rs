//! Best-effort alert side-channels.
//!
//! When a reminder fires, the engine attempts a desktop notification and a
//! short audio cue. Both are strictly optional: a missing command, denied
//! permission, or failed spawn is logged by the caller and never blocks
//! the in-process reminder-due signal.
//!
//! Delivery shells out to user-configurable commands instead of binding a
//! notification library: the host environments differ too much, and a
//! spawned `notify-send` is the lowest common denominator on Linux
//! desktops. Children are reaped on a detached thread so a tick never
//! waits on them.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use crate::error::{Error, Result};
use crate::event::Event;

/// Summary line used for every desktop notification.
pub const NOTIFICATION_SUMMARY: &str = "Event Reminder";

/// One delivery channel for a fired reminder.
pub trait AlertSink {
    fn alert(&self, event: &Event) -> Result<()>;

    /// Short name for log lines.
    fn name(&self) -> &'static str;
}

/// Desktop notification via a spawned notifier command.
///
/// The command receives the fixed summary and the event title as its two
/// arguments, matching `notify-send SUMMARY BODY`.
pub struct DesktopNotifier {
    command: String,
}

impl DesktopNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl AlertSink for DesktopNotifier {
    fn alert(&self, event: &Event) -> Result<()> {
        let child = Command::new(&self.command)
            .arg(NOTIFICATION_SUMMARY)
            .arg(&event.title)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| Error::AlertFailed(format!("{}: {err}", self.command)))?;
        reap_detached(child);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "desktop"
    }
}

/// Short audio cue: a configured sound command, or the terminal bell when
/// none is set.
pub struct SoundCue {
    command: Option<String>,
}

impl SoundCue {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl AlertSink for SoundCue {
    fn alert(&self, _event: &Event) -> Result<()> {
        match &self.command {
            Some(command) => {
                let child = Command::new(command)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .map_err(|err| Error::AlertFailed(format!("{command}: {err}")))?;
                reap_detached(child);
                Ok(())
            }
            None => {
                let mut out = std::io::stdout();
                out.write_all(b"\x07")
                    .and_then(|_| out.flush())
                    .map_err(|err| Error::AlertFailed(format!("bell: {err}")))?;
                Ok(())
            }
        }
    }

    fn name(&self) -> &'static str {
        "sound"
    }
}

fn reap_detached(mut child: std::process::Child) {
    thread::spawn(move || {
        let _ = child.wait();
    });
}
