//! nudge watch command implementation
//!
//! Runs the engine in the foreground: the periodic scheduler plus the
//! store watcher, printing each reminder as it fires. Stops after
//! `--duration` seconds, or runs until the process is interrupted.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::Result;
use crate::feed::{FeedKind, FeedRecord, FeedSink};
use crate::output::{format_human, HumanOutput};

use super::CommandContext;

pub fn run(mut context: CommandContext, duration: Option<u64>) -> Result<()> {
    let options = context.options;
    let feed: Arc<Mutex<Option<FeedSink>>> = Arc::new(Mutex::new(context.feed.take()));

    let feed_for_callback = Arc::clone(&feed);
    context.engine.on_reminder_due(move |event| {
        if !options.quiet {
            println!(
                "REMINDER  {} {}  {}  (id {})",
                event.date, event.time, event.title, event.id
            );
        }
        let mut feed = feed_for_callback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(sink) = feed.as_mut() {
            if let Err(err) = sink.emit(&FeedRecord::new(FeedKind::ReminderDue).with_event(event)) {
                tracing::warn!(%err, "feed emission failed");
            }
        }
    });

    if !options.quiet && !options.json {
        let mut human = HumanOutput::new("watching for reminders");
        human.push_summary("store", context.engine.store_path().display().to_string());
        match duration {
            Some(secs) => human.push_summary("duration", format!("{secs}s")),
            None => human.push_summary("stop", "Ctrl-C"),
        }
        println!("{}", format_human(&human));
    }

    context.engine.start()?;
    // Catch events already inside their window before the first tick.
    context.engine.evaluate_now();

    match duration {
        Some(secs) => std::thread::sleep(Duration::from_secs(secs)),
        None => loop {
            std::thread::sleep(Duration::from_secs(3600));
        },
    }

    context.engine.shutdown();
    Ok(())
}
