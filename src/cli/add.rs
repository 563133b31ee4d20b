//! nudge add command implementation

use crate::error::Result;
use crate::event::{Event, EventDraft};
use crate::feed::{FeedKind, FeedRecord};
use crate::output::{emit_success, HumanOutput};

use super::CommandContext;

#[derive(serde::Serialize)]
struct AddReport {
    event: Event,
}

pub fn run(
    context: &mut CommandContext,
    title: String,
    description: String,
    date: String,
    time: String,
) -> Result<()> {
    let draft = EventDraft::new(title, description, date, time);
    let event = context.engine.create_event(draft)?;

    if let Some(feed) = context.feed.as_mut() {
        feed.emit(&FeedRecord::new(FeedKind::EventCreated).with_event(&event))?;
    }

    let mut human = HumanOutput::new(format!("added event {}", event.id));
    human.push_summary("title", event.title.clone());
    human.push_summary("when", format!("{} {}", event.date, event.time));
    if !event.description.is_empty() {
        human.push_summary("description", event.description.clone());
    }

    emit_success(
        context.options,
        "add",
        &AddReport { event },
        Some(&human),
    )
}
