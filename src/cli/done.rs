//! nudge done command implementation
//!
//! Toggles completion. Completing an event also suppresses any pending
//! reminder for it; reopening does not re-arm one.

use crate::error::Result;
use crate::event::Event;
use crate::feed::{FeedKind, FeedRecord};
use crate::output::{emit_success, HumanOutput};

use super::CommandContext;

#[derive(serde::Serialize)]
struct DoneReport {
    id: i64,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

pub fn run(context: &mut CommandContext, id: i64) -> Result<()> {
    context.engine.toggle_complete(id);

    let event: Option<Event> = context
        .engine
        .list_events()
        .into_iter()
        .find(|event| event.id == id);

    if let (Some(feed), Some(event)) = (context.feed.as_mut(), event.as_ref()) {
        let kind = if event.completed {
            FeedKind::EventCompleted
        } else {
            FeedKind::EventReopened
        };
        feed.emit(&FeedRecord::new(kind).with_event(event))?;
    }

    let human = match &event {
        Some(event) if event.completed => {
            HumanOutput::new(format!("completed event {id}: {}", event.title))
        }
        Some(event) => HumanOutput::new(format!("reopened event {id}: {}", event.title)),
        None => {
            let mut human = HumanOutput::new(format!("event {id} not found"));
            human.push_notice("nothing was changed");
            human
        }
    };

    emit_success(
        context.options,
        "done",
        &DoneReport {
            id,
            found: event.is_some(),
            completed: event.map(|event| event.completed),
        },
        Some(&human),
    )
}
