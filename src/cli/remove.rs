//! nudge remove command implementation

use crate::error::Result;
use crate::event::Event;
use crate::feed::{FeedKind, FeedRecord};
use crate::output::{emit_success, HumanOutput};

use super::CommandContext;

#[derive(serde::Serialize)]
struct RemoveReport {
    id: i64,
    removed: bool,
}

pub fn run(context: &mut CommandContext, id: i64) -> Result<()> {
    let removed: Option<Event> = context
        .engine
        .list_events()
        .into_iter()
        .find(|event| event.id == id);

    context.engine.delete_event(id);

    if let (Some(feed), Some(event)) = (context.feed.as_mut(), removed.as_ref()) {
        feed.emit(&FeedRecord::new(FeedKind::EventDeleted).with_event(event))?;
    }

    let mut human = if removed.is_some() {
        HumanOutput::new(format!("removed event {id}"))
    } else {
        HumanOutput::new(format!("event {id} not found"))
    };
    if removed.is_none() {
        human.push_notice("nothing was removed");
    }

    emit_success(
        context.options,
        "remove",
        &RemoveReport {
            id,
            removed: removed.is_some(),
        },
        Some(&human),
    )
}
