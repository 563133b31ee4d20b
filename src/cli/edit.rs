//! nudge edit command implementation

use crate::error::{Error, Result};
use crate::event::{Event, EventPatch};
use crate::feed::{FeedKind, FeedRecord};
use crate::output::{emit_success, HumanOutput};

use super::CommandContext;

#[derive(serde::Serialize)]
struct EditReport {
    id: i64,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<Event>,
}

pub fn run(context: &mut CommandContext, id: i64, patch: EventPatch) -> Result<()> {
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to edit: pass at least one of --title/--description/--date/--time".to_string(),
        ));
    }

    let found = context.engine.list_events().iter().any(|event| event.id == id);
    context.engine.edit_event(id, &patch)?;

    let event = context
        .engine
        .list_events()
        .into_iter()
        .find(|event| event.id == id);

    if found {
        if let (Some(feed), Some(event)) = (context.feed.as_mut(), event.as_ref()) {
            feed.emit(&FeedRecord::new(FeedKind::EventEdited).with_event(event))?;
        }
    }

    let mut human = if found {
        let mut human = HumanOutput::new(format!("edited event {id}"));
        if let Some(event) = &event {
            human.push_summary("title", event.title.clone());
            human.push_summary("when", format!("{} {}", event.date, event.time));
        }
        human
    } else {
        HumanOutput::new(format!("event {id} not found"))
    };
    if !found {
        human.push_notice("nothing was changed");
    }

    emit_success(
        context.options,
        "edit",
        &EditReport { id, found, event },
        Some(&human),
    )
}
