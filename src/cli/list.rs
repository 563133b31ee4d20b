//! nudge list command implementation

use crate::error::Result;
use crate::event::{sort_for_display, Event};
use crate::output::{emit_success, HumanOutput};

use super::CommandContext;

#[derive(serde::Serialize)]
struct ListReport {
    count: usize,
    events: Vec<Event>,
}

pub fn run(context: &CommandContext, all: bool) -> Result<()> {
    let mut events = context.engine.list_events();
    if !all {
        events.retain(|event| !event.completed);
    }
    sort_for_display(&mut events);

    let header = match (events.len(), all) {
        (0, false) => "no pending events".to_string(),
        (0, true) => "no events".to_string(),
        (n, false) => format!("{n} pending event(s)"),
        (n, true) => format!("{n} event(s)"),
    };

    let mut human = HumanOutput::new(header);
    for event in &events {
        let marker = if event.completed { "x" } else { " " };
        let mut line = format!(
            "[{marker}] {} {}  {}  (id {})",
            event.date, event.time, event.title, event.id
        );
        if !event.description.is_empty() {
            line.push_str(&format!(" - {}", event.description));
        }
        human.push_detail(line);
    }

    emit_success(
        context.options,
        "list",
        &ListReport {
            count: events.len(),
            events,
        },
        Some(&human),
    )
}
