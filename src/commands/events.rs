use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use sartrack_core::date_range::DateRange;

use crate::commands::{Session, print_empty};
use crate::render::Render;

pub async fn run(
    session: &Session,
    from: Option<String>,
    to: Option<String>,
    auto_reminders: bool,
) -> Result<()> {
    let range = DateRange::from_args(from.as_deref(), to.as_deref(), session.today)?;
    let events = session
        .source
        .range_events(range, session.today, auto_reminders)
        .await?;

    if events.is_empty() {
        print_empty("No events found");
        return Ok(());
    }

    // Group events by day and print
    let mut current_date: Option<NaiveDate> = None;

    for event in &events {
        if current_date != Some(event.date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(event.date, session.today).bold());
            current_date = Some(event.date);
        }

        println!("  {} {}", event.event_type.label().dimmed(), event.render());
    }

    Ok(())
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}
