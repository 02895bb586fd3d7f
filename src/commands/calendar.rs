use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use owo_colors::OwoColorize;
use sartrack_core::calendar::build_month_grid;
use sartrack_core::date_range::DateRange;

use crate::commands::{Session, open_deadline_events};
use crate::render::{Render, render_month_grid};

/// Print a month grid, then the events falling inside that month.
///
/// By default only deadlines of open cases are shown; `all` adds submissions and
/// reminders for the weeks on screen.
pub async fn run(
    session: &Session,
    month: Option<(i32, u32)>,
    all: bool,
    auto_reminders: bool,
) -> Result<()> {
    let (year, month) = month.unwrap_or((session.today.year(), session.today.month()));

    // Validate before fetching anything
    let grid = build_month_grid(year, month, &[], session.today)?;
    let (Some(first_cell), Some(last_cell)) = (grid.first(), grid.last()) else {
        return Ok(());
    };
    let span = DateRange::new(first_cell.date, last_cell.date);

    let events = if all {
        session.source.range_events(span, session.today, auto_reminders).await?
    } else {
        let book = session.load_cases().await?;
        open_deadline_events(&book.cases, session.today)
    };

    let grid = build_month_grid(year, month, &events, session.today)?;
    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first_cell.date);

    println!("{}", render_month_grid(first_of_month, &grid));
    println!();

    let in_month: Vec<_> = grid
        .iter()
        .filter(|day| day.is_current_month)
        .flat_map(|day| day.events.iter())
        .collect();

    if in_month.is_empty() {
        println!("{}", "Nothing scheduled this month".dimmed());
        return Ok(());
    }

    for event in in_month {
        println!("{}", event.render());
    }

    Ok(())
}
