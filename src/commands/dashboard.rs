use anyhow::Result;
use owo_colors::OwoColorize;
use sartrack_core::calendar::{overdue, upcoming};
use sartrack_core::dashboard::{organization_performance, overview};

use crate::commands::{Session, open_deadline_events, print_empty};
use crate::render::Render;

/// Number of upcoming deadlines listed under the counts
const DASHBOARD_UPCOMING: usize = 5;

pub async fn run(session: &Session) -> Result<()> {
    let book = session.load_cases().await?;

    if book.cases.is_empty() {
        print_empty("No cases yet");
        return Ok(());
    }

    println!("{}", format!("SAR overview as of {}", session.today.format("%a %b %-d %Y")).bold());
    println!("{}", overview(&book.cases, session.today).render());

    let events = open_deadline_events(&book.cases, session.today);

    let late = overdue(&events);
    if !late.is_empty() {
        println!();
        println!("{}", "Overdue".red().bold());
        for event in &late {
            println!("  {}", event.render());
        }
    }

    let next = upcoming(&events, session.today, DASHBOARD_UPCOMING);
    if !next.is_empty() {
        println!();
        println!("{}", "Coming up".bold());
        for event in &next {
            println!("  {}", event.render());
        }
    }

    println!();
    println!("{}", "Organizations".bold());
    for row in organization_performance(&book.cases, session.today) {
        println!("  {}", row.render());
    }

    Ok(())
}
