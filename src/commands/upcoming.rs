use anyhow::Result;
use sartrack_core::calendar::upcoming;

use crate::commands::{Session, open_deadline_events, print_empty};
use crate::render::Render;

pub async fn run(session: &Session, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(session.config.upcoming_limit);
    let book = session.load_cases().await?;

    let events = open_deadline_events(&book.cases, session.today);
    let next = upcoming(&events, session.today, limit);

    if next.is_empty() {
        print_empty("No upcoming deadlines");
        return Ok(());
    }

    for event in &next {
        println!("{}", event.render());
    }

    Ok(())
}
