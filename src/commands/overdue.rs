use anyhow::Result;
use sartrack_core::calendar::overdue;

use crate::commands::{Session, open_deadline_events, print_empty};
use crate::render::Render;

pub async fn run(session: &Session) -> Result<()> {
    let book = session.load_cases().await?;
    let late = overdue(&open_deadline_events(&book.cases, session.today));

    if late.is_empty() {
        print_empty("Nothing overdue");
        return Ok(());
    }

    for event in &late {
        println!("{}", event.render());
    }

    Ok(())
}
