use anyhow::Result;

use crate::commands::{Session, print_empty};
use crate::render::Render;

pub async fn run(session: &Session, days: Option<i64>) -> Result<()> {
    let window = days.unwrap_or(session.config.deadline_window_days);
    let rows = session.source.deadlines(session.today, window).await?;

    if rows.is_empty() {
        print_empty(&format!("No open deadlines in the next {} days", window));
        return Ok(());
    }

    for row in &rows {
        println!("{}", row.render());
    }

    Ok(())
}
