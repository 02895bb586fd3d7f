pub mod calendar;
pub mod dashboard;
pub mod deadlines;
pub mod events;
pub mod init_config;
pub mod overdue;
pub mod upcoming;

use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use sartrack_core::calendar::build_events;
use sartrack_core::config::Config;
use sartrack_core::ingest::CaseBook;
use sartrack_core::{CalendarEvent, CaseRecord};

use crate::source::CaseSource;

/// Everything a command needs: where cases come from, and what day it is.
pub struct Session {
    pub source: CaseSource,
    pub config: Config,
    pub today: NaiveDate,
}

impl Session {
    /// Load the case book, mentioning any records that were skipped.
    pub async fn load_cases(&self) -> Result<CaseBook> {
        let book = self.source.case_book().await?;

        if book.rejected > 0 {
            let noun = if book.rejected == 1 { "record" } else { "records" };
            eprintln!("{}", format!("Skipped {} malformed {}", book.rejected, noun).dimmed());
        }

        Ok(book)
    }
}

/// Neutral message for an empty result
pub fn print_empty(message: &str) {
    println!("{}", message.dimmed());
}

/// Deadline events for the cases still waiting on a response.
/// Finished or escalated cases owe nothing and stay off the lists.
pub fn open_deadline_events(cases: &[CaseRecord], today: NaiveDate) -> Vec<CalendarEvent> {
    let open: Vec<CaseRecord> = cases
        .iter()
        .filter(|case| case.status.is_open())
        .cloned()
        .collect();

    build_events(&open, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sartrack_core::calendar::{overdue, upcoming};
    use sartrack_core::ingest::ingest_cases;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_closed_cases_stay_off_deadline_lists() {
        let cases = ingest_cases(&[
            json!({"id": 1, "organization_name": "Acme", "case_reference": "SAR-1",
                   "submission_date": "2025-04-03", "statutory_deadline": "2025-05-01",
                   "status": "Complete"}),
            json!({"id": 2, "organization_name": "Globex", "case_reference": "SAR-2",
                   "submission_date": "2025-05-23", "statutory_deadline": "2025-06-20",
                   "status": "Escalated"}),
            json!({"id": 3, "organization_name": "Initech", "case_reference": "SAR-3",
                   "submission_date": "2025-05-04", "statutory_deadline": "2025-06-01",
                   "status": "Pending"}),
            json!({"id": 4, "organization_name": "Umbrella", "case_reference": "SAR-4",
                   "submission_date": "2025-05-20", "statutory_deadline": "2025-06-17",
                   "status": "Overdue"}),
        ])
        .records;
        let today = d(2025, 6, 10);

        let events = open_deadline_events(&cases, today);
        let titles = |events: &[CalendarEvent]| -> Vec<String> {
            events.iter().map(|e| e.title.clone()).collect()
        };

        assert_eq!(titles(&overdue(&events)), vec!["Deadline: SAR-3"]);
        assert_eq!(titles(&upcoming(&events, today, 10)), vec!["Deadline: SAR-4"]);
    }
}
