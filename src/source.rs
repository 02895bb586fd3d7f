//! Where cases come from: a local JSON file or the backend.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sartrack_core::calendar::{build_range_events, reminder_events};
use sartrack_core::config::Config;
use sartrack_core::dashboard::{self, DeadlineSummary};
use sartrack_core::date_range::DateRange;
use sartrack_core::ingest::{self, CaseBook};
use sartrack_core::reminder::automatic_reminders;
use sartrack_core::CalendarEvent;
use tracing::debug;

use crate::client::Client;

pub enum CaseSource {
    /// Local mode: a JSON case file
    Local(PathBuf),
    /// Online mode: the SAR tracker backend
    Online(Client),
}

impl CaseSource {
    /// Pick a source: command-line flags first, then config.
    pub fn resolve(
        file: Option<PathBuf>,
        api_url: Option<String>,
        config: &Config,
    ) -> Result<Self> {
        if let Some(path) = file {
            return Ok(CaseSource::Local(path));
        }

        if let Some(url) = api_url {
            return Ok(CaseSource::Online(Client::new(&url, config.api_token.clone())?));
        }

        if let Some(path) = config.cases_path() {
            return Ok(CaseSource::Local(path));
        }

        if let Some(url) = &config.api_url {
            return Ok(CaseSource::Online(Client::new(url, config.api_token.clone())?));
        }

        anyhow::bail!(
            "No case source configured.\n\n\
            Point sartrack at a case file or a backend:\n  \
            sartrack --file cases.json upcoming\n  \
            sartrack --api http://localhost:8000 upcoming\n\n\
            or set cases_file / api_url in the config file (see `sartrack init-config`)."
        )
    }

    /// All cases (and, in local mode, reminders), validated.
    pub async fn case_book(&self) -> Result<CaseBook> {
        match self {
            CaseSource::Local(path) => CaseBook::load(path)
                .with_context(|| format!("Could not load case file {}", path.display())),
            CaseSource::Online(client) => {
                let rows = client.list_cases().await?;
                let cases = ingest::ingest_cases(&rows);

                Ok(CaseBook {
                    rejected: cases.rejected.len(),
                    cases: cases.records,
                    reminders: Vec::new(),
                })
            }
        }
    }

    /// Events within `range`. Online, the backend's own calendar is used when
    /// it has one; otherwise events are rebuilt from the case list.
    pub async fn range_events(
        &self,
        range: DateRange,
        today: NaiveDate,
        with_auto_reminders: bool,
    ) -> Result<Vec<CalendarEvent>> {
        if let CaseSource::Online(client) = self {
            if let Some(rows) = client.calendar_rows(range).await? {
                if !rows.is_empty() {
                    let mut events = ingest::ingest_remote_events(&rows, today).records;

                    // The backend stores no automatic reminders; derive them from the cases
                    if with_auto_reminders {
                        let book = self.case_book().await?;
                        let reminders = automatic_reminders(&book.cases, today);
                        events.extend(reminder_events(&reminders, &book.cases, range, today));
                        events.sort_by_key(|e| e.date);
                    }

                    return Ok(events);
                }
            }
            debug!("No pre-aggregated calendar events, rebuilding from cases");
        }

        let book = self.case_book().await?;
        let mut reminders = book.reminders;
        if with_auto_reminders {
            reminders.extend(automatic_reminders(&book.cases, today));
        }

        Ok(build_range_events(&book.cases, &reminders, range, today))
    }

    /// Deadline summary rows, preferring the backend's `/dashboard/deadlines`.
    pub async fn deadlines(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<DeadlineSummary>> {
        if let CaseSource::Online(client) = self {
            if let Some(rows) = client.deadline_rows(window_days).await? {
                if !rows.is_empty() {
                    let mut summaries = ingest::ingest_deadline_rows(&rows, today).records;
                    summaries.sort_by_key(|row| row.deadline_date);
                    return Ok(summaries);
                }
            }
            debug!("No pre-aggregated deadlines, rebuilding from cases");
        }

        let book = self.case_book().await?;
        Ok(dashboard::upcoming_deadlines(&book.cases, today, window_days))
    }
}
