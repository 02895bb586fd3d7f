//! TUI rendering traits for sartrack types.
//!
//! Extension traits that add colored terminal rendering to sartrack-core
//! types using owo_colors.

use chrono::{Datelike, NaiveDate};
use owo_colors::OwoColorize;
use sartrack_core::dashboard::{DashboardOverview, DeadlineSummary, OrganizationPerformance};
use sartrack_core::{CalendarDay, CalendarEvent, EventType, Priority};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Colorize text according to priority
fn colorize_priority(priority: Priority, text: &str) -> String {
    match priority {
        Priority::High => text.red().to_string(),
        Priority::Medium => text.yellow().to_string(),
        Priority::Low => text.green().to_string(),
    }
}

impl Render for Priority {
    fn render(&self) -> String {
        let badge = format!("{:<6}", self.to_string());
        colorize_priority(*self, &badge)
    }
}

/// "due today", "in 3 days", "2 days overdue"
pub fn days_label(days: i64) -> String {
    match days {
        0 => "due today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "1 day overdue".to_string(),
        d if d < 0 => format!("{} days overdue", -d),
        d => format!("in {} days", d),
    }
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let org = self
            .organization_name
            .as_deref()
            .map(|o| format!("[{}]", o))
            .unwrap_or_default();

        let when = match self.event_type {
            EventType::CaseCreation => self.date.format("%a %b %-d").to_string(),
            _ if self.is_overdue => days_label(self.days_remaining).red().bold().to_string(),
            _ => days_label(self.days_remaining),
        };

        format!(
            "{} {} {} {} {}",
            self.priority.render(),
            self.date.format("%Y-%m-%d").dimmed(),
            self.title,
            org.dimmed(),
            when
        )
    }
}

impl Render for DeadlineSummary {
    fn render(&self) -> String {
        let when = days_label(self.days_remaining);
        let when = if self.is_overdue {
            when.red().bold().to_string()
        } else {
            when
        };

        format!(
            "{} {:<16} {} {} {}",
            self.deadline_date.format("%Y-%m-%d").dimmed(),
            self.case_reference,
            self.organization_name,
            format!("({})", self.deadline_kind).dimmed(),
            when
        )
    }
}

impl Render for DashboardOverview {
    fn render(&self) -> String {
        let rows = [
            ("Total cases", self.total_cases.to_string()),
            ("Pending", self.pending_cases.to_string()),
            ("Responded", self.responded_cases.to_string()),
            ("Overdue", self.overdue_cases.to_string().red().to_string()),
            ("Complete", self.completed_cases.to_string().green().to_string()),
            ("Escalated", self.escalated_cases.to_string().yellow().to_string()),
            ("Upcoming deadlines", self.upcoming_deadlines.to_string()),
            ("Missed deadlines", self.overdue_deadlines.to_string().red().to_string()),
        ];

        rows.iter()
            .map(|(label, value)| format!("  {:<20} {}", label.dimmed(), value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Compliance at or above this percentage is shown green
const GOOD_COMPLIANCE: f64 = 80.0;
/// Compliance below this percentage is shown red
const POOR_COMPLIANCE: f64 = 50.0;

impl Render for OrganizationPerformance {
    fn render(&self) -> String {
        let rating = format!("{:>3.0}%", self.compliance_rating);
        let rating = if self.compliance_rating >= GOOD_COMPLIANCE {
            rating.green().to_string()
        } else if self.compliance_rating >= POOR_COMPLIANCE {
            rating.yellow().to_string()
        } else {
            rating.red().to_string()
        };

        let average = self
            .average_response_days
            .map(|days| format!("avg {:.1} days", days))
            .unwrap_or_else(|| "no responses".to_string());

        let ignored = if self.ignored > 0 {
            format!("{} ignored", self.ignored).red().to_string()
        } else {
            "0 ignored".to_string()
        };

        format!(
            "{} {:<24} {} SARs, {} on time, {} late, {} {}",
            rating,
            self.organization_name,
            self.total_sars,
            self.responded_on_time,
            self.responded_late,
            ignored,
            format!("({})", average).dimmed()
        )
    }
}

/// Most urgent priority among a day's events
fn day_priority(day: &CalendarDay) -> Option<Priority> {
    day.events.iter().map(|e| e.priority).min()
}

/// Month grid: a header, weekday labels, then one line per week.
/// Days with events are colored by their most urgent event.
pub fn render_month_grid(first_of_month: NaiveDate, days: &[CalendarDay]) -> String {
    let mut lines = vec![
        format!("{:^27}", first_of_month.format("%B %Y").to_string()).bold().to_string(),
        " Su  Mo  Tu  We  Th  Fr  Sa".dimmed().to_string(),
    ];

    for week in days.chunks(7) {
        let cells: Vec<String> = week
            .iter()
            .map(|day| {
                let marker = if day.events.is_empty() { ' ' } else { '*' };
                let cell = format!("{:>3}{}", day.date.day(), marker);

                let cell = match day_priority(day) {
                    Some(priority) if day.is_current_month => colorize_priority(priority, &cell),
                    _ if !day.is_current_month => cell.dimmed().to_string(),
                    _ => cell,
                };

                if day.is_today {
                    cell.reversed().to_string()
                } else {
                    cell
                }
            })
            .collect();
        lines.push(cells.join(""));
    }

    lines.join("\n")
}
