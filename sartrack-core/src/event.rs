//! Derived calendar types.
//!
//! Nothing here is persisted. Events and days are rebuilt from case records
//! on every call, so they carry no identity beyond the current computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::case::DeadlineKind;
use crate::deadline::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Deadline,
    Reminder,
    Followup,
    IcoDeadline,
    CaseCreation,
}

/// Something that happens on a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub event_type: EventType,

    // Link back to the originating case
    pub case_id: Option<String>,
    pub case_reference: Option<String>,
    pub organization_name: Option<String>,
    /// Set on deadline events only
    pub deadline_kind: Option<DeadlineKind>,

    // Urgency, relative to the "today" the event was built with
    pub is_overdue: bool,
    pub days_remaining: i64,
    pub priority: Priority,
}

/// One cell of a month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub events: Vec<CalendarEvent>,
    pub is_current_month: bool,
    pub is_today: bool,
}

impl EventType {
    /// Parse the labels used by the backend's `/calendar/events` rows.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "deadline" => Some(EventType::Deadline),
            "reminder" | "custom" => Some(EventType::Reminder),
            "followup" => Some(EventType::Followup),
            "icodeadline" => Some(EventType::IcoDeadline),
            "casecreation" => Some(EventType::CaseCreation),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventType::Deadline => "deadline",
            EventType::Reminder => "reminder",
            EventType::Followup => "follow-up",
            EventType::IcoDeadline => "ICO deadline",
            EventType::CaseCreation => "created",
        }
    }
}
