//! Reminders attached to cases.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::case::CaseRecord;
use crate::event::EventType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub case_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub reminder_date: NaiveDate,
    pub reminder_type: ReminderType,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderType {
    Deadline,
    FollowUp,
    IcoDeadline,
    Custom,
}

impl ReminderType {
    /// Parse "Deadline", "Follow-up", "ICO Deadline", "Custom".
    pub fn parse(s: &str) -> Option<Self> {
        match EventType::parse(s)? {
            EventType::Deadline => Some(ReminderType::Deadline),
            EventType::Followup => Some(ReminderType::FollowUp),
            EventType::IcoDeadline => Some(ReminderType::IcoDeadline),
            EventType::Reminder => Some(ReminderType::Custom),
            EventType::CaseCreation => None,
        }
    }

    /// Calendar event type a reminder of this kind renders as.
    pub fn event_type(&self) -> EventType {
        match self {
            ReminderType::FollowUp => EventType::Followup,
            ReminderType::IcoDeadline => EventType::IcoDeadline,
            ReminderType::Deadline | ReminderType::Custom => EventType::Reminder,
        }
    }
}

/// Deadline reminders for every open case: the day before the effective
/// deadline, or tomorrow when that day is already today or past.
pub fn automatic_reminders(cases: &[CaseRecord], today: NaiveDate) -> Vec<Reminder> {
    let tomorrow = today + Duration::days(1);

    cases
        .iter()
        .filter(|case| case.status.is_open())
        .map(|case| {
            let deadline = case.effective_deadline();
            let reminder_date = if deadline <= today {
                tomorrow
            } else {
                deadline - Duration::days(1)
            };

            Reminder {
                id: format!("auto_{}", case.id),
                case_id: Some(case.id.clone()),
                title: format!("SAR deadline: {}", case.case_reference),
                description: Some(format!(
                    "{} deadline for {} is {}",
                    case.deadline_kind(),
                    case.organization_name,
                    deadline
                )),
                reminder_date,
                reminder_type: ReminderType::Deadline,
                is_completed: false,
            }
        })
        .collect()
}
