//! Deadline and calendar aggregation.
//!
//! Every function here is pure: the case list and "today" go in, freshly
//! derived events or grid days come out. Calling twice with the same inputs
//! gives the same output.

use chrono::{Datelike, Duration, NaiveDate};

use crate::case::CaseRecord;
use crate::date_range::DateRange;
use crate::deadline::{Priority, days_remaining, derive_priority};
use crate::error::{SarError, SarResult};
use crate::event::{CalendarDay, CalendarEvent, EventType};
use crate::reminder::Reminder;

/// Six full weeks, so every month fits regardless of where it starts.
pub const GRID_DAYS: usize = 42;

/// Overdue flag, day count and priority of something dated `date`.
///
/// Case creation markers are history, not work: never overdue, always low.
pub(crate) fn urgency(
    date: NaiveDate,
    today: NaiveDate,
    event_type: EventType,
) -> (bool, i64, Priority) {
    let days = days_remaining(date, today);

    if event_type == EventType::CaseCreation {
        return (false, days, Priority::Low);
    }

    let is_overdue = date < today;
    (is_overdue, days, derive_priority(days, is_overdue))
}

/// The deadline event for a single case.
pub fn deadline_event(case: &CaseRecord, today: NaiveDate) -> CalendarEvent {
    let date = case.effective_deadline();
    let kind = case.deadline_kind();
    let (is_overdue, days_remaining, priority) = urgency(date, today, EventType::Deadline);

    CalendarEvent {
        id: format!("deadline_{}", case.id),
        title: format!("Deadline: {}", case.case_reference),
        description: Some(format!("{} deadline for {}", kind, case.organization_name)),
        date,
        event_type: EventType::Deadline,
        case_id: Some(case.id.clone()),
        case_reference: Some(case.case_reference.clone()),
        organization_name: Some(case.organization_name.clone()),
        deadline_kind: Some(kind),
        is_overdue,
        days_remaining,
        priority,
    }
}

/// One deadline event per case, in input order.
pub fn build_events(cases: &[CaseRecord], today: NaiveDate) -> Vec<CalendarEvent> {
    cases.iter().map(|case| deadline_event(case, today)).collect()
}

fn creation_event(case: &CaseRecord, today: NaiveDate) -> CalendarEvent {
    let date = case.submission_date;
    let (is_overdue, days_remaining, priority) = urgency(date, today, EventType::CaseCreation);

    CalendarEvent {
        id: format!("creation_{}", case.id),
        title: format!("SAR Created: {}", case.case_reference),
        description: Some(format!("SAR case submitted for {}", case.organization_name)),
        date,
        event_type: EventType::CaseCreation,
        case_id: Some(case.id.clone()),
        case_reference: Some(case.case_reference.clone()),
        organization_name: Some(case.organization_name.clone()),
        deadline_kind: None,
        is_overdue,
        days_remaining,
        priority,
    }
}

fn reminder_event(reminder: &Reminder, cases: &[CaseRecord], today: NaiveDate) -> CalendarEvent {
    let event_type = reminder.reminder_type.event_type();
    let (is_overdue, days_remaining, priority) = urgency(reminder.reminder_date, today, event_type);

    let case = reminder
        .case_id
        .as_deref()
        .and_then(|id| cases.iter().find(|c| c.id == id));

    CalendarEvent {
        id: format!("reminder_{}", reminder.id),
        title: format!("Reminder: {}", reminder.title),
        description: reminder.description.clone(),
        date: reminder.reminder_date,
        event_type,
        case_id: reminder.case_id.clone(),
        case_reference: case.map(|c| c.case_reference.clone()),
        organization_name: case.map(|c| c.organization_name.clone()),
        deadline_kind: None,
        is_overdue,
        days_remaining,
        priority,
    }
}

/// Events for outstanding reminders dated within `range`, linked to their
/// case when it is among `cases`.
pub fn reminder_events(
    reminders: &[Reminder],
    cases: &[CaseRecord],
    range: DateRange,
    today: NaiveDate,
) -> Vec<CalendarEvent> {
    reminders
        .iter()
        .filter(|r| !r.is_completed && range.contains(r.reminder_date))
        .map(|r| reminder_event(r, cases, today))
        .collect()
}

/// Everything that happens within `range`: deadlines of open cases,
/// case submissions, and outstanding reminders, sorted by date.
pub fn build_range_events(
    cases: &[CaseRecord],
    reminders: &[Reminder],
    range: DateRange,
    today: NaiveDate,
) -> Vec<CalendarEvent> {
    let deadlines = cases
        .iter()
        .filter(|case| case.status.is_open() && range.contains(case.effective_deadline()))
        .map(|case| deadline_event(case, today));

    let creations = cases
        .iter()
        .filter(|case| range.contains(case.submission_date))
        .map(|case| creation_event(case, today));

    let mut events: Vec<CalendarEvent> = deadlines.chain(creations).collect();
    events.extend(reminder_events(reminders, cases, range, today));
    events.sort_by_key(|e| e.date);
    events
}

/// A 6-week grid for `month` (1-12) of `year`, starting on the Sunday on or
/// before the 1st.
pub fn build_month_grid(
    year: i32,
    month: u32,
    events: &[CalendarEvent],
    today: NaiveDate,
) -> SarResult<Vec<CalendarDay>> {
    let invalid = || SarError::InvalidMonth { year, month };

    // The whole grid must be representable, not just the month itself
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let offset = first.weekday().num_days_from_sunday() as i64;
    let start = first
        .checked_sub_signed(Duration::days(offset))
        .ok_or_else(invalid)?;
    start
        .checked_add_signed(Duration::days(GRID_DAYS as i64 - 1))
        .ok_or_else(invalid)?;

    let grid = start
        .iter_days()
        .take(GRID_DAYS)
        .map(|date| CalendarDay {
            date,
            events: events.iter().filter(|e| e.date == date).cloned().collect(),
            is_current_month: date.month() == month && date.year() == year,
            is_today: date == today,
        })
        .collect();

    Ok(grid)
}

/// Not-yet-due events from `today` on, soonest first, at most `limit`.
pub fn upcoming(events: &[CalendarEvent], today: NaiveDate, limit: usize) -> Vec<CalendarEvent> {
    let mut upcoming: Vec<CalendarEvent> = events
        .iter()
        .filter(|e| !e.is_overdue && e.date >= today)
        .cloned()
        .collect();

    upcoming.sort_by_key(|e| e.date);
    upcoming.truncate(limit);
    upcoming
}

/// Overdue events, in input order.
pub fn overdue(events: &[CalendarEvent]) -> Vec<CalendarEvent> {
    events.iter().filter(|e| e.is_overdue).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::tests::{d, make_case};
    use crate::case::{CaseStatus, DeadlineKind};
    use crate::ingest::ingest_cases;
    use crate::reminder::ReminderType;
    use chrono::Weekday;
    use serde_json::json;

    fn scenario_cases() -> Vec<CaseRecord> {
        let a = make_case("A", d(2025, 6, 17));
        let b = make_case("B", d(2025, 6, 1));
        let mut c = make_case("C", d(2025, 7, 1));
        c.custom_deadline = Some(d(2025, 6, 25));
        vec![a, b, c]
    }

    #[test]
    fn test_build_events_scenario() {
        let today = d(2025, 6, 10);
        let events = build_events(&scenario_cases(), today);

        assert_eq!(events.len(), 3);

        let a = &events[0];
        assert_eq!(a.date, d(2025, 6, 17));
        assert_eq!(a.days_remaining, 7);
        assert_eq!(a.priority, Priority::High);
        assert!(!a.is_overdue);

        let b = &events[1];
        assert!(b.is_overdue);
        assert_eq!(b.days_remaining, -9);
        assert_eq!(b.priority, Priority::High);

        let c = &events[2];
        assert_eq!(c.date, d(2025, 6, 25));
        assert_eq!(c.deadline_kind, Some(DeadlineKind::Custom));
        assert_eq!(c.days_remaining, 15);
        assert_eq!(c.priority, Priority::Low);
    }

    #[test]
    fn test_build_events_carries_case_details() {
        let events = build_events(&scenario_cases(), d(2025, 6, 10));
        let a = &events[0];

        assert_eq!(a.event_type, EventType::Deadline);
        assert_eq!(a.title, "Deadline: SAR-A");
        assert_eq!(a.case_id.as_deref(), Some("A"));
        assert_eq!(a.case_reference.as_deref(), Some("SAR-A"));
        assert_eq!(a.organization_name.as_deref(), Some("Org A"));
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let events = build_events(&[make_case("1", d(2025, 6, 10))], d(2025, 6, 10));
        assert!(!events[0].is_overdue);
        assert_eq!(events[0].days_remaining, 0);
    }

    #[test]
    fn test_build_events_is_idempotent() {
        let cases = scenario_cases();
        let today = d(2025, 6, 10);
        assert_eq!(build_events(&cases, today), build_events(&cases, today));

        let events = build_events(&cases, today);
        let first = build_month_grid(2025, 6, &events, today).unwrap();
        let second = build_month_grid(2025, 6, &events, today).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_record_is_isolated() {
        let raw = vec![
            json!({"id": 1, "organization_name": "Acme", "case_reference": "SAR-1",
                   "submission_date": "2025-05-20", "statutory_deadline": "2025-06-17"}),
            json!({"id": 2, "organization_name": "Broken", "case_reference": "SAR-2",
                   "submission_date": "2025-05-20", "statutory_deadline": "17/06/2025"}),
            json!({"id": 3, "organization_name": "Globex", "case_reference": "SAR-3",
                   "submission_date": "2025-05-04", "statutory_deadline": "2025-06-01"}),
        ];

        let ingested = ingest_cases(&raw);
        let events = build_events(&ingested.records, d(2025, 6, 10));

        assert_eq!(events.len(), raw.len() - ingested.rejected.len());
        assert_eq!(events.len(), 2);
        assert_eq!(ingested.rejected[0].id.as_deref(), Some("2"));
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let today = d(2025, 6, 10);
        let events = build_events(&[], today);
        assert!(events.is_empty());
        assert!(upcoming(&events, today, 10).is_empty());
        assert!(overdue(&events).is_empty());

        let grid = build_month_grid(2025, 6, &events, today).unwrap();
        assert_eq!(grid.len(), GRID_DAYS);
        assert!(grid.iter().all(|day| day.events.is_empty()));
    }

    #[test]
    fn test_month_grid_june_2025_starts_on_the_first() {
        let today = d(2025, 6, 10);
        let events = build_events(&scenario_cases(), today);
        let grid = build_month_grid(2025, 6, &events, today).unwrap();

        assert_eq!(grid.len(), 42);
        assert_eq!(grid[0].date, d(2025, 6, 1));
        assert_eq!(grid[41].date, d(2025, 7, 12));
        assert!(grid[29].is_current_month);
        assert!(!grid[30].is_current_month);

        let today_cells: Vec<_> = grid.iter().filter(|day| day.is_today).collect();
        assert_eq!(today_cells.len(), 1);
        assert_eq!(today_cells[0].date, today);

        // Case B's deadline is the first cell
        assert_eq!(grid[0].events.len(), 1);
        assert_eq!(grid[0].events[0].case_id.as_deref(), Some("B"));
        assert_eq!(grid[16].events[0].case_id.as_deref(), Some("A"));
    }

    #[test]
    fn test_month_grid_always_starts_on_sunday() {
        let today = d(2025, 6, 10);
        for (year, month) in [(2025, 2), (2026, 2), (2025, 3), (2024, 12), (2025, 11)] {
            let grid = build_month_grid(year, month, &[], today).unwrap();
            assert_eq!(grid.len(), 42);
            assert_eq!(grid[0].date.weekday(), Weekday::Sun);
            assert!(grid[0].date <= d(year, month, 1));
            assert!(grid.iter().any(|day| day.date == d(year, month, 1)));
        }
    }

    #[test]
    fn test_month_grid_leading_days_belong_to_previous_month() {
        // March 2025 starts on a Saturday
        let grid = build_month_grid(2025, 3, &[], d(2025, 6, 10)).unwrap();
        assert_eq!(grid[0].date, d(2025, 2, 23));
        assert!(!grid[5].is_current_month);
        assert!(grid[6].is_current_month);
        assert!(grid.iter().all(|day| !day.is_today));
    }

    #[test]
    fn test_month_grid_keeps_event_order_within_a_day() {
        let today = d(2025, 6, 10);
        let first = make_case("first", d(2025, 6, 20));
        let second = make_case("second", d(2025, 6, 20));

        let events = build_events(&[first, second], today);
        let grid = build_month_grid(2025, 6, &events, today).unwrap();
        let day = grid.iter().find(|day| day.date == d(2025, 6, 20)).unwrap();

        let ids: Vec<_> = day.events.iter().map(|e| e.case_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_month_grid_rejects_invalid_month() {
        let today = d(2025, 6, 10);
        assert!(matches!(
            build_month_grid(2025, 13, &[], today),
            Err(SarError::InvalidMonth { year: 2025, month: 13 })
        ));
        assert!(build_month_grid(2025, 0, &[], today).is_err());
    }

    #[test]
    fn test_month_grid_rejects_months_at_the_edge_of_the_calendar() {
        let latest = NaiveDate::MAX;
        assert!(matches!(
            build_month_grid(latest.year(), 12, &[], latest),
            Err(SarError::InvalidMonth { month: 12, .. })
        ));

        let earliest = NaiveDate::MIN;
        assert!(matches!(
            build_month_grid(earliest.year(), 1, &[], earliest),
            Err(SarError::InvalidMonth { month: 1, .. })
        ));

        assert!(build_month_grid(i32::MAX, 6, &[], d(2025, 6, 10)).is_err());
    }

    #[test]
    fn test_upcoming_sorts_and_limits() {
        let today = d(2025, 6, 10);
        let events = build_events(&scenario_cases(), today);

        let next = upcoming(&events, today, 10);
        let dates: Vec<_> = next.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![d(2025, 6, 17), d(2025, 6, 25)]);

        let first_only = upcoming(&events, today, 1);
        assert_eq!(first_only.len(), 1);
        assert_eq!(first_only[0].date, d(2025, 6, 17));
    }

    #[test]
    fn test_overdue_keeps_input_order() {
        let today = d(2025, 6, 10);
        let cases = vec![
            make_case("late-2", d(2025, 6, 5)),
            make_case("ok", d(2025, 6, 30)),
            make_case("late-1", d(2025, 5, 1)),
        ];
        let events = build_events(&cases, today);
        let ids: Vec<_> = overdue(&events)
            .iter()
            .map(|e| e.case_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["late-2", "late-1"]);
    }

    #[test]
    fn test_range_events_include_creations_and_reminders() {
        let today = d(2025, 6, 10);
        let mut case = make_case("1", d(2025, 6, 17));
        case.submission_date = d(2025, 6, 2);

        let mut closed = make_case("2", d(2025, 6, 20));
        closed.status = CaseStatus::Complete;

        let reminders = vec![
            Reminder {
                id: "7".into(),
                case_id: Some("1".into()),
                title: "Chase Acme".into(),
                description: None,
                reminder_date: d(2025, 6, 12),
                reminder_type: ReminderType::FollowUp,
                is_completed: false,
            },
            Reminder {
                id: "8".into(),
                case_id: None,
                title: "Done already".into(),
                description: None,
                reminder_date: d(2025, 6, 13),
                reminder_type: ReminderType::Custom,
                is_completed: true,
            },
        ];

        let range = DateRange::new(d(2025, 6, 1), d(2025, 6, 30));
        let events = build_range_events(&[case, closed], &reminders, range, today);

        // The closed case was submitted in May and its deadline is skipped
        let summary: Vec<_> = events.iter().map(|e| (e.date, e.event_type)).collect();
        assert_eq!(
            summary,
            vec![
                (d(2025, 6, 2), EventType::CaseCreation),
                (d(2025, 6, 12), EventType::Followup),
                (d(2025, 6, 17), EventType::Deadline),
            ]
        );

        let creation = &events[0];
        assert!(!creation.is_overdue);
        assert_eq!(creation.priority, Priority::Low);

        let follow_up = &events[1];
        assert_eq!(follow_up.title, "Reminder: Chase Acme");
        assert_eq!(follow_up.case_reference.as_deref(), Some("SAR-1"));
    }
}
