//! Strict parsing of loosely typed JSON into case and reminder records.
//!
//! The backend and hand-written case files both produce JSON whose fields
//! may be missing, null, empty strings, or datetimes where dates are
//! expected. Each record is validated on its own: a bad record is dropped
//! with a warning and never takes the rest of the batch down with it.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::calendar::urgency;
use crate::case::{CaseRecord, CaseStatus, DeadlineKind};
use crate::dashboard::DeadlineSummary;
use crate::error::{SarError, SarResult};
use crate::event::{CalendarEvent, EventType};
use crate::reminder::{Reminder, ReminderType};

/// Why a single record was quarantined.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("record is not a valid object: {0}")]
    Malformed(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' has unparseable date '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("unknown {field} '{value}'")]
    UnknownValue { field: &'static str, value: String },

    #[error("submission date {submission} is after statutory deadline {deadline}")]
    DeadlineBeforeSubmission { submission: NaiveDate, deadline: NaiveDate },
}

/// A record that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    /// Position in the input batch
    pub index: usize,
    /// Record id, when it could be read
    pub id: Option<String>,
    pub reason: RecordError,
}

/// Result of ingesting a batch.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub records: Vec<T>,
    pub rejected: Vec<Rejected>,
}

impl<T> Default for Ingested<T> {
    fn default() -> Self {
        Ingested {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Parse `YYYY-MM-DD`, dropping any time component after `T` or a space.
pub fn parse_date(s: &str) -> SarResult<NaiveDate> {
    let trimmed = s.trim();
    let date_part = match trimmed.find(['T', ' ']) {
        Some(i) => &trimmed[..i],
        None => trimmed,
    };

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| SarError::InvalidDate(trimmed.to_string()))
}

// Raw shapes, as loose as the JSON they come from

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Int(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct RawCase {
    id: Option<RawId>,
    organization_name: Option<String>,
    case_reference: Option<String>,
    submission_date: Option<String>,
    statutory_deadline: Option<String>,
    custom_deadline: Option<String>,
    extended_deadline: Option<String>,
    status: Option<String>,
    request_type: Option<String>,
    response_received: Option<bool>,
    response_date: Option<String>,
}

#[derive(Deserialize)]
struct RawReminder {
    id: Option<RawId>,
    #[serde(alias = "sar_case_id")]
    case_id: Option<RawId>,
    title: Option<String>,
    description: Option<String>,
    reminder_date: Option<String>,
    reminder_type: Option<String>,
    is_completed: Option<bool>,
}

#[derive(Deserialize)]
struct RawEvent {
    id: Option<RawId>,
    title: Option<String>,
    description: Option<String>,
    event_date: Option<String>,
    event_type: Option<String>,
    sar_case_id: Option<RawId>,
}

#[derive(Deserialize)]
struct RawDeadline {
    sar_case_id: Option<RawId>,
    case_reference: Option<String>,
    organization_name: Option<String>,
    deadline_date: Option<String>,
    deadline_type: Option<String>,
}

/// Treat null, missing and blank strings alike.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, RecordError> {
    non_blank(value).ok_or(RecordError::MissingField(field))
}

fn required_date(value: Option<String>, field: &'static str) -> Result<NaiveDate, RecordError> {
    let value = required_text(value, field)?;
    parse_date(&value).map_err(|_| RecordError::InvalidDate { field, value })
}

fn optional_date(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<NaiveDate>, RecordError> {
    match non_blank(value) {
        Some(value) => parse_date(&value)
            .map(Some)
            .map_err(|_| RecordError::InvalidDate { field, value }),
        None => Ok(None),
    }
}

fn raw_record<T: DeserializeOwned>(value: &Value) -> Result<T, RecordError> {
    serde_json::from_value(value.clone()).map_err(|e| RecordError::Malformed(e.to_string()))
}

fn id_of(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn case_from_value(value: &Value) -> Result<CaseRecord, RecordError> {
    let raw: RawCase = raw_record(value)?;

    let id = raw.id.map(RawId::into_string).ok_or(RecordError::MissingField("id"))?;
    let organization_name = required_text(raw.organization_name, "organization_name")?;
    let case_reference = non_blank(raw.case_reference).unwrap_or_else(|| format!("#{}", id));
    let submission_date = required_date(raw.submission_date, "submission_date")?;
    let statutory_deadline = required_date(raw.statutory_deadline, "statutory_deadline")?;
    let custom_deadline = optional_date(raw.custom_deadline, "custom_deadline")?;
    let extended_deadline = optional_date(raw.extended_deadline, "extended_deadline")?;
    let response_date = optional_date(raw.response_date, "response_date")?;

    let status = match non_blank(raw.status) {
        Some(s) => CaseStatus::parse(&s).ok_or(RecordError::UnknownValue {
            field: "status",
            value: s,
        })?,
        None => CaseStatus::Pending,
    };

    if submission_date > statutory_deadline {
        return Err(RecordError::DeadlineBeforeSubmission {
            submission: submission_date,
            deadline: statutory_deadline,
        });
    }

    Ok(CaseRecord {
        id,
        organization_name,
        case_reference,
        submission_date,
        statutory_deadline,
        custom_deadline,
        extended_deadline,
        status,
        request_type: non_blank(raw.request_type),
        // A response date without the flag still means a response arrived
        response_received: raw.response_received.unwrap_or(response_date.is_some()),
        response_date,
    })
}

fn reminder_from_value(value: &Value) -> Result<Reminder, RecordError> {
    let raw: RawReminder = raw_record(value)?;

    let id = raw.id.map(RawId::into_string).ok_or(RecordError::MissingField("id"))?;
    let reminder_date = required_date(raw.reminder_date, "reminder_date")?;

    let reminder_type = match non_blank(raw.reminder_type) {
        Some(s) => ReminderType::parse(&s).ok_or(RecordError::UnknownValue {
            field: "reminder_type",
            value: s,
        })?,
        None => ReminderType::Custom,
    };

    Ok(Reminder {
        id,
        case_id: raw.case_id.map(RawId::into_string),
        title: non_blank(raw.title).unwrap_or_else(|| "Untitled reminder".to_string()),
        description: non_blank(raw.description),
        reminder_date,
        reminder_type,
        is_completed: raw.is_completed.unwrap_or(false),
    })
}

/// Validate each value independently, logging every rejection.
fn ingest_with<T>(
    values: &[Value],
    kind: &str,
    parse: impl Fn(&Value) -> Result<T, RecordError>,
) -> Ingested<T> {
    let mut ingested = Ingested::default();

    for (index, value) in values.iter().enumerate() {
        match parse(value) {
            Ok(record) => ingested.records.push(record),
            Err(reason) => {
                let id = id_of(value);
                warn!(
                    index,
                    id = id.as_deref().unwrap_or("?"),
                    "Skipping malformed {}: {}",
                    kind,
                    reason
                );
                ingested.rejected.push(Rejected { index, id, reason });
            }
        }
    }

    ingested
}

pub fn ingest_cases(values: &[Value]) -> Ingested<CaseRecord> {
    ingest_with(values, "case", case_from_value)
}

pub fn ingest_reminders(values: &[Value]) -> Ingested<Reminder> {
    ingest_with(values, "reminder", reminder_from_value)
}

/// Rows from a pre-aggregated `/calendar/events` endpoint.
///
/// Urgency is recomputed against `today` so these events are interchangeable
/// with ones built locally.
pub fn ingest_remote_events(values: &[Value], today: NaiveDate) -> Ingested<CalendarEvent> {
    ingest_with(values, "calendar event", |value| {
        let raw: RawEvent = raw_record(value)?;

        let id = raw.id.map(RawId::into_string).ok_or(RecordError::MissingField("id"))?;
        let date = required_date(raw.event_date, "event_date")?;
        let label = required_text(raw.event_type, "event_type")?;
        let event_type = EventType::parse(&label).ok_or(RecordError::UnknownValue {
            field: "event_type",
            value: label,
        })?;
        let (is_overdue, days_remaining, priority) = urgency(date, today, event_type);

        Ok(CalendarEvent {
            id,
            title: non_blank(raw.title).unwrap_or_else(|| event_type.label().to_string()),
            description: non_blank(raw.description),
            date,
            event_type,
            case_id: raw.sar_case_id.map(RawId::into_string),
            case_reference: None,
            organization_name: None,
            deadline_kind: None,
            is_overdue,
            days_remaining,
            priority,
        })
    })
}

/// Rows from a pre-aggregated `/dashboard/deadlines` endpoint.
pub fn ingest_deadline_rows(values: &[Value], today: NaiveDate) -> Ingested<DeadlineSummary> {
    ingest_with(values, "deadline row", |value| {
        let raw: RawDeadline = raw_record(value)?;

        let case_id = raw
            .sar_case_id
            .map(RawId::into_string)
            .ok_or(RecordError::MissingField("sar_case_id"))?;
        let deadline_date = required_date(raw.deadline_date, "deadline_date")?;
        let deadline_type = non_blank(raw.deadline_type).map(|s| s.to_ascii_lowercase());
        let deadline_kind = match deadline_type.as_deref() {
            Some("custom") => DeadlineKind::Custom,
            Some("extended") => DeadlineKind::Extended,
            _ => DeadlineKind::Statutory,
        };

        Ok(DeadlineSummary::new(
            case_id,
            non_blank(raw.case_reference).unwrap_or_default(),
            non_blank(raw.organization_name).unwrap_or_default(),
            deadline_date,
            deadline_kind,
            today,
        ))
    })
}

/// Cases and reminders loaded from a local JSON file.
#[derive(Debug, Clone, Default)]
pub struct CaseBook {
    pub cases: Vec<CaseRecord>,
    pub reminders: Vec<Reminder>,
    /// Number of records quarantined while loading
    pub rejected: usize,
}

impl CaseBook {
    /// Load a case file: either a bare array of cases, or an object with a
    /// `cases` array and an optional `reminders` array.
    pub fn load(path: &Path) -> SarResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> SarResult<Self> {
        let (cases, reminders): (&[Value], &[Value]) = match value {
            Value::Array(cases) => (cases.as_slice(), &[][..]),
            Value::Object(map) => {
                let cases = match map.get("cases") {
                    Some(Value::Array(cases)) => cases.as_slice(),
                    Some(_) => return Err(SarError::Shape("'cases' must be an array".into())),
                    None => return Err(SarError::Shape("missing 'cases' array".into())),
                };
                let reminders = match map.get("reminders") {
                    Some(Value::Array(reminders)) => reminders.as_slice(),
                    Some(Value::Null) | None => &[][..],
                    Some(_) => return Err(SarError::Shape("'reminders' must be an array".into())),
                };
                (cases, reminders)
            }
            _ => {
                return Err(SarError::Shape(
                    "expected an array of cases or an object with a 'cases' array".into(),
                ));
            }
        };

        let cases = ingest_cases(cases);
        let reminders = ingest_reminders(reminders);

        Ok(CaseBook {
            rejected: cases.rejected.len() + reminders.rejected.len(),
            cases: cases.records,
            reminders: reminders.records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::tests::d;
    use crate::deadline::Priority;
    use serde_json::json;

    fn valid_case() -> Value {
        json!({
            "id": 12,
            "organization_name": "Acme Ltd",
            "case_reference": "SAR-2025-012",
            "submission_date": "2025-05-20",
            "statutory_deadline": "2025-06-17",
            "custom_deadline": null,
            "extended_deadline": "",
            "status": "Pending",
            "request_type": "Personal Data",
            "response_received": false
        })
    }

    #[test]
    fn test_parse_date_plain() {
        assert_eq!(parse_date("2025-06-10").unwrap(), d(2025, 6, 10));
        assert_eq!(parse_date(" 2025-06-10 ").unwrap(), d(2025, 6, 10));
    }

    #[test]
    fn test_parse_date_truncates_time_component() {
        assert_eq!(parse_date("2025-06-10T23:59:59").unwrap(), d(2025, 6, 10));
        assert_eq!(parse_date("2025-06-10T00:30:00Z").unwrap(), d(2025, 6, 10));
        assert_eq!(parse_date("2025-06-10T23:30:00-05:00").unwrap(), d(2025, 6, 10));
        assert_eq!(parse_date("2025-06-10 08:15:00").unwrap(), d(2025, 6, 10));
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("10/06/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_ingest_valid_case() {
        let ingested = ingest_cases(&[valid_case()]);
        assert!(ingested.rejected.is_empty());

        let case = &ingested.records[0];
        assert_eq!(case.id, "12");
        assert_eq!(case.statutory_deadline, d(2025, 6, 17));
        assert_eq!(case.custom_deadline, None);
        assert_eq!(case.extended_deadline, None);
        assert_eq!(case.status, CaseStatus::Pending);
        assert_eq!(case.request_type.as_deref(), Some("Personal Data"));
    }

    #[test]
    fn test_ingest_response_fields() {
        let mut answered = valid_case();
        answered["response_received"] = json!(true);
        answered["response_date"] = json!("2025-06-12T10:00:00");

        let mut dated_only = valid_case();
        dated_only.as_object_mut().unwrap().remove("response_received");
        dated_only["response_date"] = json!("2025-06-20");

        let mut bad_date = valid_case();
        bad_date["response_date"] = json!("last week");

        let ingested = ingest_cases(&[valid_case(), answered, dated_only, bad_date]);
        assert_eq!(ingested.records.len(), 3);

        assert!(!ingested.records[0].response_received);
        assert_eq!(ingested.records[0].response_date, None);

        assert!(ingested.records[1].response_received);
        assert_eq!(ingested.records[1].response_date, Some(d(2025, 6, 12)));

        assert!(ingested.records[2].response_received);

        assert_eq!(
            ingested.rejected[0].reason,
            RecordError::InvalidDate {
                field: "response_date",
                value: "last week".into()
            }
        );
    }

    #[test]
    fn test_ingest_defaults_missing_status_and_reference() {
        let ingested = ingest_cases(&[json!({
            "id": "abc",
            "organization_name": "Acme Ltd",
            "submission_date": "2025-05-20T09:00:00",
            "statutory_deadline": "2025-06-17T00:00:00"
        })]);

        let case = &ingested.records[0];
        assert_eq!(case.status, CaseStatus::Pending);
        assert_eq!(case.case_reference, "#abc");
        assert_eq!(case.submission_date, d(2025, 5, 20));
    }

    #[test]
    fn test_ingest_rejects_each_kind_of_problem() {
        let mut bad_date = valid_case();
        bad_date["custom_deadline"] = json!("soon");

        let mut missing_deadline = valid_case();
        missing_deadline["statutory_deadline"] = Value::Null;

        let mut bad_status = valid_case();
        bad_status["status"] = json!("Lost");

        let mut inverted = valid_case();
        inverted["submission_date"] = json!("2025-07-01");

        let values = vec![
            bad_date,
            missing_deadline,
            bad_status,
            inverted,
            json!("not an object"),
            valid_case(),
        ];
        let ingested = ingest_cases(&values);

        assert_eq!(ingested.records.len(), 1);
        let reasons: Vec<_> = ingested.rejected.iter().map(|r| r.reason.clone()).collect();
        assert_eq!(
            reasons[0],
            RecordError::InvalidDate {
                field: "custom_deadline",
                value: "soon".into()
            }
        );
        assert_eq!(reasons[1], RecordError::MissingField("statutory_deadline"));
        assert!(matches!(reasons[2], RecordError::UnknownValue { field: "status", .. }));
        assert!(matches!(reasons[3], RecordError::DeadlineBeforeSubmission { .. }));
        assert!(matches!(reasons[4], RecordError::Malformed(_)));

        let indices: Vec<_> = ingested.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(ingested.rejected[0].id.as_deref(), Some("12"));
        assert_eq!(ingested.rejected[4].id, None);
    }

    #[test]
    fn test_ingest_reminders() {
        let ingested = ingest_reminders(&[
            json!({"id": 3, "sar_case_id": 12, "title": "Chase",
                   "reminder_date": "2025-06-16T00:00:00",
                   "reminder_type": "Follow-up", "is_completed": false}),
            json!({"id": 4, "title": "No date"}),
        ]);

        assert_eq!(ingested.records.len(), 1);
        assert_eq!(ingested.rejected.len(), 1);

        let reminder = &ingested.records[0];
        assert_eq!(reminder.case_id.as_deref(), Some("12"));
        assert_eq!(reminder.reminder_date, d(2025, 6, 16));
        assert_eq!(reminder.reminder_type, ReminderType::FollowUp);
    }

    #[test]
    fn test_ingest_remote_events_recomputes_urgency() {
        let today = d(2025, 6, 10);
        let ingested = ingest_remote_events(
            &[
                json!({"id": "deadline_12", "title": "Deadline: SAR-12",
                       "event_date": "2025-06-17T00:00:00",
                       "event_type": "Deadline", "sar_case_id": 12, "is_overdue": true}),
                json!({"id": "creation_12", "title": "SAR Created: SAR-12",
                       "event_date": "2025-05-20T00:00:00",
                       "event_type": "Case Creation", "sar_case_id": 12}),
                json!({"id": "x", "event_date": "2025-06-17", "event_type": "Birthday"}),
            ],
            today,
        );

        assert_eq!(ingested.records.len(), 2);
        assert_eq!(ingested.rejected.len(), 1);

        let deadline = &ingested.records[0];
        assert!(!deadline.is_overdue);
        assert_eq!(deadline.days_remaining, 7);
        assert_eq!(deadline.priority, Priority::High);
        assert_eq!(deadline.case_id.as_deref(), Some("12"));

        let creation = &ingested.records[1];
        assert_eq!(creation.event_type, EventType::CaseCreation);
        assert!(!creation.is_overdue);
    }

    #[test]
    fn test_ingest_deadline_rows() {
        let ingested = ingest_deadline_rows(
            &[json!({"sar_case_id": 5, "case_reference": "SAR-5", "organization_name": "Initech",
                     "deadline_date": "2025-06-01", "days_remaining": 0, "is_overdue": false,
                     "deadline_type": "Extended"})],
            d(2025, 6, 10),
        );

        let row = &ingested.records[0];
        assert_eq!(row.days_remaining, -9);
        assert!(row.is_overdue);
        assert_eq!(row.deadline_kind, DeadlineKind::Extended);
    }

    #[test]
    fn test_case_book_accepts_bare_array() {
        let book = CaseBook::from_value(&json!([valid_case()])).unwrap();
        assert_eq!(book.cases.len(), 1);
        assert!(book.reminders.is_empty());
        assert_eq!(book.rejected, 0);
    }

    #[test]
    fn test_case_book_accepts_object_with_reminders() {
        let book = CaseBook::from_value(&json!({
            "cases": [valid_case(), {"id": 99}],
            "reminders": [{"id": 1, "reminder_date": "2025-06-12"}]
        }))
        .unwrap();

        assert_eq!(book.cases.len(), 1);
        assert_eq!(book.reminders.len(), 1);
        assert_eq!(book.rejected, 1);
    }

    #[test]
    fn test_case_book_rejects_wrong_shape() {
        assert!(matches!(CaseBook::from_value(&json!({"items": []})), Err(SarError::Shape(_))));
        assert!(matches!(CaseBook::from_value(&json!({"cases": {}})), Err(SarError::Shape(_))));
        assert!(matches!(CaseBook::from_value(&json!("cases")), Err(SarError::Shape(_))));
    }

    #[test]
    fn test_case_book_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(&path, serde_json::to_string(&json!([valid_case()])).unwrap()).unwrap();

        let book = CaseBook::load(&path).unwrap();
        assert_eq!(book.cases[0].case_reference, "SAR-2025-012");

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(CaseBook::load(&path), Err(SarError::Json(_))));
    }
}
