//! Core of sartrack: SAR case records, deadline arithmetic and calendar
//! aggregation.
//!
//! - `ingest` turns loosely typed JSON into strict [`CaseRecord`]s
//! - `calendar` derives events and month grids from them
//! - `dashboard` summarizes cases for the overview screens

pub mod calendar;
pub mod case;
pub mod config;
pub mod dashboard;
pub mod date_range;
pub mod deadline;
pub mod error;
pub mod event;
pub mod ingest;
pub mod reminder;

pub use case::{CaseRecord, CaseStatus, DeadlineKind};
pub use deadline::Priority;
pub use error::{SarError, SarResult};
pub use event::{CalendarDay, CalendarEvent, EventType};
pub use reminder::{Reminder, ReminderType};
