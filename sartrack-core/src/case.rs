//! SAR case records as handed to the aggregator.
//!
//! A `CaseRecord` is only ever built by [`crate::ingest`], which guarantees
//! the dates parsed and that the submission date does not fall after the
//! statutory deadline.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A Subject Access Request case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: String,
    pub organization_name: String,
    pub case_reference: String,
    pub submission_date: NaiveDate,
    /// Legally mandated response date
    pub statutory_deadline: NaiveDate,
    /// Date the organization committed to, if any
    pub custom_deadline: Option<NaiveDate>,
    /// Date after an extension was claimed, if any
    pub extended_deadline: Option<NaiveDate>,
    pub status: CaseStatus,
    /// e.g. "Personal Data", "FOIA"
    pub request_type: Option<String>,
    pub response_received: bool,
    pub response_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    Pending,
    Responded,
    Overdue,
    Complete,
    Escalated,
}

/// Which deadline field governs a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadlineKind {
    Statutory,
    Custom,
    Extended,
}

impl CaseStatus {
    /// Parse the status strings used by the backend ("Pending", "Complete", ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(CaseStatus::Pending),
            "responded" => Some(CaseStatus::Responded),
            "overdue" => Some(CaseStatus::Overdue),
            "complete" | "completed" => Some(CaseStatus::Complete),
            "escalated" => Some(CaseStatus::Escalated),
            _ => None,
        }
    }

    /// Cases still waiting on the organization.
    pub fn is_open(&self) -> bool {
        matches!(self, CaseStatus::Pending | CaseStatus::Overdue)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseStatus::Pending => "Pending",
            CaseStatus::Responded => "Responded",
            CaseStatus::Overdue => "Overdue",
            CaseStatus::Complete => "Complete",
            CaseStatus::Escalated => "Escalated",
        };
        f.write_str(s)
    }
}

impl fmt::Display for DeadlineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeadlineKind::Statutory => "Statutory",
            DeadlineKind::Custom => "Custom",
            DeadlineKind::Extended => "Extended",
        };
        f.write_str(s)
    }
}

impl CaseRecord {
    /// The deadline that governs urgency: extended, then custom, then statutory.
    pub fn effective_deadline(&self) -> NaiveDate {
        self.extended_deadline
            .or(self.custom_deadline)
            .unwrap_or(self.statutory_deadline)
    }

    /// Which field `effective_deadline` picked.
    pub fn deadline_kind(&self) -> DeadlineKind {
        if self.extended_deadline.is_some() {
            DeadlineKind::Extended
        } else if self.custom_deadline.is_some() {
            DeadlineKind::Custom
        } else {
            DeadlineKind::Statutory
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.effective_deadline() < today
    }

    /// Status as of `today`: a pending case past its deadline reads as overdue.
    pub fn reconciled_status(&self, today: NaiveDate) -> CaseStatus {
        if self.status == CaseStatus::Pending && self.is_overdue(today) {
            CaseStatus::Overdue
        } else {
            self.status
        }
    }
}
