//! Dashboard summaries computed from case records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::case::{CaseRecord, CaseStatus, DeadlineKind};
use crate::deadline::days_remaining;

/// Case counts for the dashboard header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardOverview {
    pub total_cases: usize,
    pub pending_cases: usize,
    pub responded_cases: usize,
    pub overdue_cases: usize,
    pub completed_cases: usize,
    pub escalated_cases: usize,
    /// Open cases whose deadline is today or later
    pub upcoming_deadlines: usize,
    /// Open cases whose deadline has passed
    pub overdue_deadlines: usize,
}

/// One row of the deadline list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeadlineSummary {
    pub case_id: String,
    pub case_reference: String,
    pub organization_name: String,
    pub deadline_date: NaiveDate,
    pub days_remaining: i64,
    pub is_overdue: bool,
    pub deadline_kind: DeadlineKind,
}

impl DeadlineSummary {
    pub fn new(
        case_id: String,
        case_reference: String,
        organization_name: String,
        deadline_date: NaiveDate,
        deadline_kind: DeadlineKind,
        today: NaiveDate,
    ) -> Self {
        let days_remaining = days_remaining(deadline_date, today);

        DeadlineSummary {
            case_id,
            case_reference,
            organization_name,
            deadline_date,
            days_remaining,
            is_overdue: days_remaining < 0,
            deadline_kind,
        }
    }

    pub fn for_case(case: &CaseRecord, today: NaiveDate) -> Self {
        Self::new(
            case.id.clone(),
            case.case_reference.clone(),
            case.organization_name.clone(),
            case.effective_deadline(),
            case.deadline_kind(),
            today,
        )
    }
}

/// Status counts use the reconciled status, so a pending case past its
/// deadline counts as overdue even if the stored status lags behind.
pub fn overview(cases: &[CaseRecord], today: NaiveDate) -> DashboardOverview {
    let mut overview = DashboardOverview {
        total_cases: cases.len(),
        ..Default::default()
    };

    for case in cases {
        match case.reconciled_status(today) {
            CaseStatus::Pending => overview.pending_cases += 1,
            CaseStatus::Responded => overview.responded_cases += 1,
            CaseStatus::Overdue => overview.overdue_cases += 1,
            CaseStatus::Complete => overview.completed_cases += 1,
            CaseStatus::Escalated => overview.escalated_cases += 1,
        }

        if case.status.is_open() {
            if case.is_overdue(today) {
                overview.overdue_deadlines += 1;
            } else {
                overview.upcoming_deadlines += 1;
            }
        }
    }

    overview
}

/// Open cases due within `window_days`, plus every overdue one, earliest first.
pub fn upcoming_deadlines(
    cases: &[CaseRecord],
    today: NaiveDate,
    window_days: i64,
) -> Vec<DeadlineSummary> {
    let mut rows: Vec<DeadlineSummary> = cases
        .iter()
        .filter(|case| case.status.is_open())
        .map(|case| DeadlineSummary::for_case(case, today))
        .filter(|row| row.is_overdue || row.days_remaining <= window_days)
        .collect();

    rows.sort_by_key(|row| row.deadline_date);
    rows
}

/// How one organization has handled the requests sent to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationPerformance {
    pub organization_name: String,
    pub total_sars: usize,
    pub responded_on_time: usize,
    pub responded_late: usize,
    /// No response and the deadline has passed
    pub ignored: usize,
    /// Mean days from submission to response, over responses with a date
    pub average_response_days: Option<f64>,
    /// Percentage of all requests answered on time
    pub compliance_rating: f64,
}

/// Per-organization response record, ordered by organization name.
///
/// A response counts as on time when it arrived on or before the effective
/// deadline. A response flagged as received but without a date counts
/// towards neither on time nor late.
pub fn organization_performance(
    cases: &[CaseRecord],
    today: NaiveDate,
) -> Vec<OrganizationPerformance> {
    let mut by_org: BTreeMap<&str, Vec<&CaseRecord>> = BTreeMap::new();
    for case in cases {
        by_org.entry(case.organization_name.as_str()).or_default().push(case);
    }

    by_org
        .into_iter()
        .map(|(name, cases)| {
            let mut responded_on_time = 0;
            let mut responded_late = 0;
            let mut ignored = 0;
            let mut response_days = Vec::new();

            for case in &cases {
                match (case.response_received, case.response_date) {
                    (true, Some(responded)) => {
                        if responded <= case.effective_deadline() {
                            responded_on_time += 1;
                        } else {
                            responded_late += 1;
                        }
                        response_days.push(days_remaining(responded, case.submission_date));
                    }
                    (true, None) => {}
                    (false, _) if case.is_overdue(today) => ignored += 1,
                    (false, _) => {}
                }
            }

            let average_response_days = if response_days.is_empty() {
                None
            } else {
                Some(response_days.iter().sum::<i64>() as f64 / response_days.len() as f64)
            };

            OrganizationPerformance {
                organization_name: name.to_string(),
                total_sars: cases.len(),
                responded_on_time,
                responded_late,
                ignored,
                average_response_days,
                compliance_rating: responded_on_time as f64 / cases.len() as f64 * 100.0,
            }
        })
        .collect()
}
