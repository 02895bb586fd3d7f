//! Day counts and urgency.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Deadlines this many days out or fewer are high priority.
pub const HIGH_PRIORITY_DAYS: i64 = 7;
/// Deadlines this many days out or fewer (but above HIGH_PRIORITY_DAYS) are medium.
pub const MEDIUM_PRIORITY_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

/// Whole calendar days from `today` until `deadline`.
/// Zero means due today; negative means overdue by that many days.
pub fn days_remaining(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days()
}

pub fn derive_priority(days_remaining: i64, is_overdue: bool) -> Priority {
    if is_overdue || days_remaining <= HIGH_PRIORITY_DAYS {
        Priority::High
    } else if days_remaining <= MEDIUM_PRIORITY_DAYS {
        Priority::Medium
    } else {
        Priority::Low
    }
}
