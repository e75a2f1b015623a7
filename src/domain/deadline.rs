//! Deadline risk.
//!
//! Two independent rules live here. [`DeadlineStatus`] buckets a deadline by
//! how many calendar days remain. [`ScheduleRisk`] also looks at the effort
//! still attached to the request and asks whether the remaining working hours
//! can cover it. Both treat a missing deadline as no risk.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::Request;

/// Working hours per calendar day assumed by [`ScheduleRisk`].
pub const SCHEDULE_HOURS_PER_DAY: f64 = 7.0;

/// Whole days from `today` until `deadline`. Negative once the deadline has
/// passed.
#[must_use]
pub fn days_until(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days()
}

/// Date-proximity tier of a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DeadlineStatus {
    /// The deadline has passed.
    Overdue,
    /// Two weeks or less.
    Critical,
    /// Four weeks or less.
    Warning,
    /// Six weeks or less.
    Caution,
    /// Further out, or no deadline.
    Normal,
}

impl DeadlineStatus {
    /// Every tier, most urgent first.
    pub const ALL: [Self; 5] = [
        Self::Overdue,
        Self::Critical,
        Self::Warning,
        Self::Caution,
        Self::Normal,
    ];

    /// Classifies a deadline relative to `today`.
    #[must_use]
    pub fn evaluate(deadline: Option<NaiveDate>, today: NaiveDate) -> Self {
        deadline.map_or(Self::Normal, |deadline| {
            Self::from_days(days_until(deadline, today))
        })
    }

    /// Classifies a day difference.
    #[must_use]
    pub const fn from_days(days: i64) -> Self {
        match days {
            i64::MIN..=-1 => Self::Overdue,
            0..=14 => Self::Critical,
            15..=28 => Self::Warning,
            29..=42 => Self::Caution,
            _ => Self::Normal,
        }
    }

    /// Style token for the tier.
    #[must_use]
    pub const fn style_class(self) -> &'static str {
        match self {
            Self::Overdue => "deadline-overdue",
            Self::Critical => "deadline-critical",
            Self::Warning => "deadline-warning",
            Self::Caution => "deadline-caution",
            Self::Normal => "deadline-normal",
        }
    }

    /// Whether this tier calls for attention.
    #[must_use]
    pub const fn is_at_risk(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for DeadlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overdue => "overdue",
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Caution => "caution",
            Self::Normal => "normal",
        })
    }
}

/// Workload-aware risk: can the time left absorb the effort?
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ScheduleRisk {
    /// At least twice the needed hours remain.
    Normal,
    /// More hours remain than needed, but less than double.
    Warning,
    /// The remaining hours cannot cover the effort.
    Overdue,
}

impl ScheduleRisk {
    /// Compares remaining working hours with `total_hours`.
    ///
    /// Remaining hours are `days_until(deadline) * 7`.
    #[must_use]
    pub fn evaluate(deadline: Option<NaiveDate>, total_hours: f64, today: NaiveDate) -> Self {
        let Some(deadline) = deadline else {
            return Self::Normal;
        };

        #[allow(clippy::cast_precision_loss)]
        let hours_remaining = days_until(deadline, today) as f64 * SCHEDULE_HOURS_PER_DAY;

        if hours_remaining >= 2.0 * total_hours {
            Self::Normal
        } else if hours_remaining > total_hours {
            Self::Warning
        } else {
            Self::Overdue
        }
    }
}

impl fmt::Display for ScheduleRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Overdue => "overdue",
        })
    }
}

/// Whether a request counts as "approaching its deadline": it has a deadline,
/// work is active, and the deadline is in the [`DeadlineStatus::Critical`]
/// tier.
///
/// Overdue requests are not approaching; they are counted separately.
#[must_use]
pub fn is_approaching(request: &Request, today: NaiveDate) -> bool {
    request.deadline.is_some()
        && request.status.is_active()
        && DeadlineStatus::evaluate(request.deadline, today) == DeadlineStatus::Critical
}

/// Number of requests approaching their deadline.
pub fn count_approaching<'a, I>(requests: I, today: NaiveDate) -> usize
where
    I: IntoIterator<Item = &'a Request>,
{
    requests
        .into_iter()
        .filter(|request| is_approaching(request, today))
        .count()
}
