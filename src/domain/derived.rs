// Derived metrics for a single request.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    Config, DeadlineStatus, Request, ScheduleRisk, Size, StoryPoints,
    effort::{self, round_to_tenth},
};

/// Everything computed from a request's stored fields.
///
/// Recomputed on demand; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Derived {
    /// Sum of all effort phases.
    pub total_hours: f64,
    /// Total hours divided by the configured workday length, unrounded.
    pub man_days: f64,
    /// T-shirt size from [`Derived::man_days`].
    pub size: Size,
    /// Story points from [`Derived::total_hours`].
    pub story_points: StoryPoints,
    /// Deadline lies before today.
    pub is_overdue: bool,
    /// Work is under way.
    pub is_active: bool,
    /// Date-proximity tier of the deadline.
    pub deadline_status: DeadlineStatus,
    /// Workload-aware risk of the deadline.
    pub schedule_risk: ScheduleRisk,
}

impl Derived {
    /// Man-days rounded to one decimal place.
    #[must_use]
    pub fn man_days_display(&self) -> f64 {
        round_to_tenth(self.man_days)
    }
}

/// Computes the derived figures for `request` as of `today`.
#[must_use]
pub fn compute_derived(request: &Request, config: &Config, today: NaiveDate) -> Derived {
    let total_hours = request.total_hours();
    let man_days = effort::man_days(total_hours, config.workday_hours());

    Derived {
        total_hours,
        man_days,
        size: Size::classify(man_days),
        story_points: StoryPoints::classify(total_hours),
        is_overdue: request.is_overdue(today),
        is_active: request.status.is_active(),
        deadline_status: DeadlineStatus::evaluate(request.deadline, today),
        schedule_risk: ScheduleRisk::evaluate(request.deadline, total_hours, today),
    }
}
