//! Aggregated figures over a set of requests.
//!
//! [`DashboardStats`] feeds the at-a-glance dashboard: counts, distributions
//! and risk. [`Report`] adds the slower-moving figures shown on the report
//! page: averages, recent activity, the largest requests and upcoming
//! deadlines.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::domain::{Config, Hours, Request, RequestId, Size, Status, deadline, effort};

/// How many requests [`Report::largest`] holds.
pub const LARGEST_LIMIT: usize = 5;

/// Window, in days, for [`Report::created_this_week`].
const WEEK_DAYS: u64 = 7;

/// Dashboard figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Number of requests.
    pub total_requests: usize,
    /// Requests in [`Status::InProgress`].
    pub in_progress: usize,
    /// Open requests whose deadline has passed.
    pub overdue: usize,
    /// Active requests in the critical deadline tier.
    pub approaching: usize,
    /// Sum of total hours over all requests.
    pub total_hours: f64,
    /// Hours per phase over all requests.
    pub phase_hours: Hours,
    /// Requests per size. Every size is present.
    pub size_distribution: BTreeMap<Size, usize>,
    /// Requests per status. Every status is present.
    pub status_distribution: BTreeMap<Status, usize>,
}

impl DashboardStats {
    /// Aggregates `requests` as of `today`.
    pub fn collect<'a, I>(requests: I, config: &Config, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Request>,
    {
        let mut stats = Self {
            total_requests: 0,
            in_progress: 0,
            overdue: 0,
            approaching: 0,
            total_hours: 0.0,
            phase_hours: Hours::default(),
            size_distribution: Size::ALL.into_iter().map(|size| (size, 0)).collect(),
            status_distribution: Status::ALL.into_iter().map(|status| (status, 0)).collect(),
        };

        for request in requests {
            let total = request.total_hours();
            let size = Size::classify(effort::man_days(total, config.workday_hours()));

            stats.total_requests += 1;
            if request.status == Status::InProgress {
                stats.in_progress += 1;
            }
            if request.is_overdue_and_open(today) {
                stats.overdue += 1;
            }
            if deadline::is_approaching(request, today) {
                stats.approaching += 1;
            }
            stats.total_hours += total;
            stats.phase_hours.analyst += request.hours.analyst;
            stats.phase_hours.developer += request.hours.developer;
            stats.phase_hours.acceptance_test += request.hours.acceptance_test;
            stats.phase_hours.preprod += request.hours.preprod;
            *stats.size_distribution.entry(size).or_insert(0) += 1;
            *stats.status_distribution.entry(request.status).or_insert(0) += 1;
        }

        tracing::debug!(
            total = stats.total_requests,
            overdue = stats.overdue,
            approaching = stats.approaching,
            "collected dashboard stats"
        );

        stats
    }
}

/// Short reference to a request, used in report lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSummary {
    /// Identifier.
    pub id: RequestId,
    /// Name.
    pub name: String,
    /// Lifecycle state.
    pub status: Status,
    /// Sum of all effort phases.
    pub total_hours: f64,
    /// Deadline, if any.
    pub deadline: Option<NaiveDate>,
}

impl From<&Request> for RequestSummary {
    fn from(request: &Request) -> Self {
        Self {
            id: request.id,
            name: request.name.clone(),
            status: request.status,
            total_hours: request.total_hours(),
            deadline: request.deadline,
        }
    }
}

/// Report figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Number of requests.
    pub total_requests: usize,
    /// Requests in [`Status::Completed`].
    pub completed: usize,
    /// Requests in [`Status::InProgress`].
    pub in_progress: usize,
    /// Open requests whose deadline has passed.
    pub overdue: usize,
    /// Sum of total hours.
    pub total_hours: f64,
    /// Mean total hours per request; zero without requests.
    pub average_hours: f64,
    /// Hours per phase.
    pub phase_hours: Hours,
    /// Requests created in the same calendar month as today.
    pub created_this_month: usize,
    /// Requests created in the last seven days, today included.
    pub created_this_week: usize,
    /// The largest requests by total hours, largest first.
    pub largest: Vec<RequestSummary>,
    /// Open requests due between today and the configured window, earliest
    /// first.
    pub upcoming_deadlines: Vec<RequestSummary>,
}

impl Report {
    /// Builds the report for `requests` as of `today`.
    #[must_use]
    pub fn collect(requests: &[Request], config: &Config, today: NaiveDate) -> Self {
        let total_requests = requests.len();
        let total_hours: f64 = requests.iter().map(Request::total_hours).sum();

        #[allow(clippy::cast_precision_loss)]
        let average_hours = if requests.is_empty() {
            0.0
        } else {
            total_hours / total_requests as f64
        };

        let phase_hours = requests.iter().fold(Hours::default(), |mut acc, request| {
            acc.analyst += request.hours.analyst;
            acc.developer += request.hours.developer;
            acc.acceptance_test += request.hours.acceptance_test;
            acc.preprod += request.hours.preprod;
            acc
        });

        let week_start = today
            .checked_sub_days(Days::new(WEEK_DAYS - 1))
            .unwrap_or(today);
        let horizon = today
            .checked_add_days(Days::new(u64::from(config.upcoming_days())))
            .unwrap_or(NaiveDate::MAX);

        let mut largest: Vec<&Request> = requests.iter().collect();
        largest.sort_by(|a, b| b.total_hours().total_cmp(&a.total_hours()));
        largest.truncate(LARGEST_LIMIT);

        let mut upcoming: Vec<&Request> = requests
            .iter()
            .filter(|request| !request.status.is_completed())
            .filter(|request| {
                request
                    .deadline
                    .is_some_and(|deadline| deadline >= today && deadline <= horizon)
            })
            .collect();
        upcoming.sort_by_key(|request| request.deadline);

        Self {
            total_requests,
            completed: count_status(requests, Status::Completed),
            in_progress: count_status(requests, Status::InProgress),
            overdue: requests
                .iter()
                .filter(|request| request.is_overdue_and_open(today))
                .count(),
            total_hours,
            average_hours,
            phase_hours,
            created_this_month: requests
                .iter()
                .map(|request| request.created_date.date_naive())
                .filter(|created| created.year() == today.year() && created.month() == today.month())
                .count(),
            created_this_week: requests
                .iter()
                .filter(|request| request.created_date.date_naive() >= week_start)
                .count(),
            largest: largest.into_iter().map(RequestSummary::from).collect(),
            upcoming_deadlines: upcoming.into_iter().map(RequestSummary::from).collect(),
        }
    }
}

fn count_status(requests: &[Request], status: Status) -> usize {
    requests
        .iter()
        .filter(|request| request.status == status)
        .count()
}
