//! Domain models for effort tracking.
//!
//! This module contains the request record, its lifecycle, and the pure
//! functions that derive sizes and deadline risk from it.

/// Request record and effort hours.
pub mod request;
pub use request::{Hours, NewRequest, Priority, Request, RequestId, ValidationError};

/// Request lifecycle states and transition rules.
pub mod status;
pub use status::{Status, TransitionError};

/// Effort classification: totals, man-days, sizes and story points.
pub mod effort;
pub use effort::{Size, SizeColor, StoryPoints};

/// Deadline risk evaluation.
pub mod deadline;
pub use deadline::{DeadlineStatus, ScheduleRisk};

mod derived;
pub use derived::{Derived, compute_derived};

/// Aggregated dashboard and report figures.
pub mod dashboard;
pub use dashboard::{DashboardStats, Report};

mod config;
pub use config::{Config, ConfigError};
