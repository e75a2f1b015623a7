//! Effort tracking for internal work requests.
//!
//! Requests carry effort hours per phase. The domain layer turns those hours
//! into sizes, story points and deadline risk; the storage layer keeps the
//! requests in a JSON file under a tracker root.

pub mod domain;
pub use domain::{
    Config, DashboardStats, DeadlineStatus, Derived, Hours, NewRequest, Priority, Report, Request,
    RequestId, ScheduleRisk, Size, SizeColor, Status, StoryPoints, TransitionError,
    ValidationError,
};

/// Persistence collaborators for requests.
pub mod storage;
pub use storage::{Directory, JsonFileStore, MemoryStore, RequestStore, StoreError};
