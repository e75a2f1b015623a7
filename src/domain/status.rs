//! Request lifecycle.
//!
//! The normal flow is `New → InProgress → Testing → Completed`. A request can
//! be cancelled from any open state. `Completed` and `Cancelled` are terminal:
//! the only way out is an explicit [`Status::reopen`]. `OnHold` exists so that
//! older records still load, and is never entered through a transition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::request::EnumRepr;

/// Lifecycle state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Status {
    /// Waiting to be picked up.
    #[default]
    New,
    /// Being analysed or developed.
    InProgress,
    /// In acceptance testing.
    Testing,
    /// Parked. Only found in older records.
    OnHold,
    /// Delivered.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl Status {
    /// Every state, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::New,
        Self::InProgress,
        Self::Testing,
        Self::OnHold,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Numeric code used by older data files.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::New => 1,
            Self::InProgress => 2,
            Self::Testing => 3,
            Self::OnHold => 4,
            Self::Completed => 5,
            Self::Cancelled => 6,
        }
    }

    /// Maps a numeric code to a state.
    ///
    /// Unknown codes map to [`Status::New`].
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Self::InProgress,
            3 => Self::Testing,
            4 => Self::OnHold,
            5 => Self::Completed,
            6 => Self::Cancelled,
            _ => Self::New,
        }
    }

    /// Variant name, as stored.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "InProgress",
            Self::Testing => "Testing",
            Self::OnHold => "OnHold",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Display text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "Yeni",
            Self::InProgress => "Devam Ediyor",
            Self::Testing => "Test",
            Self::OnHold => "Beklemede",
            Self::Completed => "Tamamlandı",
            Self::Cancelled => "İptal",
        }
    }

    /// Parses a variant name (case-insensitive, `-`/`_` ignored) or a display
    /// label.
    ///
    /// Anything else maps to [`Status::New`].
    #[must_use]
    pub fn from_label(text: &str) -> Self {
        Self::parse(text).unwrap_or_default()
    }

    /// Strict form of [`Status::from_label`].
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let normalized: String = text
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        Self::ALL.into_iter().find(|status| {
            status.name().eq_ignore_ascii_case(&normalized) || status.label() == text
        })
    }

    /// Work is under way.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::InProgress | Self::Testing)
    }

    /// Not started yet.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::New)
    }

    /// Finished, either delivered or abandoned.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the state cannot be left without [`Status::reopen`].
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.is_completed()
    }

    /// Whether a move to `to` is allowed.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.transition_to(to).is_ok()
    }

    /// Moves to `to`.
    ///
    /// # Errors
    ///
    /// Refuses a move to the current state, any move out of a terminal state,
    /// and any move into [`Status::OnHold`].
    pub fn transition_to(self, to: Self) -> Result<Self, TransitionError> {
        if self == to {
            return Err(TransitionError::Unchanged(self));
        }
        if self.is_terminal() {
            return Err(TransitionError::Terminal { from: self, to });
        }
        if to == Self::OnHold {
            return Err(TransitionError::Legacy(to));
        }
        Ok(to)
    }

    /// Reopens a finished request, sending it back to [`Status::New`].
    ///
    /// # Errors
    ///
    /// Only terminal states can be reopened.
    pub const fn reopen(self) -> Result<Self, TransitionError> {
        if self.is_terminal() {
            Ok(Self::New)
        } else {
            Err(TransitionError::NotTerminal(self))
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<EnumRepr> for Status {
    fn from(repr: EnumRepr) -> Self {
        match repr {
            EnumRepr::Code(code) => Self::from_code(code),
            EnumRepr::Name(name) => Self::from_label(&name),
        }
    }
}

impl From<Status> for EnumRepr {
    fn from(status: Status) -> Self {
        Self::Name(status.name().to_string())
    }
}

impl Serialize for Status {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EnumRepr::from(*self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        EnumRepr::deserialize(deserializer).map(Self::from)
    }
}

/// A status change that the lifecycle does not allow.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The request is already in the requested state.
    #[error("request is already {0}")]
    Unchanged(Status),

    /// The request is finished.
    #[error("cannot move from {from} to {to}: reopen the request first")]
    Terminal {
        /// Current state.
        from: Status,
        /// Requested state.
        to: Status,
    },

    /// The requested state is only kept for old records.
    #[error("{0} is no longer used for new transitions")]
    Legacy(Status),

    /// Reopen was requested for a request that is still open.
    #[error("only completed or cancelled requests can be reopened (request is {0})")]
    NotTerminal(Status),
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Status::New, Status::InProgress; "start work")]
    #[test_case(Status::InProgress, Status::Testing; "hand over to testing")]
    #[test_case(Status::Testing, Status::Completed; "deliver")]
    #[test_case(Status::Testing, Status::InProgress; "back to development")]
    #[test_case(Status::New, Status::Cancelled; "cancel before start")]
    #[test_case(Status::Testing, Status::Cancelled; "cancel during testing")]
    #[test_case(Status::OnHold, Status::InProgress; "resume legacy hold")]
    #[test_case(Status::New, Status::Completed; "skip ahead")]
    fn allowed_transitions(from: Status, to: Status) {
        assert!(from.can_transition_to(to));
        assert_eq!(from.transition_to(to), Ok(to));
    }

    #[test]
    fn same_state_is_refused() {
        for status in Status::ALL {
            assert_eq!(
                status.transition_to(status),
                Err(TransitionError::Unchanged(status))
            );
        }
    }

    #[test_case(Status::Completed)]
    #[test_case(Status::Cancelled)]
    fn terminal_states_cannot_be_left(from: Status) {
        for to in Status::ALL.into_iter().filter(|to| *to != from) {
            assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn on_hold_is_not_a_target() {
        assert_eq!(
            Status::InProgress.transition_to(Status::OnHold),
            Err(TransitionError::Legacy(Status::OnHold))
        );
    }

    #[test]
    fn reopen_only_from_terminal() {
        assert_eq!(Status::Completed.reopen(), Ok(Status::New));
        assert_eq!(Status::Cancelled.reopen(), Ok(Status::New));
        assert_eq!(
            Status::Testing.reopen(),
            Err(TransitionError::NotTerminal(Status::Testing))
        );
    }

    #[test_case(Status::New, false, true, false)]
    #[test_case(Status::InProgress, true, false, false)]
    #[test_case(Status::Testing, true, false, false)]
    #[test_case(Status::OnHold, false, false, false)]
    #[test_case(Status::Completed, false, false, true)]
    #[test_case(Status::Cancelled, false, false, true)]
    fn activity_predicates(status: Status, active: bool, pending: bool, completed: bool) {
        assert_eq!(status.is_active(), active);
        assert_eq!(status.is_pending(), pending);
        assert_eq!(status.is_completed(), completed);
    }

    #[test]
    fn codes_round_trip_and_unknown_defaults_to_new() {
        for status in Status::ALL {
            assert_eq!(Status::from_code(status.code()), status);
        }
        assert_eq!(Status::from_code(0), Status::New);
        assert_eq!(Status::from_code(42), Status::New);
    }

    #[test]
    fn labels_and_names_parse() {
        assert_eq!(Status::from_label("in-progress"), Status::InProgress);
        assert_eq!(Status::from_label("Tamamlandı"), Status::Completed);
        assert_eq!(Status::from_label("on_hold"), Status::OnHold);
        assert_eq!(Status::from_label("Havuz"), Status::New);
        assert_eq!(Status::parse("Havuz"), None);
    }
}
