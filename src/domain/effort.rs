//! Effort classification.
//!
//! Converts raw effort hours into the figures shown next to every request:
//! total hours, man-days, a T-shirt [`Size`] and [`StoryPoints`].
//!
//! Every function here is total over finite input. Negative hours are not
//! rejected at this layer; they propagate through the arithmetic. Input
//! validation lives on [`Hours::validate`](crate::Hours::validate).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::Hours;

/// Sum of all effort phases.
///
/// The legacy pre-production field is part of the total.
#[must_use]
pub fn total_hours(hours: &Hours) -> f64 {
    hours.analyst + hours.developer + hours.acceptance_test + hours.preprod
}

/// Converts total hours into man-days.
///
/// The value is unrounded; classification uses it as-is. Use
/// [`round_to_tenth`] for display.
#[must_use]
pub fn man_days(total_hours: f64, workday_hours: f64) -> f64 {
    total_hours / workday_hours
}

/// Rounds to one decimal place, for display.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// T-shirt size of a request, ordered from smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Size {
    /// Up to 5 man-days.
    FastTrack,
    /// Up to 10 man-days.
    XS,
    /// Up to 25 man-days.
    S,
    /// Up to 50 man-days.
    M,
    /// Up to 100 man-days.
    L,
    /// More than 100 man-days.
    XL,
}

impl Size {
    /// Every size, smallest first.
    pub const ALL: [Self; 6] = [Self::FastTrack, Self::XS, Self::S, Self::M, Self::L, Self::XL];

    /// Upper bounds (inclusive) in man-days, checked in ascending order.
    const THRESHOLDS: [(f64, Self); 5] = [
        (5.0, Self::FastTrack),
        (10.0, Self::XS),
        (25.0, Self::S),
        (50.0, Self::M),
        (100.0, Self::L),
    ];

    /// Classifies an unrounded man-day figure.
    #[must_use]
    pub fn classify(man_days: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(limit, _)| man_days <= *limit)
            .map_or(Self::XL, |&(_, size)| size)
    }

    /// Short label, as shown in tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FastTrack => "FastTrack",
            Self::XS => "XS",
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::XL => "XL",
        }
    }

    /// Display colour for this size.
    #[must_use]
    pub const fn color(self) -> SizeColor {
        match self {
            Self::FastTrack | Self::XS => SizeColor::Green,
            Self::S => SizeColor::Yellow,
            Self::M => SizeColor::Orange,
            Self::L => SizeColor::Red,
            Self::XL => SizeColor::Purple,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a size label is not recognised.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown size '{0}': expected one of FastTrack, XS, S, M, L, XL")]
pub struct UnknownSizeError(String);

impl FromStr for Size {
    type Err = UnknownSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSizeError(s.to_string()))
    }
}

/// Colour token attached to a [`Size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeColor {
    /// `FastTrack` and `XS`.
    Green,
    /// `S`.
    Yellow,
    /// `M`.
    Orange,
    /// `L`, and anything unrecognised.
    Red,
    /// `XL`.
    Purple,
}

impl SizeColor {
    /// Colour for a size label.
    ///
    /// Labels that do not name a size fall back to [`SizeColor::Red`].
    #[must_use]
    pub fn for_label(label: &str) -> Self {
        label.parse::<Size>().map_or(Self::Red, Size::color)
    }

    /// Hex colour code.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Green => "#28a745",
            Self::Yellow => "#ffc107",
            Self::Orange => "#fd7e14",
            Self::Red => "#dc3545",
            Self::Purple => "#6f42c1",
        }
    }
}

/// Fibonacci-scale story points derived from total hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StoryPoints(u8);

impl StoryPoints {
    const THRESHOLDS: [(f64, u8); 4] = [(16.0, 3), (24.0, 5), (30.0, 8), (40.0, 13)];
    const MAX: u8 = 21;

    /// Buckets total hours into story points.
    #[must_use]
    pub fn classify(total_hours: f64) -> Self {
        let points = Self::THRESHOLDS
            .iter()
            .find(|(limit, _)| total_hours <= *limit)
            .map_or(Self::MAX, |&(_, points)| points);
        Self(points)
    }

    /// The numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for StoryPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
