//! Terminal capability detection and colouring

use efor::{DeadlineStatus, ScheduleRisk, Size, SizeColor};
use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if terminal is narrow (< 60 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 60)
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as danger (red)
    fn danger(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
    /// Color in the display colour of a size band
    fn sized(&self, size: Size) -> String;
    /// Color by deadline tier
    fn deadline(&self, status: DeadlineStatus) -> String;
    /// Color by schedule risk
    fn risk(&self, risk: ScheduleRisk) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn danger(&self) -> String {
        if supports_color() {
            self.fg::<css::Red>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }

    fn sized(&self, size: Size) -> String {
        if !supports_color() {
            return self.to_string();
        }
        match size.color() {
            SizeColor::Green => self.fg::<css::Green>().to_string(),
            SizeColor::Yellow => self.fg::<css::Gold>().to_string(),
            SizeColor::Orange => self.fg::<css::Orange>().to_string(),
            SizeColor::Red => self.fg::<css::Red>().to_string(),
            SizeColor::Purple => self.fg::<css::MediumPurple>().to_string(),
        }
    }

    fn deadline(&self, status: DeadlineStatus) -> String {
        match status {
            DeadlineStatus::Overdue => self.danger(),
            DeadlineStatus::Critical => self.warning(),
            DeadlineStatus::Warning | DeadlineStatus::Caution => {
                if supports_color() {
                    self.fg::<css::Gold>().to_string()
                } else {
                    self.to_string()
                }
            }
            DeadlineStatus::Normal => self.to_string(),
        }
    }

    fn risk(&self, risk: ScheduleRisk) -> String {
        match risk {
            ScheduleRisk::Normal => self.success(),
            ScheduleRisk::Warning => self.warning(),
            ScheduleRisk::Overdue => self.danger(),
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn danger(&self) -> String {
        self.as_str().danger()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }

    fn sized(&self, size: Size) -> String {
        self.as_str().sized(size)
    }

    fn deadline(&self, status: DeadlineStatus) -> String {
        self.as_str().deadline(status)
    }

    fn risk(&self, risk: ScheduleRisk) -> String {
        self.as_str().risk(risk)
    }
}
