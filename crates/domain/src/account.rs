//! Administrator account value types and validity rules.

use chrono::{Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult};

/// Storage and form format for account timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Editor-side format hint matching [`DATETIME_FORMAT`].
pub const DATETIME_EDITOR_FORMAT: &str = "YYYY-MM-DD HH:mm:ss";

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN_LENGTH: usize = 5;

/// Maximum accepted password length in characters.
pub const PASSWORD_MAX_LENGTH: usize = 20;

/// Operator-facing message when the window end is not after its start.
pub const END_AFTER_START_MESSAGE: &str = "end time must be later than start time";

/// Operator-facing message when the window is longer than one year.
pub const WINDOW_WITHIN_YEAR_MESSAGE: &str = "validity period cannot exceed one year";

/// Unique identifier for an administrator account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    /// Creates an account identifier from its storage value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the storage value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Parses a timestamp submitted in [`DATETIME_FORMAT`].
pub fn parse_datetime(value: &str) -> AppResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_FORMAT).map_err(|error| {
        AppError::Validation(format!(
            "'{value}' is not a valid date time (expected YYYY-MM-DD HH:MM:SS): {error}"
        ))
    })
}

/// Formats a timestamp in [`DATETIME_FORMAT`].
#[must_use]
pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Reason a validity window was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowViolation {
    /// End is equal to or earlier than start.
    EndNotAfterStart,
    /// End lies more than one year after start.
    ExceedsOneYear,
}

/// Period during which an account may sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl ValidityWindow {
    /// Creates a validated window.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, WindowViolation> {
        if end <= start {
            return Err(WindowViolation::EndNotAfterStart);
        }

        if !within_one_year(start, end) {
            return Err(WindowViolation::ExceedsOneYear);
        }

        Ok(Self { start, end })
    }

    /// Returns the window start.
    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Returns the window end.
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

/// Returns whether `end` is at most twelve calendar months after `start`.
#[must_use]
pub fn within_one_year(start: NaiveDateTime, end: NaiveDateTime) -> bool {
    start
        .checked_add_months(Months::new(12))
        .is_some_and(|latest_end| end <= latest_end)
}
