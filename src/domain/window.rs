//! Inclusive calendar-date windows.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// An inclusive calendar-date range `[start, end]` scoping a query or fetch.
///
/// Construction rejects inverted ranges, so every `DateWindow` in the system
/// is known to be well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window from `start` to `end`, both inclusive.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidWindow`] if `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// A window covering a single day.
    #[must_use]
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The trailing window `[reference - span_days, reference]`.
    #[must_use]
    pub fn trailing(reference: NaiveDate, span_days: u32) -> Self {
        let start = reference
            .checked_sub_days(Days::new(u64::from(span_days)))
            .unwrap_or(NaiveDate::MIN);
        Self {
            start,
            end: reference,
        }
    }

    /// First day of the window.
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// True when `date` falls inside the window (inclusive on both ends).
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, counting both endpoints.
    #[must_use]
    pub fn days(&self) -> u32 {
        let span = (self.end - self.start).num_days() + 1;
        u32::try_from(span).unwrap_or(u32::MAX)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
