//! Validated analysis requests.

use chrono::NaiveDate;

use super::id::{Channel, Topic};
use super::window::DateWindow;
use crate::error::DomainError;

/// The semantic key for any coverage or fetch decision: one topic on one
/// channel over one inclusive date window.
///
/// Window validation happens here, so an inverted range is rejected before it
/// can reach coverage resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicWindowRequest {
    pub topic: Topic,
    pub channel: Channel,
    pub window: DateWindow,
}

impl TopicWindowRequest {
    /// Build a request for an explicit window.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidWindow`] if `start > end`.
    pub fn new(
        topic: Topic,
        channel: Channel,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            topic,
            channel,
            window: DateWindow::new(start, end)?,
        })
    }

    /// Build a request for the trailing `window_days` ending at `reference`.
    #[must_use]
    pub fn trailing(topic: Topic, channel: Channel, reference: NaiveDate, window_days: u32) -> Self {
        Self {
            topic,
            channel,
            window: DateWindow::trailing(reference, window_days),
        }
    }
}
