//! Coverage verdicts: does stored data satisfy a requested window?

use chrono::{Days, NaiveDate};

use super::window::DateWindow;

/// Classification of whether already-stored data satisfies a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// The requested window is a subset of the stored span; nothing to fetch.
    Full,
    /// Stored data covers part of the request; `window` is the narrowed
    /// remainder that still needs fetching.
    Partial { window: DateWindow },
    /// Nothing usable is stored; `window` is the full original request.
    Missing { window: DateWindow },
}

impl Coverage {
    /// True when no fetch is required.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }

    /// The window that still needs fetching, if any.
    #[must_use]
    pub const fn fetch_window(&self) -> Option<&DateWindow> {
        match self {
            Self::Full => None,
            Self::Partial { window } | Self::Missing { window } => Some(window),
        }
    }
}

/// Classify a requested window against the stored span for a topic/channel.
///
/// `stored` is the `[db_min, db_max]` span of event dates already persisted,
/// or `None` when no rows exist. The rules:
///
/// - no stored rows, or a span disjoint from the request, yield `Missing`
///   with the entire request (stitching a disjoint gap is not attempted);
/// - a stored span enclosing the request yields `Full`;
/// - a stored span that is a strict interior subset of the request (gaps on
///   both sides) conservatively yields `Partial` with the entire request,
///   since refilling an interior hole precisely is ambiguous and costs no
///   more than a clean refetch;
/// - a request extending only into the past narrows to `[start, db_min - 1]`;
/// - a request extending only into the future narrows to `[db_max + 1, end]`;
/// - a narrowed window that would invert normalizes to `Full`.
#[must_use]
pub fn classify(requested: &DateWindow, stored: Option<(NaiveDate, NaiveDate)>) -> Coverage {
    let Some((db_min, db_max)) = stored else {
        return Coverage::Missing { window: *requested };
    };

    if db_max < requested.start() || db_min > requested.end() {
        return Coverage::Missing { window: *requested };
    }

    if db_min <= requested.start() && db_max >= requested.end() {
        return Coverage::Full;
    }

    if db_min > requested.start() && db_max < requested.end() {
        return Coverage::Partial { window: *requested };
    }

    let narrowed = if requested.start() < db_min {
        DateWindow::new(
            requested.start(),
            db_min.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN),
        )
    } else {
        DateWindow::new(
            db_max.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX),
            requested.end(),
        )
    };

    match narrowed {
        Ok(window) => Coverage::Partial { window },
        // Inverted narrowing means nothing new is actually needed.
        Err(_) => Coverage::Full,
    }
}
