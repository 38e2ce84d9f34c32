//! Lookback windows for metric and billing queries
//!
//! A [`TimeWindow`] is the half-open interval `[start, end)` a report run
//! collects samples over. Metric queries anchor the window at "now"; billing
//! queries need UTC day boundaries, so they use [`WindowAlignment::UtcDay`].
//!
//! # Examples
//!
//! ```
//! use cloudcost_core::time_window::{TimeWindow, WindowAlignment};
//! use chrono::{TimeZone, Utc};
//!
//! let anchor = Utc.with_ymd_and_hms(2024, 3, 8, 15, 30, 0).unwrap();
//! let window = TimeWindow::last_n_days(7, anchor, WindowAlignment::UtcDay).unwrap();
//!
//! assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
//! assert_eq!(window.end(), Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap());
//! assert_eq!(window.length_days(), 7.0);
//! ```

use crate::error::{CloudcostError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// How the end of a lookback window is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAlignment {
    /// End exactly at the anchor instant
    Now,
    /// End at midnight UTC of the anchor's day
    UtcDay,
}

/// Half-open lookback interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window covering the `n` days before `anchor`
    ///
    /// # Errors
    ///
    /// Returns [`CloudcostError::ContractViolation`] when `n` is zero or
    /// reaches before the earliest representable instant.
    pub fn last_n_days(n: u32, anchor: DateTime<Utc>, alignment: WindowAlignment) -> Result<Self> {
        if n < 1 {
            return Err(CloudcostError::ContractViolation(
                "lookback window must cover at least one day".to_string(),
            ));
        }

        let end = match alignment {
            WindowAlignment::Now => anchor,
            WindowAlignment::UtcDay => day_floor(anchor),
        };
        let start = end
            .checked_sub_signed(Duration::days(i64::from(n)))
            .ok_or_else(|| {
                CloudcostError::ContractViolation(format!(
                    "lookback of {n} days is out of range"
                ))
            })?;

        Ok(Self { start, end })
    }

    /// Inclusive start instant
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end instant
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Window length in (possibly fractional) days
    pub fn length_days(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / MILLIS_PER_DAY
    }

    /// Number of whole buckets of `bucket_seconds` that fit in the window
    pub fn bucket_count(&self, bucket_seconds: u64) -> u64 {
        if bucket_seconds == 0 {
            return 0;
        }
        let seconds = (self.end - self.start).num_seconds().max(0) as u64;
        seconds / bucket_seconds
    }

    /// Whether `instant` falls inside `[start, end)`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// UTC calendar date of the start, as billing APIs expect
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// UTC calendar date of the (exclusive) end
    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }
}

/// Midnight UTC of the day containing `instant`
pub fn day_floor(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}
