//! Requested rental windows.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: u64 = 86_400;

/// A requested `[start, end]` rental window.
///
/// Construction does not validate ordering; [`super::ReservationPolicy`]
/// owns that so each rule reports its own reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl RentalWindow {
    /// Window from `start` to `end`.
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Elapsed time between start and end; negative for inverted windows.
    pub fn elapsed(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Started 24-hour periods covered by the window, zero when inverted.
    pub fn billable_days(&self) -> u64 {
        let elapsed = self.elapsed();
        let whole_seconds = u64::try_from(elapsed.num_seconds()).unwrap_or(0);
        // A started second counts toward the next day.
        let started = whole_seconds + u64::from(elapsed.subsec_nanos() > 0);
        started.div_ceil(SECONDS_PER_DAY)
    }
}
