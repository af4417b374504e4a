//! Date and duration rules a rental window must satisfy.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::RentalPeriod;

use super::{BookingCalendar, RentalWindow};

const DEFAULT_MIN_HOURS: u32 = 24;
const DEFAULT_MAX_DAYS: u32 = 30;
const HOURS_PER_DAY: i64 = 24;

/// Validation errors for requested windows and quotes.
///
/// Global rules are listed in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationValidationError {
    #[error("rental cannot start before today")]
    PastStartDate,
    #[error("rental end must be after its start")]
    InvalidRange,
    #[error("rental must last at least {minimum_hours} hours")]
    BelowMinimumDuration { minimum_hours: i64 },
    #[error("rental must not exceed {maximum_hours} hours")]
    AboveMaximumDuration { maximum_hours: i64 },
    #[error("this car must be rented for at least {min_days} days")]
    BelowCarMinimum { min_days: u32 },
    #[error("this car can be rented for at most {max_days} days")]
    AboveCarMaximum { max_days: u32 },
    #[error("rental price exceeds the supported range")]
    PriceOverflow,
}

impl ReservationValidationError {
    /// Stable snake_case reason for adapters.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::PastStartDate => "past_start_date",
            Self::InvalidRange => "invalid_range",
            Self::BelowMinimumDuration { .. } => "below_minimum_duration",
            Self::AboveMaximumDuration { .. } => "above_maximum_duration",
            Self::BelowCarMinimum { .. } => "below_car_minimum",
            Self::AboveCarMaximum { .. } => "above_car_maximum",
            Self::PriceOverflow => "price_overflow",
        }
    }
}

/// Marketplace-wide duration bounds.
///
/// Durations are measured in elapsed time, never in rounded days, and the
/// per-car [`RentalPeriod`] check uses the same unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationPolicy {
    min_duration: TimeDelta,
    max_duration: TimeDelta,
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self {
            min_duration: TimeDelta::hours(i64::from(DEFAULT_MIN_HOURS)),
            max_duration: TimeDelta::hours(i64::from(DEFAULT_MAX_DAYS) * HOURS_PER_DAY),
        }
    }
}

impl ReservationPolicy {
    /// Policy with explicit bounds; `None` when the minimum is zero or longer
    /// than the maximum.
    pub fn from_bounds(min_hours: u32, max_days: u32) -> Option<Self> {
        let min_duration = TimeDelta::hours(i64::from(min_hours));
        let max_duration = TimeDelta::hours(i64::from(max_days) * HOURS_PER_DAY);
        (min_hours > 0 && min_duration <= max_duration).then_some(Self {
            min_duration,
            max_duration,
        })
    }

    pub const fn min_duration(&self) -> TimeDelta {
        self.min_duration
    }

    pub const fn max_duration(&self) -> TimeDelta {
        self.max_duration
    }

    /// Check the global rules in order, failing on the first broken one.
    pub fn validate(
        &self,
        window: &RentalWindow,
        now: DateTime<Utc>,
        calendar: &BookingCalendar,
    ) -> Result<(), ReservationValidationError> {
        if calendar.date_of(window.start()) < calendar.date_of(now) {
            return Err(ReservationValidationError::PastStartDate);
        }
        if window.end() <= window.start() {
            return Err(ReservationValidationError::InvalidRange);
        }

        let elapsed = window.elapsed();
        if elapsed < self.min_duration {
            return Err(ReservationValidationError::BelowMinimumDuration {
                minimum_hours: self.min_duration.num_hours(),
            });
        }
        if elapsed > self.max_duration {
            return Err(ReservationValidationError::AboveMaximumDuration {
                maximum_hours: self.max_duration.num_hours(),
            });
        }
        Ok(())
    }

    /// Check a window against a car's own rental period, in elapsed hours.
    pub fn check_rental_period(
        &self,
        period: RentalPeriod,
        window: &RentalWindow,
    ) -> Result<(), ReservationValidationError> {
        let elapsed = window.elapsed();
        if elapsed < TimeDelta::hours(i64::from(period.min_days()) * HOURS_PER_DAY) {
            return Err(ReservationValidationError::BelowCarMinimum {
                min_days: period.min_days(),
            });
        }
        if elapsed > TimeDelta::hours(i64::from(period.max_days()) * HOURS_PER_DAY) {
            return Err(ReservationValidationError::AboveCarMaximum {
                max_days: period.max_days(),
            });
        }
        Ok(())
    }
}
