//! Booking configuration loaded via OrthoConfig.
//!
//! Every field carries the marketplace default. Accessors reject
//! combinations the domain cannot honour.

use std::time::Duration;

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    BookingCalendar, BookingRules, CompensationPolicy, PricingPolicy, ReservationPolicy,
};

const MAX_CALENDAR_OFFSET_MINUTES: i32 = 14 * 60;

/// Invalid booking configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("rental bounds are invalid: minimum {min_hours}h, maximum {max_days} days")]
    RentalBounds { min_hours: u32, max_days: u32 },
    #[error("calendar offset {minutes} minutes is outside ±14 hours")]
    CalendarOffset { minutes: i32 },
    #[error("compensation needs at least one attempt")]
    CompensationAttempts,
    #[error("compensation backoff {initial_ms}ms exceeds its cap of {max_ms}ms")]
    CompensationBackoff { initial_ms: u64, max_ms: u64 },
}

/// Configuration values for the booking core.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOKING")]
pub struct BookingSettings {
    /// Shortest rental accepted, in hours.
    #[ortho_config(default = 24)]
    pub min_rental_hours: u32,
    /// Longest rental accepted, in days.
    #[ortho_config(default = 30)]
    pub max_rental_days: u32,
    /// Service fee charged on top of the subtotal.
    #[ortho_config(default = 10)]
    pub service_fee_percent: u32,
    /// UTC offset of the marketplace calendar.
    #[ortho_config(default = 0)]
    pub calendar_offset_minutes: i32,
    /// Attempts for compensating writes, including the first.
    #[ortho_config(default = 3)]
    pub compensation_max_attempts: u32,
    /// Delay before the first compensation retry.
    #[ortho_config(default = 100)]
    pub compensation_initial_backoff_ms: u64,
    /// Cap on compensation retry delays.
    #[ortho_config(default = 2_000)]
    pub compensation_max_backoff_ms: u64,
}

impl BookingSettings {
    pub fn reservation_policy(&self) -> Result<ReservationPolicy, SettingsError> {
        let min_hours = self.min_rental_hours;
        let max_days = self.max_rental_days;
        ReservationPolicy::from_bounds(min_hours, max_days)
            .ok_or(SettingsError::RentalBounds {
                min_hours,
                max_days,
            })
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy::new(self.service_fee_percent)
    }

    /// Calendar used to compare booking days.
    pub fn calendar(&self) -> Result<BookingCalendar, SettingsError> {
        let minutes = self.calendar_offset_minutes;
        if minutes.abs() > MAX_CALENDAR_OFFSET_MINUTES {
            return Err(SettingsError::CalendarOffset { minutes });
        }
        FixedOffset::east_opt(minutes * 60)
            .map(BookingCalendar::with_offset)
            .ok_or(SettingsError::CalendarOffset { minutes })
    }

    pub fn compensation_policy(&self) -> Result<CompensationPolicy, SettingsError> {
        let max_attempts = self.compensation_max_attempts;
        if max_attempts == 0 {
            return Err(SettingsError::CompensationAttempts);
        }
        let initial_ms = self.compensation_initial_backoff_ms;
        let max_ms = self.compensation_max_backoff_ms;
        if initial_ms > max_ms {
            return Err(SettingsError::CompensationBackoff { initial_ms, max_ms });
        }
        Ok(CompensationPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(initial_ms),
            max_backoff: Duration::from_millis(max_ms),
        })
    }

    /// Reservation, pricing and calendar rules in one bundle.
    pub fn booking_rules(&self) -> Result<BookingRules, SettingsError> {
        Ok(BookingRules {
            policy: self.reservation_policy()?,
            pricing: self.pricing_policy(),
            calendar: self.calendar()?,
        })
    }
}
