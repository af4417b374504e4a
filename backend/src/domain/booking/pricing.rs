//! Rental price quotes.

use serde::Serialize;

use crate::domain::Money;

use super::{RentalWindow, ReservationValidationError};

const DEFAULT_SERVICE_FEE_PERCENT: u32 = 10;

/// Breakdown of a rental price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub billable_days: u64,
    pub subtotal: Money,
    pub service_fee: Money,
    pub total: Money,
}

/// Daily-rate pricing with a percentage service fee on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    service_fee_percent: u32,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_FEE_PERCENT)
    }
}

impl PricingPolicy {
    /// Policy charging `service_fee_percent` on the subtotal.
    pub const fn new(service_fee_percent: u32) -> Self {
        Self {
            service_fee_percent,
        }
    }

    pub const fn service_fee_percent(&self) -> u32 {
        self.service_fee_percent
    }

    /// Price `window` at `daily_rate` per started day plus the service fee.
    ///
    /// # Examples
    /// ```
    /// use carshare_backend::domain::{Money, PricingPolicy, RentalWindow};
    /// use chrono::{TimeZone, Utc};
    ///
    /// let window = RentalWindow::new(
    ///     Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
    ///     Utc.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap(),
    /// );
    /// let quote = PricingPolicy::default()
    ///     .quote(Money::from_major(100), &window)
    ///     .unwrap();
    /// assert_eq!(quote.total, Money::from_major(330));
    /// ```
    pub fn quote(
        &self,
        daily_rate: Money,
        window: &RentalWindow,
    ) -> Result<PriceQuote, ReservationValidationError> {
        let billable_days = window.billable_days();
        let subtotal = daily_rate
            .checked_mul(billable_days)
            .ok_or(ReservationValidationError::PriceOverflow)?;
        let service_fee = subtotal
            .percentage(self.service_fee_percent)
            .ok_or(ReservationValidationError::PriceOverflow)?;
        let total = subtotal
            .checked_add(service_fee)
            .ok_or(ReservationValidationError::PriceOverflow)?;

        Ok(PriceQuote {
            billable_days,
            subtotal,
            service_fee,
            total,
        })
    }
}
