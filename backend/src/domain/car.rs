//! Car listings as seen by the booking core.
//!
//! Listings are owned by the catalog; the booking core reads them and only
//! ever changes [`CarAvailability`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{CarId, Money, UserId};

/// Validation errors raised by [`Car::new`] and [`RentalPeriod::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CarValidationError {
    /// Brand or model was blank.
    #[error("car {field} must not be blank")]
    BlankField {
        /// Offending field name.
        field: &'static str,
    },
    /// Daily rate was zero.
    #[error("car daily rate must be positive")]
    ZeroDailyRate,
    /// A rental period bound was zero days.
    #[error("rental period bounds must be at least one day")]
    ZeroRentalDays,
    /// The minimum rental period exceeds the maximum.
    #[error("minimum rental period ({min_days} days) exceeds maximum ({max_days} days)")]
    InvertedRentalPeriod {
        /// Requested minimum days.
        min_days: u32,
        /// Requested maximum days.
        max_days: u32,
    },
}

/// Whether a car can currently be handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarAvailability {
    /// Free to be booked.
    Available,
    /// Handed over to a renter.
    Rented,
    /// Withdrawn by the owner.
    Maintenance,
}

impl CarAvailability {
    /// Stable lowercase label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Rented => "rented",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for CarAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown availability label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown car availability: {0}")]
pub struct ParseCarAvailabilityError(String);

impl FromStr for CarAvailability {
    type Err = ParseCarAvailabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "rented" => Ok(Self::Rented),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(ParseCarAvailabilityError(other.to_owned())),
        }
    }
}

/// Owner-defined bounds on how long a single rental may last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalPeriod {
    min_days: u32,
    max_days: u32,
}

impl RentalPeriod {
    /// Validate and construct a rental period.
    pub fn new(min_days: u32, max_days: u32) -> Result<Self, CarValidationError> {
        if min_days == 0 || max_days == 0 {
            return Err(CarValidationError::ZeroRentalDays);
        }
        if min_days > max_days {
            return Err(CarValidationError::InvertedRentalPeriod { min_days, max_days });
        }
        Ok(Self { min_days, max_days })
    }

    /// Shortest rental in days.
    pub const fn min_days(self) -> u32 {
        self.min_days
    }

    /// Longest rental in days.
    pub const fn max_days(self) -> u32 {
        self.max_days
    }
}

/// Input payload for [`Car::new`].
#[derive(Debug, Clone)]
pub struct CarDraft {
    pub id: CarId,
    pub owner_id: UserId,
    pub brand: String,
    pub model: String,
    pub year: u16,
    pub daily_rate: Money,
    pub specs: BTreeMap<String, String>,
    pub availability: CarAvailability,
    pub instant_booking: bool,
    pub rental_period: RentalPeriod,
}

/// A listed car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    id: CarId,
    owner_id: UserId,
    brand: String,
    model: String,
    year: u16,
    daily_rate: Money,
    specs: BTreeMap<String, String>,
    availability: CarAvailability,
    instant_booking: bool,
    rental_period: RentalPeriod,
}

impl Car {
    /// Creates a validated car listing.
    pub fn new(draft: CarDraft) -> Result<Self, CarValidationError> {
        if draft.brand.trim().is_empty() {
            return Err(CarValidationError::BlankField { field: "brand" });
        }
        if draft.model.trim().is_empty() {
            return Err(CarValidationError::BlankField { field: "model" });
        }
        if draft.daily_rate == Money::ZERO {
            return Err(CarValidationError::ZeroDailyRate);
        }

        Ok(Self {
            id: draft.id,
            owner_id: draft.owner_id,
            brand: draft.brand,
            model: draft.model,
            year: draft.year,
            daily_rate: draft.daily_rate,
            specs: draft.specs,
            availability: draft.availability,
            instant_booking: draft.instant_booking,
            rental_period: draft.rental_period,
        })
    }

    pub const fn id(&self) -> &CarId {
        &self.id
    }

    pub const fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn brand(&self) -> &str {
        self.brand.as_str()
    }

    pub fn model(&self) -> &str {
        self.model.as_str()
    }

    pub const fn year(&self) -> u16 {
        self.year
    }

    pub const fn daily_rate(&self) -> Money {
        self.daily_rate
    }

    pub const fn specs(&self) -> &BTreeMap<String, String> {
        &self.specs
    }

    pub const fn availability(&self) -> CarAvailability {
        self.availability
    }

    /// Whether requests are confirmed without owner approval.
    pub const fn instant_booking(&self) -> bool {
        self.instant_booking
    }

    pub const fn rental_period(&self) -> RentalPeriod {
        self.rental_period
    }

    /// Human-readable "brand model" label used in notifications.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    /// Returns the same listing with a different availability.
    #[must_use]
    pub fn with_availability(mut self, availability: CarAvailability) -> Self {
        self.availability = availability;
        self
    }
}
