//! Monetary amounts held in integer minor units.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An amount of money in minor currency units (cents).
///
/// Arithmetic is checked; callers decide how overflow surfaces.
///
/// # Examples
/// ```
/// use carshare_backend::domain::Money;
///
/// let rate = Money::from_major(100);
/// assert_eq!(rate.percentage(10), Some(Money::from_major(10)));
/// assert_eq!(rate.to_string(), "100.00");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero in any currency.
    pub const ZERO: Self = Self(0);

    /// Build from minor units.
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Build from whole major units.
    pub const fn from_major(major: u32) -> Self {
        Self(major as u64 * 100)
    }

    /// Minor units held.
    pub const fn minor_units(self) -> u64 {
        self.0
    }

    /// Sum of two amounts, `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Amount multiplied by a whole factor, `None` on overflow.
    pub fn checked_mul(self, factor: u64) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    /// `percent` percent of the amount, rounded half up to the nearest minor
    /// unit.
    pub fn percentage(self, percent: u32) -> Option<Self> {
        self.0
            .checked_mul(u64::from(percent))?
            .checked_add(50)?
            .checked_div(100)
            .map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0.div_euclid(100), self.0.rem_euclid(100))
    }
}
