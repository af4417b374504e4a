//! Reservation status and the legal transitions between statuses.
//!
//! ```text
//! pending ──► confirmed ──► completed
//!    │            │
//!    └──► cancelled ◄┘
//! ```
//!
//! `cancelled` and `completed` are terminal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Awaiting the owner's decision.
    Pending,
    /// Accepted by the owner or booked instantly.
    Confirmed,
    /// Withdrawn, declined or rolled back.
    Cancelled,
    /// Rental finished.
    Completed,
}

/// Result of applying a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The status changed and timestamps were stamped.
    Applied,
    /// The reservation already had the requested status; nothing changed.
    Unchanged,
}

/// Errors raised for disallowed status changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusTransitionError {
    /// The transition is not part of the lifecycle.
    #[error("cannot move reservation from {from} to {to}: {reason}")]
    InvalidTransition {
        /// Current status.
        from: ReservationStatus,
        /// Requested status.
        to: ReservationStatus,
        /// Why the move is disallowed from `from`.
        reason: &'static str,
    },
    /// The reservation is already in a terminal status.
    #[error("reservation is {from} and can no longer change (requested {to})")]
    TerminalStateViolation {
        /// Terminal status held.
        from: ReservationStatus,
        /// Requested status.
        to: ReservationStatus,
    },
}

impl ReservationStatus {
    /// Stable lowercase label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// `cancelled` and `completed` never change again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Pending and confirmed reservations hold the car's calendar.
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Decide whether moving to `target` is legal.
    ///
    /// # Examples
    /// ```
    /// use carshare_backend::domain::{ReservationStatus, TransitionOutcome};
    ///
    /// let pending = ReservationStatus::Pending;
    /// assert_eq!(
    ///     pending.check_transition(ReservationStatus::Confirmed),
    ///     Ok(TransitionOutcome::Applied)
    /// );
    /// assert!(pending.check_transition(ReservationStatus::Completed).is_err());
    /// ```
    pub fn check_transition(
        self,
        target: Self,
    ) -> Result<TransitionOutcome, StatusTransitionError> {
        if self == target {
            return Ok(TransitionOutcome::Unchanged);
        }
        if self.is_terminal() {
            return Err(StatusTransitionError::TerminalStateViolation {
                from: self,
                to: target,
            });
        }

        match (self, target) {
            (Self::Pending, Self::Confirmed | Self::Cancelled)
            | (Self::Confirmed, Self::Completed | Self::Cancelled) => {
                Ok(TransitionOutcome::Applied)
            }
            (Self::Pending, Self::Completed) => Err(StatusTransitionError::InvalidTransition {
                from: self,
                to: target,
                reason: "a booking must be confirmed before it can complete",
            }),
            (_, Self::Pending) => Err(StatusTransitionError::InvalidTransition {
                from: self,
                to: target,
                reason: "bookings never return to pending",
            }),
            _ => Err(StatusTransitionError::InvalidTransition {
                from: self,
                to: target,
                reason: "transition is not part of the booking lifecycle",
            }),
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reservation status: {0}")]
pub struct ParseReservationStatusError(String);

impl FromStr for ReservationStatus {
    type Err = ParseReservationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(ParseReservationStatusError(other.to_owned())),
        }
    }
}

/// Status predicate used by store queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every reservation.
    All,
    /// Pending or confirmed.
    Active,
    /// Cancelled or completed.
    Terminal,
    /// Exactly one status.
    Only(ReservationStatus),
}

impl StatusFilter {
    /// Whether `status` passes the filter.
    pub const fn matches(self, status: ReservationStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status.is_active(),
            Self::Terminal => status.is_terminal(),
            Self::Only(wanted) => wanted as u8 == status as u8,
        }
    }
}
