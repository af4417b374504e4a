//! Rules that keep a car's calendar free of competing reservations.
//!
//! The same [`ConflictGuard`] runs twice: once in the booking service as a
//! fast pre-check, and again inside the store's insert so that the check and
//! the write happen in one critical section.

use crate::domain::{CarAvailability, ReservationId, UserId};

use super::{BookingCalendar, BookingMode, RentalWindow, Reservation};

/// Reasons a new reservation collides with existing ones.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("you already have an open booking request for this car")]
    DuplicatePendingRequest { reservation_id: ReservationId },
    #[error("this car books instantly and has {outstanding} outstanding request(s)")]
    InstantBookingBlocked { outstanding: usize },
    #[error("the car is already booked for overlapping dates")]
    DateRangeConflict { conflicting_id: ReservationId },
    #[error("the car is not available for booking ({availability})")]
    CarUnavailable { availability: CarAvailability },
}

impl ConflictError {
    /// Stable snake_case reason for adapters.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::DuplicatePendingRequest { .. } => "duplicate_pending_request",
            Self::InstantBookingBlocked { .. } => "instant_booking_blocked",
            Self::DateRangeConflict { .. } => "date_range_conflict",
            Self::CarUnavailable { .. } => "car_unavailable",
        }
    }
}

/// Conflict rules for booking one car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictGuard {
    calendar: BookingCalendar,
    mode: BookingMode,
}

impl ConflictGuard {
    /// Guard for a car booked in `mode`, comparing dates in `calendar`.
    pub const fn new(calendar: BookingCalendar, mode: BookingMode) -> Self {
        Self { calendar, mode }
    }

    pub const fn mode(&self) -> BookingMode {
        self.mode
    }

    /// A renter may hold at most one open reservation per car.
    pub fn ensure_no_duplicate(
        &self,
        existing: &[Reservation],
        requester: &UserId,
    ) -> Result<(), ConflictError> {
        match existing
            .iter()
            .find(|r| r.status().is_active() && r.requester_id() == requester)
        {
            Some(found) => Err(ConflictError::DuplicatePendingRequest {
                reservation_id: *found.id(),
            }),
            None => Ok(()),
        }
    }

    /// Instant-booking cars must have no outstanding reservations at all.
    pub fn ensure_instant_booking_clear(
        &self,
        existing: &[Reservation],
        requester: &UserId,
    ) -> Result<(), ConflictError> {
        if self.mode != BookingMode::Instant {
            return Ok(());
        }
        let outstanding = existing
            .iter()
            .filter(|r| r.status().is_active() && r.requester_id() != requester)
            .count();
        if outstanding > 0 {
            return Err(ConflictError::InstantBookingBlocked { outstanding });
        }
        Ok(())
    }

    /// No open reservation may share a calendar day with `window`.
    pub fn ensure_no_overlap(
        &self,
        existing: &[Reservation],
        window: &RentalWindow,
    ) -> Result<(), ConflictError> {
        match existing.iter().find(|r| {
            r.status().is_active() && self.calendar.windows_overlap(r.window(), window)
        }) {
            Some(found) => Err(ConflictError::DateRangeConflict {
                conflicting_id: *found.id(),
            }),
            None => Ok(()),
        }
    }

    /// Every rule, in order, against reservations of the candidate's car.
    pub fn check(
        &self,
        existing: &[Reservation],
        candidate: &Reservation,
    ) -> Result<(), ConflictError> {
        let same_car: Vec<Reservation> = existing
            .iter()
            .filter(|r| r.car_id() == candidate.car_id() && r.id() != candidate.id())
            .cloned()
            .collect();

        self.ensure_no_duplicate(&same_car, candidate.requester_id())?;
        self.ensure_instant_booking_clear(&same_car, candidate.requester_id())?;
        self.ensure_no_overlap(&same_car, candidate.window())
    }
}
