//! Reservation entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Car, CarId, Money, ReservationId, UserId};

use super::{
    RentalWindow, ReservationStatus, ReservationValidationError, StatusTransitionError,
    TransitionOutcome,
};

/// How a new reservation enters the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingMode {
    /// Owner must approve; starts `pending`.
    RequestApproval,
    /// Confirmed on creation; starts `confirmed`.
    Instant,
}

impl BookingMode {
    /// Mode configured on a listing.
    pub const fn for_car(car: &Car) -> Self {
        if car.instant_booking() {
            Self::Instant
        } else {
            Self::RequestApproval
        }
    }

    /// Status a fresh reservation starts in.
    pub const fn initial_status(self) -> ReservationStatus {
        match self {
            Self::RequestApproval => ReservationStatus::Pending,
            Self::Instant => ReservationStatus::Confirmed,
        }
    }
}

/// Input payload for [`Reservation::new`].
#[derive(Debug, Clone)]
pub struct ReservationDraft {
    pub id: ReservationId,
    pub requester_id: UserId,
    pub car_id: CarId,
    pub owner_id: UserId,
    pub window: RentalWindow,
    pub total_price: Money,
    pub mode: BookingMode,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mutable status fields written back to the store after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationStatusUpdate {
    pub status: ReservationStatus,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
}

/// A booking of one car by one renter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    id: ReservationId,
    requester_id: UserId,
    car_id: CarId,
    owner_id: UserId,
    window: RentalWindow,
    total_price: Money,
    status: ReservationStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    confirmed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,
}

impl Reservation {
    /// Opens a reservation in the status implied by its booking mode.
    ///
    /// Only structural invariants are checked here; date policy belongs to
    /// [`super::ReservationPolicy`].
    pub fn new(draft: ReservationDraft) -> Result<Self, ReservationValidationError> {
        if draft.window.end() <= draft.window.start() {
            return Err(ReservationValidationError::InvalidRange);
        }

        let status = draft.mode.initial_status();
        let confirmed_at = (status == ReservationStatus::Confirmed).then_some(draft.created_at);
        let notes = draft
            .notes
            .map(|notes| notes.trim().to_owned())
            .filter(|notes| !notes.is_empty());

        Ok(Self {
            id: draft.id,
            requester_id: draft.requester_id,
            car_id: draft.car_id,
            owner_id: draft.owner_id,
            window: draft.window,
            total_price: draft.total_price,
            status,
            notes,
            created_at: draft.created_at,
            updated_at: draft.created_at,
            confirmed_at,
            cancelled_at: None,
            completed_at: None,
            cancellation_reason: None,
        })
    }

    pub const fn id(&self) -> &ReservationId {
        &self.id
    }

    pub const fn requester_id(&self) -> &UserId {
        &self.requester_id
    }

    pub const fn car_id(&self) -> &CarId {
        &self.car_id
    }

    pub const fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub const fn window(&self) -> &RentalWindow {
        &self.window
    }

    pub const fn total_price(&self) -> Money {
        self.total_price
    }

    pub const fn status(&self) -> ReservationStatus {
        self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub const fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub const fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// Whether `user` is the renter or the owner.
    pub fn involves(&self, user: &UserId) -> bool {
        self.requester_id == *user || self.owner_id == *user
    }

    /// The other party of the booking from `user`'s point of view.
    pub fn counterparty_of(&self, user: &UserId) -> UserId {
        if self.requester_id == *user {
            self.owner_id
        } else {
            self.requester_id
        }
    }

    /// Move to `target`, stamping the matching timestamp and `updated_at`.
    ///
    /// Requesting the current status changes nothing.
    pub fn transition_to(
        &mut self,
        target: ReservationStatus,
        at: DateTime<Utc>,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, StatusTransitionError> {
        let outcome = self.status.check_transition(target)?;
        if outcome == TransitionOutcome::Unchanged {
            return Ok(outcome);
        }

        match target {
            ReservationStatus::Confirmed => self.confirmed_at = Some(at),
            ReservationStatus::Cancelled => {
                self.cancelled_at = Some(at);
                self.cancellation_reason = reason;
            }
            ReservationStatus::Completed => self.completed_at = Some(at),
            ReservationStatus::Pending => {}
        }
        self.status = target;
        self.updated_at = at;
        Ok(outcome)
    }

    pub fn confirm(
        &mut self,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StatusTransitionError> {
        self.transition_to(ReservationStatus::Confirmed, at, None)
    }

    pub fn cancel(
        &mut self,
        at: DateTime<Utc>,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, StatusTransitionError> {
        self.transition_to(ReservationStatus::Cancelled, at, reason)
    }

    pub fn complete(
        &mut self,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StatusTransitionError> {
        self.transition_to(ReservationStatus::Completed, at, None)
    }

    /// Snapshot of the status fields for a partial store update.
    pub fn status_update(&self) -> ReservationStatusUpdate {
        ReservationStatusUpdate {
            status: self.status,
            updated_at: self.updated_at,
            confirmed_at: self.confirmed_at,
            cancelled_at: self.cancelled_at,
            completed_at: self.completed_at,
            cancellation_reason: self.cancellation_reason.clone(),
        }
    }

    /// Overwrite status fields from a stored update.
    pub fn apply_status_update(&mut self, update: &ReservationStatusUpdate) {
        self.status = update.status;
        self.updated_at = update.updated_at;
        self.confirmed_at = update.confirmed_at;
        self.cancelled_at = update.cancelled_at;
        self.completed_at = update.completed_at;
        self.cancellation_reason.clone_from(&update.cancellation_reason);
    }
}
