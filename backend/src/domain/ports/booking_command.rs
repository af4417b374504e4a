//! Driving port for booking mutations.
//!
//! Every command names its [`Actor`] explicitly. Receipts report each side
//! effect as a [`StepOutcome`] so callers can tell which steps were applied,
//! skipped, or failed without being rolled back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Actor, BookingError, CarId, NotificationId, Reservation, ReservationId, ReservationStatus,
};

/// Request to book a car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub car_id: CarId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// What happened to one side effect of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum StepOutcome {
    /// The step ran and succeeded.
    Applied,
    /// The step did not apply to this command.
    Skipped,
    /// The step failed and the failure was tolerated.
    Failed { message: String },
}

impl StepOutcome {
    pub fn failed(message: impl ToString) -> Self {
        Self::Failed {
            message: message.to_string(),
        }
    }

    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Result of a command that changed a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub reservation: Reservation,
    /// Car availability write.
    pub availability: StepOutcome,
    /// Notice to the other party.
    pub notification: StepOutcome,
}

/// Result of an owner's decision on a booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum DecisionOutcome {
    /// The reservation moved to the decided status.
    Applied {
        receipt: BookingReceipt,
        /// Marking the request notification read.
        acknowledgement: StepOutcome,
    },
    /// The request had already left `pending`; nothing changed.
    #[serde(rename_all = "camelCase")]
    AlreadyHandled {
        reservation_id: ReservationId,
        status: ReservationStatus,
        message: String,
    },
}

/// Driving port for booking write operations.
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Books a car for `actor`.
    ///
    /// Instant-booking cars come back `confirmed` with the car marked rented;
    /// every other car comes back `pending` and the owner is asked to decide.
    async fn create_booking(
        &self,
        actor: &Actor,
        request: CreateBookingRequest,
    ) -> Result<BookingReceipt, BookingError>;

    /// Owner approves the request carried by `notification_id`.
    async fn approve_booking(
        &self,
        actor: &Actor,
        notification_id: &NotificationId,
    ) -> Result<DecisionOutcome, BookingError>;

    /// Owner declines the request carried by `notification_id`.
    async fn reject_booking(
        &self,
        actor: &Actor,
        notification_id: &NotificationId,
        reason: Option<String>,
    ) -> Result<DecisionOutcome, BookingError>;

    /// Either party cancels an open booking.
    async fn cancel_booking(
        &self,
        actor: &Actor,
        reservation_id: &ReservationId,
        reason: Option<String>,
    ) -> Result<BookingReceipt, BookingError>;

    /// Owner closes a confirmed booking after the rental.
    async fn complete_booking(
        &self,
        actor: &Actor,
        reservation_id: &ReservationId,
    ) -> Result<BookingReceipt, BookingError>;
}
