//! Driving port for booking reads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Actor, BookingError, CarId, Notification, Reservation, StatusFilter};

/// Which of a renter's reservations to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationScope {
    /// Pending or confirmed.
    Active,
    /// Cancelled or completed.
    Past,
}

impl ReservationScope {
    pub const fn filter(self) -> StatusFilter {
        match self {
            Self::Active => StatusFilter::Active,
            Self::Past => StatusFilter::Terminal,
        }
    }
}

/// Driving port for booking read operations.
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// Every reservation of a car, newest first. Owner only.
    async fn car_booking_history(
        &self,
        actor: &Actor,
        car_id: &CarId,
    ) -> Result<Vec<Reservation>, BookingError>;

    /// The actor's own reservations in `scope`, newest first.
    async fn user_reservations(
        &self,
        actor: &Actor,
        scope: ReservationScope,
    ) -> Result<Vec<Reservation>, BookingError>;

    /// Notifications addressed to the actor, newest first.
    async fn notifications_for_user(
        &self,
        actor: &Actor,
    ) -> Result<Vec<Notification>, BookingError>;
}
