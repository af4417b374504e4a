//! Port for reservation persistence.
//!
//! Writes are guarded: `insert` re-runs the conflict rules and the write in
//! one atomic step, and `update_status` only applies when the stored status
//! still matches what the caller read.

use async_trait::async_trait;

use crate::domain::{
    CarId, ConflictError, ConflictGuard, Reservation, ReservationId, ReservationStatus,
    ReservationStatusUpdate, StatusFilter, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reservation repository adapters.
    pub enum ReservationRepositoryError {
        /// Repository connection could not be established.
        [transient] Connection { message: String } =>
            "reservation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        [transient] Query { message: String } =>
            "reservation repository query failed: {message}",
        /// No reservation has the requested id.
        NotFound { reservation_id: ReservationId } =>
            "reservation {reservation_id} was not found",
        /// The guarded insert found a competing reservation.
        Conflict { conflict: ConflictError } =>
            "reservation conflicts with existing bookings: {conflict}",
        /// The stored status moved on since the caller read it.
        StaleStatus { current: ReservationStatus } =>
            "reservation status changed concurrently to {current}",
    }
}

/// Port for reading and writing reservations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Store a new reservation if `guard` still admits it against the
    /// car's current reservations.
    async fn insert(
        &self,
        reservation: &Reservation,
        guard: &ConflictGuard,
    ) -> Result<(), ReservationRepositoryError>;

    /// Find a reservation by id.
    async fn find_by_id(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError>;

    /// Write status fields when the stored status equals `expected`.
    async fn update_status(
        &self,
        reservation_id: &ReservationId,
        update: &ReservationStatusUpdate,
        expected: ReservationStatus,
    ) -> Result<(), ReservationRepositoryError>;

    /// Reservations of one car.
    async fn list_for_car(
        &self,
        car_id: &CarId,
        filter: StatusFilter,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError>;

    /// Reservations requested by one user.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: StatusFilter,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReservationRepository;

#[async_trait]
impl ReservationRepository for FixtureReservationRepository {
    async fn insert(
        &self,
        _reservation: &Reservation,
        _guard: &ConflictGuard,
    ) -> Result<(), ReservationRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _reservation_id: &ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        Ok(None)
    }

    async fn update_status(
        &self,
        reservation_id: &ReservationId,
        _update: &ReservationStatusUpdate,
        _expected: ReservationStatus,
    ) -> Result<(), ReservationRepositoryError> {
        Err(ReservationRepositoryError::not_found(*reservation_id))
    }

    async fn list_for_car(
        &self,
        _car_id: &CarId,
        _filter: StatusFilter,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
        _filter: StatusFilter,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        Ok(Vec::new())
    }
}
