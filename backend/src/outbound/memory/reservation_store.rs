//! In-memory reservation store.
//!
//! Rows live in an arena with an id index and a unique index over open
//! `(renter, car)` pairs. The guarded insert runs the conflict rules and the
//! write under the same lock, so two racing requests for overlapping dates
//! cannot both land.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{ReservationRepository, ReservationRepositoryError};
use crate::domain::{
    CarId, ConflictError, ConflictGuard, Reservation, ReservationId, ReservationStatus,
    ReservationStatusUpdate, StatusFilter, UserId,
};

use super::{ScriptedFailures, lock_state};

#[derive(Default)]
struct StoreState {
    rows: Vec<Reservation>,
    by_id: HashMap<ReservationId, usize>,
    open_pairs: HashMap<(UserId, CarId), ReservationId>,
    insert_failures: ScriptedFailures<ReservationRepositoryError>,
    update_failures: ScriptedFailures<ReservationRepositoryError>,
}

impl StoreState {
    fn listed(
        &self,
        keep: impl Fn(&Reservation) -> bool,
        filter: StatusFilter,
    ) -> Vec<Reservation> {
        self.rows
            .iter()
            .filter(|r| keep(r) && filter.matches(r.status()))
            .cloned()
            .collect()
    }
}

/// Reservation store backed by process memory.
#[derive(Default)]
pub struct InMemoryReservationStore {
    state: Mutex<StoreState>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next insert fail with `error`.
    pub fn fail_next_insert(&self, error: ReservationRepositoryError) {
        if let Ok(mut state) = self.state.lock() {
            state.insert_failures.push(error);
        }
    }

    /// Make the next status update fail with `error`.
    pub fn fail_next_status_update(&self, error: ReservationRepositoryError) {
        if let Ok(mut state) = self.state.lock() {
            state.update_failures.push(error);
        }
    }

    /// Number of stored reservations in any status.
    pub fn len(&self) -> usize {
        self.state.lock().map(|state| state.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationStore {
    async fn insert(
        &self,
        reservation: &Reservation,
        guard: &ConflictGuard,
    ) -> Result<(), ReservationRepositoryError> {
        let mut state = lock_state(&self.state, |m| ReservationRepositoryError::query(m))?;
        state.insert_failures.take()?;

        if state.by_id.contains_key(reservation.id()) {
            return Err(ReservationRepositoryError::query(format!(
                "reservation {} already exists",
                reservation.id()
            )));
        }

        let pair = (*reservation.requester_id(), *reservation.car_id());
        if reservation.status().is_active() {
            if let Some(existing) = state.open_pairs.get(&pair) {
                return Err(ReservationRepositoryError::conflict(
                    ConflictError::DuplicatePendingRequest {
                        reservation_id: *existing,
                    },
                ));
            }
        }

        if let Err(conflict) = guard.check(&state.rows, reservation) {
            debug!(
                reservation_id = %reservation.id(),
                car_id = %reservation.car_id(),
                reason = conflict.reason(),
                "guarded insert rejected"
            );
            return Err(ReservationRepositoryError::conflict(conflict));
        }

        let index = state.rows.len();
        state.rows.push(reservation.clone());
        state.by_id.insert(*reservation.id(), index);
        if reservation.status().is_active() {
            state.open_pairs.insert(pair, *reservation.id());
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        let state = lock_state(&self.state, |m| ReservationRepositoryError::query(m))?;
        Ok(state
            .by_id
            .get(reservation_id)
            .and_then(|index| state.rows.get(*index))
            .cloned())
    }

    async fn update_status(
        &self,
        reservation_id: &ReservationId,
        update: &ReservationStatusUpdate,
        expected: ReservationStatus,
    ) -> Result<(), ReservationRepositoryError> {
        let mut guard = lock_state(&self.state, |m| ReservationRepositoryError::query(m))?;
        let state = &mut *guard;
        state.update_failures.take()?;

        let row = state
            .by_id
            .get(reservation_id)
            .and_then(|index| state.rows.get_mut(*index))
            .ok_or_else(|| ReservationRepositoryError::not_found(*reservation_id))?;
        if row.status() != expected {
            return Err(ReservationRepositoryError::stale_status(row.status()));
        }

        row.apply_status_update(update);
        if !update.status.is_active() {
            let pair = (*row.requester_id(), *row.car_id());
            if state.open_pairs.get(&pair) == Some(reservation_id) {
                state.open_pairs.remove(&pair);
            }
        }
        Ok(())
    }

    async fn list_for_car(
        &self,
        car_id: &CarId,
        filter: StatusFilter,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        let state = lock_state(&self.state, |m| ReservationRepositoryError::query(m))?;
        Ok(state.listed(|r| r.car_id() == car_id, filter))
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: StatusFilter,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        let state = lock_state(&self.state, |m| ReservationRepositoryError::query(m))?;
        Ok(state.listed(|r| r.requester_id() == user_id, filter))
    }
}
