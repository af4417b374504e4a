//! Booking orchestration service.
//!
//! This service owns the booking workflow across three driven ports:
//! - conflict, validation and pricing checks before anything is written;
//! - a guarded insert so the conflict check and the write are atomic;
//! - car availability updates, with compensating writes on failure;
//! - counterparty notifications, which never fail the command.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BookingCommand, BookingQuery, BookingReceipt, CarCatalog, CarCatalogError,
    CreateBookingRequest, DecisionOutcome, NotificationSink, NotificationSinkError,
    ReservationRepository, ReservationRepositoryError, ReservationScope, StepOutcome,
};
use crate::domain::{
    Actor, BookingCalendar, BookingError, BookingMode, Car, CarAvailability, CarId,
    CompensationOutcome, CompensationRunner, ConflictError, ConflictGuard, NewNotification,
    Notification, NotificationId, NotificationKind, PricingPolicy, RentalWindow, Reservation,
    ReservationDraft, ReservationId, ReservationPolicy, ReservationStatus, StatusFilter,
    TransitionOutcome,
};

/// Cancellation reason recorded when an instant booking is rolled back.
pub const SETUP_FAILED_REASON: &str = "booking setup failed";
/// Cancellation reason recorded when an owner declines without a reason.
pub const DECLINED_REASON: &str = "declined by owner";

fn map_catalog_error(error: CarCatalogError) -> BookingError {
    match error {
        CarCatalogError::NotFound { car_id } => BookingError::not_found("car", car_id),
        other => BookingError::dependency("car catalog", other),
    }
}

fn map_repository_error(error: ReservationRepositoryError) -> BookingError {
    match error {
        ReservationRepositoryError::NotFound { reservation_id } => {
            BookingError::not_found("reservation", reservation_id)
        }
        ReservationRepositoryError::Conflict { conflict } => BookingError::Conflict(conflict),
        ReservationRepositoryError::StaleStatus { current } => {
            BookingError::ConcurrentModification { current }
        }
        other => BookingError::dependency("reservation store", other),
    }
}

fn map_sink_error(error: NotificationSinkError) -> BookingError {
    match error {
        NotificationSinkError::NotFound { notification_id } => {
            BookingError::not_found("notification", notification_id)
        }
        other => BookingError::dependency("notification sink", other),
    }
}

fn already_handled_message(status: ReservationStatus) -> &'static str {
    match status {
        ReservationStatus::Pending => "still pending",
        ReservationStatus::Confirmed => "already approved",
        ReservationStatus::Cancelled => "already cancelled",
        ReservationStatus::Completed => "already completed",
    }
}

fn already_handled(reservation_id: ReservationId, status: ReservationStatus) -> DecisionOutcome {
    DecisionOutcome::AlreadyHandled {
        reservation_id,
        status,
        message: already_handled_message(status).to_owned(),
    }
}

fn newest_first(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    reservations.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
    reservations
}

/// Date, duration and pricing rules applied to every booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingRules {
    pub policy: ReservationPolicy,
    pub pricing: PricingPolicy,
    pub calendar: BookingCalendar,
}

/// Port bundle required by the booking service.
pub struct BookingServicePorts<C, R, N> {
    /// Car listings and availability.
    pub catalog: Arc<C>,
    /// Reservation persistence.
    pub reservations: Arc<R>,
    /// Notification storage.
    pub notifications: Arc<N>,
}

impl<C, R, N> BookingServicePorts<C, R, N> {
    /// Build a strongly-typed port bundle.
    pub fn new(catalog: Arc<C>, reservations: Arc<R>, notifications: Arc<N>) -> Self {
        Self {
            catalog,
            reservations,
            notifications,
        }
    }
}

/// Booking service implementing the command and query driving ports.
pub struct BookingService<C, R, N> {
    catalog: Arc<C>,
    reservations: Arc<R>,
    notifications: Arc<N>,
    clock: Arc<dyn Clock>,
    rules: BookingRules,
    compensation: CompensationRunner,
}

impl<C, R, N> Clone for BookingService<C, R, N> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            reservations: Arc::clone(&self.reservations),
            notifications: Arc::clone(&self.notifications),
            clock: Arc::clone(&self.clock),
            rules: self.rules,
            compensation: self.compensation.clone(),
        }
    }
}

impl<C, R, N> BookingService<C, R, N> {
    /// Create a service with default rules and compensation policy.
    pub fn new(ports: BookingServicePorts<C, R, N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog: ports.catalog,
            reservations: ports.reservations,
            notifications: ports.notifications,
            clock,
            rules: BookingRules::default(),
            compensation: CompensationRunner::default(),
        }
    }

    /// Replace the booking rules.
    pub fn with_rules(mut self, rules: BookingRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the compensation runner.
    pub fn with_compensation(mut self, compensation: CompensationRunner) -> Self {
        self.compensation = compensation;
        self
    }

    pub const fn rules(&self) -> &BookingRules {
        &self.rules
    }
}

impl<C, R, N> BookingService<C, R, N>
where
    C: CarCatalog,
    R: ReservationRepository,
    N: NotificationSink,
{
    async fn load_car(&self, car_id: &CarId) -> Result<Car, BookingError> {
        self.catalog
            .find_by_id(car_id)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(|| BookingError::not_found("car", car_id))
    }

    async fn load_reservation(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Reservation, BookingError> {
        self.reservations
            .find_by_id(reservation_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| BookingError::not_found("reservation", reservation_id))
    }

    /// Loads the booking request behind `notification_id` and checks that
    /// `actor` may decide on it.
    async fn load_decision(
        &self,
        actor: &Actor,
        notification_id: &NotificationId,
    ) -> Result<(Notification, Reservation), BookingError> {
        let notification = self
            .notifications
            .find_by_id(notification_id)
            .await
            .map_err(map_sink_error)?
            .ok_or_else(|| BookingError::not_found("notification", notification_id))?;

        if notification.user_id() != actor.user_id() {
            return Err(BookingError::forbidden(
                "only the recipient can act on this booking request",
            ));
        }
        if notification.kind() != NotificationKind::BookingRequest {
            return Err(BookingError::InvalidNotification {
                message: format!("expected booking_request, found {}", notification.kind()),
            });
        }
        let payload = notification
            .payload()
            .map_err(|err| BookingError::InvalidNotification {
                message: err.to_string(),
            })?;

        let reservation = self.load_reservation(&payload.booking_id).await?;
        if reservation.owner_id() != actor.user_id() {
            return Err(BookingError::forbidden(
                "only the car owner can decide on this booking",
            ));
        }
        Ok((notification, reservation))
    }

    async fn dispatch(
        &self,
        notification: NewNotification,
        reservation_id: &ReservationId,
    ) -> StepOutcome {
        let recipient = notification.user_id;
        let kind = notification.kind;
        match self.notifications.create(notification).await {
            Ok(notification_id) => {
                debug!(
                    reservation_id = %reservation_id,
                    recipient = %recipient,
                    kind = %kind,
                    notification_id = %notification_id,
                    "notification dispatched"
                );
                StepOutcome::Applied
            }
            Err(err) => {
                warn!(
                    reservation_id = %reservation_id,
                    recipient = %recipient,
                    kind = %kind,
                    error = %err,
                    "notification dispatch failed"
                );
                StepOutcome::failed(err)
            }
        }
    }

    async fn acknowledge(&self, notification_id: &NotificationId) -> StepOutcome {
        match self.notifications.mark_read(notification_id).await {
            Ok(()) => StepOutcome::Applied,
            Err(err) => {
                warn!(
                    notification_id = %notification_id,
                    error = %err,
                    "failed to mark booking request as read"
                );
                StepOutcome::failed(err)
            }
        }
    }

    async fn acknowledge_handled(
        &self,
        notification: &Notification,
        reservation_id: ReservationId,
        status: ReservationStatus,
    ) -> DecisionOutcome {
        info!(
            reservation_id = %reservation_id,
            status = %status,
            "booking request was already handled"
        );
        self.acknowledge(notification.id()).await;
        already_handled(reservation_id, status)
    }

    /// Marks the car rented after an instant booking, cancelling the fresh
    /// reservation when that fails.
    async fn rent_out_instant_booking(
        &self,
        reservation: &Reservation,
    ) -> Result<StepOutcome, BookingError> {
        let Err(cause) = self
            .catalog
            .update_availability(reservation.car_id(), CarAvailability::Rented)
            .await
        else {
            return Ok(StepOutcome::Applied);
        };

        warn!(
            reservation_id = %reservation.id(),
            car_id = %reservation.car_id(),
            error = %cause,
            "car availability update failed; cancelling instant booking"
        );

        let mut rolled_back = reservation.clone();
        rolled_back.cancel(self.clock.utc(), Some(SETUP_FAILED_REASON.to_owned()))?;
        let update = rolled_back.status_update();
        let expected = reservation.status();

        let outcome = self
            .compensation
            .run("cancel_reservation", || {
                self.reservations
                    .update_status(reservation.id(), &update, expected)
            })
            .await;

        Err(match outcome {
            CompensationOutcome::Applied { .. } => map_catalog_error(cause),
            CompensationOutcome::Exhausted {
                last_error: error, ..
            }
            | CompensationOutcome::Aborted { error, .. } => BookingError::SetupFailed {
                reservation_id: *reservation.id(),
                message: format!("{cause}; rollback failed: {error}"),
            },
        })
    }

    /// Puts the car back to `previous` after a failed approval.
    async fn restore_availability(
        &self,
        reservation: &Reservation,
        previous: CarAvailability,
        cause: BookingError,
    ) -> BookingError {
        warn!(
            reservation_id = %reservation.id(),
            car_id = %reservation.car_id(),
            error = %cause,
            "approval failed after renting out the car; restoring availability"
        );
        let outcome = self
            .compensation
            .run("restore_car_availability", || {
                self.catalog
                    .update_availability(reservation.car_id(), previous)
            })
            .await;

        match outcome {
            CompensationOutcome::Applied { .. } => cause,
            CompensationOutcome::Exhausted {
                last_error: error, ..
            }
            | CompensationOutcome::Aborted { error, .. } => BookingError::SetupFailed {
                reservation_id: *reservation.id(),
                message: format!("{cause}; availability restore failed: {error}"),
            },
        }
    }

    /// Returns a rented car to `available` once it has no confirmed
    /// bookings left.
    async fn release_car(&self, car_id: &CarId) -> StepOutcome {
        let still_booked = match self
            .reservations
            .list_for_car(car_id, StatusFilter::Only(ReservationStatus::Confirmed))
            .await
        {
            Ok(confirmed) => !confirmed.is_empty(),
            Err(err) => return self.release_failed(car_id, &err),
        };
        if still_booked {
            return StepOutcome::Skipped;
        }

        match self.catalog.find_by_id(car_id).await {
            Ok(Some(car)) if car.availability() == CarAvailability::Rented => {}
            Ok(_) => return StepOutcome::Skipped,
            Err(err) => return self.release_failed(car_id, &err),
        }

        match self
            .catalog
            .update_availability(car_id, CarAvailability::Available)
            .await
        {
            Ok(()) => StepOutcome::Applied,
            Err(err) => self.release_failed(car_id, &err),
        }
    }

    fn release_failed(&self, car_id: &CarId, err: &dyn std::error::Error) -> StepOutcome {
        warn!(car_id = %car_id, error = %err, "failed to release car after booking ended");
        StepOutcome::failed(err)
    }

    async fn decide(
        &self,
        actor: &Actor,
        notification_id: &NotificationId,
        decision: Decision,
    ) -> Result<DecisionOutcome, BookingError> {
        let (notification, reservation) = self.load_decision(actor, notification_id).await?;
        if reservation.status() != ReservationStatus::Pending {
            return Ok(self
                .acknowledge_handled(&notification, *reservation.id(), reservation.status())
                .await);
        }

        let now = self.clock.utc();
        let mut decided = reservation.clone();
        let previous_availability = match &decision {
            Decision::Approve => {
                let car = self.load_car(reservation.car_id()).await?;
                if car.availability() == CarAvailability::Maintenance {
                    return Err(ConflictError::CarUnavailable {
                        availability: car.availability(),
                    }
                    .into());
                }
                decided.confirm(now)?;
                self.catalog
                    .update_availability(reservation.car_id(), CarAvailability::Rented)
                    .await
                    .map_err(map_catalog_error)?;
                Some(car.availability())
            }
            Decision::Reject { reason } => {
                let reason = reason
                    .clone()
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| DECLINED_REASON.to_owned());
                decided.cancel(now, Some(reason))?;
                None
            }
        };

        if let Err(err) = self
            .reservations
            .update_status(
                reservation.id(),
                &decided.status_update(),
                ReservationStatus::Pending,
            )
            .await
        {
            let stale = match &err {
                ReservationRepositoryError::StaleStatus { current } => Some(*current),
                _ => None,
            };
            let mapped = map_repository_error(err);
            // A concurrent approval already rented the car out.
            let car_kept_by_winner = stale == Some(ReservationStatus::Confirmed);
            let mapped = match previous_availability {
                Some(previous) if !car_kept_by_winner => {
                    self.restore_availability(&reservation, previous, mapped)
                        .await
                }
                _ => mapped,
            };
            return match stale {
                Some(current) if matches!(mapped, BookingError::ConcurrentModification { .. }) => {
                    Ok(self
                        .acknowledge_handled(&notification, *reservation.id(), current)
                        .await)
                }
                _ => Err(mapped),
            };
        }

        let acknowledgement = self.acknowledge(notification.id()).await;
        let calendar = &self.rules.calendar;
        let (availability, notice) = match decision {
            Decision::Approve => {
                info!(
                    reservation_id = %decided.id(),
                    car_id = %decided.car_id(),
                    "booking approved"
                );
                (
                    StepOutcome::Applied,
                    NewNotification::booking_approved(&decided, calendar, now),
                )
            }
            Decision::Reject { .. } => {
                info!(
                    reservation_id = %decided.id(),
                    car_id = %decided.car_id(),
                    "booking declined"
                );
                (
                    StepOutcome::Skipped,
                    NewNotification::booking_declined(&decided, calendar, now),
                )
            }
        };
        let notification = self.dispatch(notice, decided.id()).await;

        Ok(DecisionOutcome::Applied {
            receipt: BookingReceipt {
                reservation: decided,
                availability,
                notification,
            },
            acknowledgement,
        })
    }
}

enum Decision {
    Approve,
    Reject { reason: Option<String> },
}

#[async_trait]
impl<C, R, N> BookingCommand for BookingService<C, R, N>
where
    C: CarCatalog,
    R: ReservationRepository,
    N: NotificationSink,
{
    async fn create_booking(
        &self,
        actor: &Actor,
        request: CreateBookingRequest,
    ) -> Result<BookingReceipt, BookingError> {
        let now = self.clock.utc();
        let requester = *actor.user_id();

        let car = self.load_car(&request.car_id).await?;
        if car.owner_id() == &requester {
            return Err(BookingError::forbidden("owners cannot book their own car"));
        }
        if car.availability() == CarAvailability::Maintenance {
            return Err(ConflictError::CarUnavailable {
                availability: car.availability(),
            }
            .into());
        }

        let mode = BookingMode::for_car(&car);
        let guard = ConflictGuard::new(self.rules.calendar, mode);
        let active = self
            .reservations
            .list_for_car(car.id(), StatusFilter::Active)
            .await
            .map_err(map_repository_error)?;
        guard.ensure_no_duplicate(&active, &requester)?;
        guard.ensure_instant_booking_clear(&active, &requester)?;

        let window = RentalWindow::new(request.start, request.end);
        let quote = self.rules.pricing.quote(car.daily_rate(), &window)?;
        self.rules
            .policy
            .validate(&window, now, &self.rules.calendar)?;
        self.rules
            .policy
            .check_rental_period(car.rental_period(), &window)?;
        guard.ensure_no_overlap(&active, &window)?;

        let reservation = Reservation::new(ReservationDraft {
            id: ReservationId::random(),
            requester_id: requester,
            car_id: *car.id(),
            owner_id: *car.owner_id(),
            window,
            total_price: quote.total,
            mode,
            notes: request.notes,
            created_at: now,
        })?;
        self.reservations
            .insert(&reservation, &guard)
            .await
            .map_err(map_repository_error)?;

        info!(
            reservation_id = %reservation.id(),
            car_id = %reservation.car_id(),
            requester_id = %requester,
            status = %reservation.status(),
            total = %reservation.total_price(),
            "booking created"
        );

        let (availability, notice) = match mode {
            BookingMode::Instant => (
                self.rent_out_instant_booking(&reservation).await?,
                NewNotification::booked_instantly(&reservation, &car, &self.rules.calendar, now),
            ),
            BookingMode::RequestApproval => (
                StepOutcome::Skipped,
                NewNotification::booking_requested(&reservation, &car, &self.rules.calendar, now),
            ),
        };
        let notification = self.dispatch(notice, reservation.id()).await;

        Ok(BookingReceipt {
            reservation,
            availability,
            notification,
        })
    }

    async fn approve_booking(
        &self,
        actor: &Actor,
        notification_id: &NotificationId,
    ) -> Result<DecisionOutcome, BookingError> {
        self.decide(actor, notification_id, Decision::Approve).await
    }

    async fn reject_booking(
        &self,
        actor: &Actor,
        notification_id: &NotificationId,
        reason: Option<String>,
    ) -> Result<DecisionOutcome, BookingError> {
        self.decide(actor, notification_id, Decision::Reject { reason })
            .await
    }

    async fn cancel_booking(
        &self,
        actor: &Actor,
        reservation_id: &ReservationId,
        reason: Option<String>,
    ) -> Result<BookingReceipt, BookingError> {
        let reservation = self.load_reservation(reservation_id).await?;
        if !reservation.involves(actor.user_id()) {
            return Err(BookingError::forbidden(
                "only the renter or the owner can cancel this booking",
            ));
        }

        let now = self.clock.utc();
        let mut cancelled = reservation.clone();
        if cancelled.cancel(now, reason)? == TransitionOutcome::Unchanged {
            return Ok(BookingReceipt {
                reservation,
                availability: StepOutcome::Skipped,
                notification: StepOutcome::Skipped,
            });
        }

        self.reservations
            .update_status(reservation_id, &cancelled.status_update(), reservation.status())
            .await
            .map_err(map_repository_error)?;

        info!(
            reservation_id = %reservation_id,
            cancelled_by = %actor.user_id(),
            previous_status = %reservation.status(),
            "booking cancelled"
        );

        let availability = if reservation.status() == ReservationStatus::Confirmed {
            self.release_car(cancelled.car_id()).await
        } else {
            StepOutcome::Skipped
        };
        let notice = NewNotification::booking_cancelled(
            cancelled.counterparty_of(actor.user_id()),
            &cancelled,
            &self.rules.calendar,
            now,
        );
        let notification = self.dispatch(notice, reservation_id).await;

        Ok(BookingReceipt {
            reservation: cancelled,
            availability,
            notification,
        })
    }

    async fn complete_booking(
        &self,
        actor: &Actor,
        reservation_id: &ReservationId,
    ) -> Result<BookingReceipt, BookingError> {
        let reservation = self.load_reservation(reservation_id).await?;
        if reservation.owner_id() != actor.user_id() {
            return Err(BookingError::forbidden(
                "only the car owner can complete this booking",
            ));
        }

        let mut completed = reservation.clone();
        if completed.complete(self.clock.utc())? == TransitionOutcome::Unchanged {
            return Ok(BookingReceipt {
                reservation,
                availability: StepOutcome::Skipped,
                notification: StepOutcome::Skipped,
            });
        }

        self.reservations
            .update_status(reservation_id, &completed.status_update(), reservation.status())
            .await
            .map_err(map_repository_error)?;

        info!(reservation_id = %reservation_id, "booking completed");

        let availability = self.release_car(completed.car_id()).await;
        Ok(BookingReceipt {
            reservation: completed,
            availability,
            notification: StepOutcome::Skipped,
        })
    }
}

#[async_trait]
impl<C, R, N> BookingQuery for BookingService<C, R, N>
where
    C: CarCatalog,
    R: ReservationRepository,
    N: NotificationSink,
{
    async fn car_booking_history(
        &self,
        actor: &Actor,
        car_id: &CarId,
    ) -> Result<Vec<Reservation>, BookingError> {
        let car = self.load_car(car_id).await?;
        if car.owner_id() != actor.user_id() {
            return Err(BookingError::forbidden(
                "only the car owner can view its booking history",
            ));
        }
        let reservations = self
            .reservations
            .list_for_car(car_id, StatusFilter::All)
            .await
            .map_err(map_repository_error)?;
        Ok(newest_first(reservations))
    }

    async fn user_reservations(
        &self,
        actor: &Actor,
        scope: ReservationScope,
    ) -> Result<Vec<Reservation>, BookingError> {
        let reservations = self
            .reservations
            .list_for_user(actor.user_id(), scope.filter())
            .await
            .map_err(map_repository_error)?;
        Ok(newest_first(reservations))
    }

    async fn notifications_for_user(
        &self,
        actor: &Actor,
    ) -> Result<Vec<Notification>, BookingError> {
        self.notifications
            .list_for_user(actor.user_id())
            .await
            .map_err(map_sink_error)
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
