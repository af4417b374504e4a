//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed booking entities and the rules that keep a
//! car's calendar consistent. Types here are transport agnostic; adapters sit
//! behind [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - BookingError: failure taxonomy of booking operations.
//! - Reservation, Car, Notification: the booking aggregates.
//! - BookingService: orchestrator implementing the driving ports.

pub mod booking;
pub mod booking_error;
pub mod booking_service;
pub mod car;
pub mod compensation;
pub mod error;
pub mod ids;
pub mod money;
pub mod notification;
pub mod ports;

pub use self::booking::{
    BookingCalendar, BookingMode, ConflictError, ConflictGuard, ParseReservationStatusError,
    PriceQuote, PricingPolicy, RentalWindow, Reservation, ReservationDraft, ReservationPolicy,
    ReservationStatus, ReservationStatusUpdate, ReservationValidationError, StatusFilter,
    StatusTransitionError, TransitionOutcome,
};
pub use self::booking_error::BookingError;
pub use self::booking_service::{
    BookingRules, BookingService, BookingServicePorts, DECLINED_REASON, SETUP_FAILED_REASON,
};
pub use self::car::{
    Car, CarAvailability, CarDraft, CarValidationError, ParseCarAvailabilityError, RentalPeriod,
};
pub use self::compensation::{
    CompensationOutcome, CompensationPolicy, CompensationRunner, CompensationSleeper,
    TokioSleeper, TransientFailure,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{Actor, CarId, IdValidationError, NotificationId, ReservationId, UserId};
pub use self::money::Money;
pub use self::notification::{NewNotification, Notification, NotificationKind, NotificationPayload};

/// Convenient result alias for booking operations.
///
/// # Examples
/// ```
/// use carshare_backend::domain::{BookingError, BookingResult};
///
/// fn lookup() -> BookingResult<()> {
///     Err(BookingError::forbidden("nope"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type BookingResult<T> = Result<T, BookingError>;
