//! Reservation rules: windows, overlap, validation, pricing and status.
//!
//! Everything here is pure. Persistence and side effects live behind the
//! ports and in [`crate::domain::BookingService`].

mod calendar;
mod conflict;
mod pricing;
mod reservation;
mod status;
#[cfg(test)]
mod tests;
mod validator;
mod window;

pub use calendar::BookingCalendar;
pub use conflict::{ConflictError, ConflictGuard};
pub use pricing::{PriceQuote, PricingPolicy};
pub use reservation::{BookingMode, Reservation, ReservationDraft, ReservationStatusUpdate};
pub use status::{
    ParseReservationStatusError, ReservationStatus, StatusFilter, StatusTransitionError,
    TransitionOutcome,
};
pub use validator::{ReservationPolicy, ReservationValidationError};
pub use window::RentalWindow;
