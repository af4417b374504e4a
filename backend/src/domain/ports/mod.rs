//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod booking_command;
mod booking_query;
mod car_catalog;
mod notification_sink;
mod reservation_repository;

pub use booking_command::{
    BookingCommand, BookingReceipt, CreateBookingRequest, DecisionOutcome, StepOutcome,
};
pub use booking_query::{BookingQuery, ReservationScope};
#[cfg(test)]
pub use car_catalog::MockCarCatalog;
pub use car_catalog::{CarCatalog, CarCatalogError, FixtureCarCatalog};
#[cfg(test)]
pub use notification_sink::MockNotificationSink;
pub use notification_sink::{FixtureNotificationSink, NotificationSink, NotificationSinkError};
#[cfg(test)]
pub use reservation_repository::MockReservationRepository;
pub use reservation_repository::{
    FixtureReservationRepository, ReservationRepository, ReservationRepositoryError,
};
