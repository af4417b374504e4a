//! Booking core for a peer-to-peer car rental marketplace.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the booking rules,
//! the orchestrating service and its ports, while [`outbound`] provides
//! adapters behind those ports. [`settings`] loads the booking rules from
//! configuration and [`telemetry`] installs the tracing subscriber.

pub mod domain;
pub mod outbound;
pub mod settings;
pub mod telemetry;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
