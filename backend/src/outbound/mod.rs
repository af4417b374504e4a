//! Outbound adapters implementing domain ports.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of the booking core's driven ports:
//!
//! - **memory**: process-local car catalog, reservation store and
//!   notification sink, used for local wiring and behaviour tests
//!
//! Adapters are thin translators between domain types and their storage.
//! They contain no business logic beyond the atomic guards the ports demand.

pub mod memory;
