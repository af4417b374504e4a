//! Port for reading car listings and updating their availability.
//!
//! Listings are owned elsewhere; the booking core only ever flips
//! `availability`.

use async_trait::async_trait;

use crate::domain::{Car, CarAvailability, CarId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by car catalog adapters.
    pub enum CarCatalogError {
        /// Catalog connection could not be established.
        [transient] Connection { message: String } =>
            "car catalog connection failed: {message}",
        /// Query or mutation failed during execution.
        [transient] Query { message: String } =>
            "car catalog query failed: {message}",
        /// The car does not exist.
        NotFound { car_id: CarId } =>
            "car {car_id} was not found",
    }
}

/// Port for car lookups and availability writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarCatalog: Send + Sync {
    /// Find a car by id.
    async fn find_by_id(&self, car_id: &CarId) -> Result<Option<Car>, CarCatalogError>;

    /// Overwrite the car's availability flag.
    async fn update_availability(
        &self,
        car_id: &CarId,
        availability: CarAvailability,
    ) -> Result<(), CarCatalogError>;
}

/// Fixture implementation for tests that do not exercise the catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCarCatalog;

#[async_trait]
impl CarCatalog for FixtureCarCatalog {
    async fn find_by_id(&self, _car_id: &CarId) -> Result<Option<Car>, CarCatalogError> {
        Ok(None)
    }

    async fn update_availability(
        &self,
        _car_id: &CarId,
        _availability: CarAvailability,
    ) -> Result<(), CarCatalogError> {
        Ok(())
    }
}
