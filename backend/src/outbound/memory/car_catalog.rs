//! In-memory car catalog.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{CarCatalog, CarCatalogError};
use crate::domain::{Car, CarAvailability, CarId};

use super::{ScriptedFailures, lock_state};

#[derive(Default)]
struct CatalogState {
    cars: HashMap<CarId, Car>,
    availability_failures: ScriptedFailures<CarCatalogError>,
}

/// Car catalog backed by a map.
#[derive(Default)]
pub struct InMemoryCarCatalog {
    state: Mutex<CatalogState>,
}

impl InMemoryCarCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with `cars`.
    pub fn with_cars(cars: impl IntoIterator<Item = Car>) -> Self {
        let catalog = Self::new();
        for car in cars {
            catalog.add(car);
        }
        catalog
    }

    /// Insert or replace a listing.
    pub fn add(&self, car: Car) {
        if let Ok(mut state) = self.state.lock() {
            state.cars.insert(*car.id(), car);
        }
    }

    /// Current availability of a car, if listed.
    pub fn availability_of(&self, car_id: &CarId) -> Option<CarAvailability> {
        let state = self.state.lock().ok()?;
        state.cars.get(car_id).map(Car::availability)
    }

    /// Make the next availability write fail with `error`.
    pub fn fail_next_availability_update(&self, error: CarCatalogError) {
        if let Ok(mut state) = self.state.lock() {
            state.availability_failures.push(error);
        }
    }
}

#[async_trait]
impl CarCatalog for InMemoryCarCatalog {
    async fn find_by_id(&self, car_id: &CarId) -> Result<Option<Car>, CarCatalogError> {
        let state = lock_state(&self.state, |m| CarCatalogError::query(m))?;
        Ok(state.cars.get(car_id).cloned())
    }

    async fn update_availability(
        &self,
        car_id: &CarId,
        availability: CarAvailability,
    ) -> Result<(), CarCatalogError> {
        let mut state = lock_state(&self.state, |m| CarCatalogError::query(m))?;
        state.availability_failures.take()?;

        let car = state
            .cars
            .remove(car_id)
            .ok_or_else(|| CarCatalogError::not_found(*car_id))?;
        debug!(
            car_id = %car_id,
            from = %car.availability(),
            to = %availability,
            "car availability updated"
        );
        state.cars.insert(*car_id, car.with_availability(availability));
        Ok(())
    }
}
