//! Scenario-world methods for booking lifecycle BDD tests.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use carshare_backend::domain::ports::{
    BookingCommand, BookingReceipt, CreateBookingRequest, NotificationSink,
    ReservationRepository,
};
use carshare_backend::domain::{
    Actor, BookingError, BookingService, BookingServicePorts, Car, CarAvailability, CarDraft,
    CarId, CompensationPolicy, CompensationRunner, Money, Notification, NotificationKind,
    RentalPeriod, Reservation, StatusFilter, UserId,
};
use carshare_backend::outbound::memory::{
    InMemoryCarCatalog, InMemoryNotificationSink, InMemoryReservationStore,
};
use carshare_backend::test_support::{ImmediateSleeper, MutableClock};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use tokio::runtime::Runtime;

use crate::{BookingWorld, RuntimeHandle};

/// Scenario clock: 2025-05-20 09:00 UTC, before every scenario date.
fn scenario_now() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 5, 20)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid scenario time")
        .and_utc()
}

/// Pick-up and drop-off happen at 10:00 UTC.
pub fn at_ten(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(10, 0, 0)
        .expect("valid time of day")
        .and_utc()
}

impl BookingWorld {
    /// List one car and wire a service around fresh in-memory adapters.
    pub fn list_car(&self, instant_booking: bool) {
        let runtime = Runtime::new().expect("create runtime");
        let owner = UserId::random();
        let car = Car::new(CarDraft {
            id: CarId::random(),
            owner_id: owner,
            brand: "Volvo".to_owned(),
            model: "XC40".to_owned(),
            year: 2022,
            daily_rate: Money::from_major(100),
            specs: BTreeMap::from([("seats".to_owned(), "5".to_owned())]),
            availability: CarAvailability::Available,
            instant_booking,
            rental_period: RentalPeriod::new(1, 14).expect("valid rental period"),
        })
        .expect("valid car");

        let clock = Arc::new(MutableClock::new(scenario_now()));
        let catalog = Arc::new(InMemoryCarCatalog::with_cars([car.clone()]));
        let store = Arc::new(InMemoryReservationStore::new());
        let sink = Arc::new(InMemoryNotificationSink::new());
        let service = BookingService::new(
            BookingServicePorts::new(catalog.clone(), store.clone(), sink.clone()),
            clock.clone(),
        )
        .with_compensation(CompensationRunner::new(
            CompensationPolicy::default(),
            Arc::new(ImmediateSleeper),
        ));

        self.runtime.set(RuntimeHandle(Arc::new(runtime)));
        self.clock.set(clock);
        self.catalog.set(catalog);
        self.store.set(store);
        self.sink.set(sink);
        self.service.set(Arc::new(service));
        self.car.set(car);
        self.renter.set(UserId::random());
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        let RuntimeHandle(runtime) = self.runtime.get().expect("runtime should be set");
        runtime.block_on(future)
    }

    pub fn car(&self) -> Car {
        self.car.get().expect("car should be listed")
    }

    pub fn owner(&self) -> Actor {
        Actor::new(*self.car().owner_id())
    }

    pub fn renter(&self) -> Actor {
        Actor::new(self.renter.get().expect("renter should be set"))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.get().expect("clock should be set").utc()
    }

    /// Submit a booking request for the listed car.
    pub fn request_as(
        &self,
        actor: &Actor,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BookingReceipt, BookingError> {
        let service = self.service.get().expect("service should be set");
        let request = CreateBookingRequest {
            car_id: *self.car().id(),
            start,
            end,
            notes: None,
        };
        let result = self.block_on(service.create_booking(actor, request));
        self.last_booking.set(result.clone());
        result
    }

    pub fn last_booking(&self) -> Result<BookingReceipt, BookingError> {
        self.last_booking
            .get()
            .expect("a booking request should have run")
    }

    pub fn catalog(&self) -> Arc<InMemoryCarCatalog> {
        self.catalog.get().expect("catalog should be set")
    }

    pub fn store(&self) -> Arc<InMemoryReservationStore> {
        self.store.get().expect("store should be set")
    }

    pub fn service(&self) -> Arc<crate::InMemoryBookingService> {
        self.service.get().expect("service should be set")
    }

    /// Notifications addressed to the car owner, newest first.
    pub fn owner_notifications(&self) -> Vec<Notification> {
        let sink = self.sink.get().expect("sink should be set");
        let owner = *self.owner().user_id();
        self.block_on(sink.list_for_user(&owner))
            .expect("sink listing succeeds")
    }

    /// The owner's pending request notification.
    pub fn request_notification(&self) -> Notification {
        self.owner_notifications()
            .into_iter()
            .find(|n| n.kind() == NotificationKind::BookingRequest)
            .expect("owner should have a booking request notification")
    }

    /// Every reservation the renter ever made.
    pub fn renter_reservations(&self) -> Vec<Reservation> {
        let renter = *self.renter().user_id();
        self.block_on(self.store().list_for_user(&renter, StatusFilter::All))
            .expect("store listing succeeds")
    }

    pub fn availability(&self) -> CarAvailability {
        self.catalog()
            .availability_of(self.car().id())
            .expect("car should be listed")
    }
}
