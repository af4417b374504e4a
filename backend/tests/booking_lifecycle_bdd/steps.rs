//! Step definitions and scenario bindings for booking lifecycle BDD tests.

use super::*;
use carshare_backend::domain::ports::{BookingCommand, CarCatalogError};
use carshare_backend::domain::{Actor, CarAvailability, Money, ReservationStatus};
use chrono::{NaiveDate, TimeDelta};
use rstest_bdd_macros::{given, scenario, then, when};

use crate::booking_lifecycle_world::at_ten;

#[given("a car listed at 100 per day that needs owner approval")]
fn a_car_that_needs_owner_approval(world: &BookingWorld) {
    world.list_car(false);
}

#[given("a car listed at 100 per day that books instantly")]
fn a_car_that_books_instantly(world: &BookingWorld) {
    world.list_car(true);
}

#[given("the renter has requested it from {start} to {end}")]
fn the_renter_has_requested_it(world: &BookingWorld, start: NaiveDate, end: NaiveDate) {
    let receipt = world
        .request_as(&world.renter(), at_ten(start), at_ten(end))
        .expect("first request should succeed");
    world.first_reservation.set(*receipt.reservation.id());
}

#[given("the renter has cancelled that request")]
fn the_renter_has_cancelled_that_request(world: &BookingWorld) {
    let reservation_id = world
        .first_reservation
        .get()
        .expect("a reservation should exist");
    let service = world.service();
    world
        .block_on(service.cancel_booking(&world.renter(), &reservation_id, None))
        .expect("renter may cancel a pending request");
}

#[given("the catalog rejects the next availability update")]
fn the_catalog_rejects_the_next_availability_update(world: &BookingWorld) {
    world
        .catalog()
        .fail_next_availability_update(CarCatalogError::connection("catalog offline"));
}

#[when("the renter requests it from {start} to {end}")]
fn the_renter_requests_it(world: &BookingWorld, start: NaiveDate, end: NaiveDate) {
    drop(world.request_as(&world.renter(), at_ten(start), at_ten(end)));
}

#[when("another renter requests it from {start} to {end}")]
fn another_renter_requests_it(world: &BookingWorld, start: NaiveDate, end: NaiveDate) {
    let other = Actor::new(UserId::random());
    drop(world.request_as(&other, at_ten(start), at_ten(end)));
}

#[when("the renter requests it starting yesterday")]
fn the_renter_requests_it_starting_yesterday(world: &BookingWorld) {
    let start = world.now() - TimeDelta::days(1);
    drop(world.request_as(&world.renter(), start, start + TimeDelta::days(3)));
}

#[when("the owner approves the request")]
fn the_owner_approves_the_request(world: &BookingWorld) {
    let notification = world.request_notification();
    let service = world.service();
    let outcome = world.block_on(service.approve_booking(&world.owner(), notification.id()));
    world.last_decision.set(outcome);
}

#[then("the reservation is {status}")]
fn the_reservation_is(world: &BookingWorld, status: ReservationStatus) {
    let receipt = world.last_booking().expect("booking should succeed");
    assert_eq!(receipt.reservation.status(), status);
}

#[then("the total price is {amount}")]
fn the_total_price_is(world: &BookingWorld, amount: u32) {
    let receipt = world.last_booking().expect("booking should succeed");
    assert_eq!(receipt.reservation.total_price(), Money::from_major(amount));
}

#[then("the owner has {count} unread notifications")]
fn the_owner_has_unread_notifications(world: &BookingWorld, count: usize) {
    let unread = world
        .owner_notifications()
        .iter()
        .filter(|n| !n.is_read())
        .count();
    assert_eq!(unread, count);
}

#[then("the car is {availability}")]
fn the_car_is(world: &BookingWorld, availability: CarAvailability) {
    assert_eq!(world.availability(), availability);
}

#[then("the request fails because of {reason}")]
fn the_request_fails_because_of(world: &BookingWorld, reason: String) {
    let err = world.last_booking().expect_err("booking should fail");
    assert_eq!(err.reason(), reason);
}

#[then("the owner is told the booking is {message}")]
fn the_owner_is_told_the_booking_is(world: &BookingWorld, message: String) {
    let outcome = world
        .last_decision
        .get()
        .expect("a decision should have run")
        .expect("decision should not error");
    match outcome {
        DecisionOutcome::AlreadyHandled {
            message: reported, ..
        } => assert_eq!(reported, message),
        DecisionOutcome::Applied { .. } => panic!("expected the decision to be a no-op"),
    }
}

#[then("the renter's booking is {status}")]
fn the_renters_booking_is(world: &BookingWorld, status: ReservationStatus) {
    let reservations = world.renter_reservations();
    let [reservation] = reservations.as_slice() else {
        panic!("expected exactly one reservation, found {}", reservations.len());
    };
    assert_eq!(reservation.status(), status);
}

#[then("no reservation is stored")]
fn no_reservation_is_stored(world: &BookingWorld) {
    assert!(world.store().is_empty());
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "A manual car is requested and awaits the owner"
)]
fn a_manual_car_is_requested_and_awaits_the_owner(world: BookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "An overlapping request is refused while the first is pending"
)]
fn an_overlapping_request_is_refused_while_the_first_is_pending(world: BookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "An instant booking is confirmed straight away"
)]
fn an_instant_booking_is_confirmed_straight_away(world: BookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "Approving a request the renter already cancelled changes nothing"
)]
fn approving_a_request_the_renter_already_cancelled_changes_nothing(world: BookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "Approving a pending request confirms it and rents the car"
)]
fn approving_a_pending_request_confirms_it_and_rents_the_car(world: BookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "A request starting yesterday is refused before anything is stored"
)]
fn a_request_starting_yesterday_is_refused_before_anything_is_stored(world: BookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "A failed availability update rolls the instant booking back"
)]
fn a_failed_availability_update_rolls_the_instant_booking_back(world: BookingWorld) {
    drop(world);
}
