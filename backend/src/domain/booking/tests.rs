//! Unit tests for reservation rules.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{CarId, Money, RentalPeriod, ReservationId, UserId};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn window(start_day: u32, end_day: u32) -> RentalWindow {
    RentalWindow::new(at(start_day, 10), at(end_day, 10))
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 20, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn reservation_for(
    car_id: CarId,
    requester_id: UserId,
    window: RentalWindow,
    mode: BookingMode,
) -> Reservation {
    Reservation::new(ReservationDraft {
        id: ReservationId::random(),
        requester_id,
        car_id,
        owner_id: UserId::random(),
        window,
        total_price: Money::from_major(100),
        mode,
        notes: None,
        created_at: at(1, 0) - Duration::days(30),
    })
    .expect("valid reservation")
}

// ---------------------------------------------------------------------------
// Overlap
// ---------------------------------------------------------------------------

#[rstest]
#[case::disjoint_after(window(1, 4), window(5, 7), false)]
#[case::disjoint_before(window(10, 12), window(5, 8), false)]
#[case::start_inside(window(1, 4), window(3, 6), true)]
#[case::end_inside(window(5, 8), window(3, 6), true)]
#[case::encloses(window(5, 6), window(3, 9), true)]
#[case::enclosed(window(3, 9), window(5, 6), true)]
#[case::touching_day_conflicts(window(1, 4), window(4, 6), true)]
fn overlap_rules(
    #[case] existing: RentalWindow,
    #[case] candidate: RentalWindow,
    #[case] expected: bool,
) {
    let calendar = BookingCalendar::utc();
    assert_eq!(
        calendar.overlaps(&existing, candidate.start(), candidate.end()),
        expected
    );
}

#[rstest]
fn overlap_ignores_time_of_day() {
    let calendar = BookingCalendar::utc();
    let existing = RentalWindow::new(at(1, 8), at(3, 9));
    assert!(calendar.overlaps(&existing, at(3, 23), at(5, 9)));
}

#[rstest]
fn overlap_uses_calendar_offset() {
    // 23:30 UTC on the 3rd is already the 4th at UTC+2.
    let existing = RentalWindow::new(at(1, 8), at(3, 9));
    let late = Utc
        .with_ymd_and_hms(2025, 6, 3, 23, 30, 0)
        .single()
        .expect("valid timestamp");
    let plus_two = FixedOffset::east_opt(2 * 3600).expect("valid offset");

    assert!(BookingCalendar::utc().overlaps(&existing, late, at(6, 9)));
    assert!(!BookingCalendar::with_offset(plus_two).overlaps(&existing, late, at(6, 9)));
}

#[rstest]
fn overlap_is_symmetric() {
    let calendar = BookingCalendar::utc();
    let windows: Vec<RentalWindow> = (1..=6)
        .flat_map(|start| (start..=7).map(move |end| window(start, end)))
        .collect();

    for a in &windows {
        for b in &windows {
            assert_eq!(
                calendar.windows_overlap(a, b),
                calendar.windows_overlap(b, a),
                "asymmetric overlap for {a:?} / {b:?}"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[rstest]
#[case::exactly_one_day(RentalWindow::new(at(1, 10), at(2, 10)))]
#[case::thirty_days(RentalWindow::new(at(1, 10), at(1, 10) + Duration::hours(720)))]
#[case::starts_today(RentalWindow::new(at(1, 0), at(3, 0)))]
fn validator_accepts_windows_within_bounds(#[case] window: RentalWindow) {
    let today = at(1, 9);
    let policy = ReservationPolicy::default();
    assert_eq!(
        policy.validate(&window, today, &BookingCalendar::utc()),
        Ok(())
    );
}

#[rstest]
#[case::yesterday(
    RentalWindow::new(at(1, 10) - Duration::days(1), at(4, 10)),
    ReservationValidationError::PastStartDate
)]
#[case::equal_bounds(
    RentalWindow::new(at(2, 10), at(2, 10)),
    ReservationValidationError::InvalidRange
)]
#[case::inverted(
    RentalWindow::new(at(5, 10), at(2, 10)),
    ReservationValidationError::InvalidRange
)]
#[case::twenty_three_and_a_half_hours(
    RentalWindow::new(at(2, 10), at(2, 10) + Duration::minutes(23 * 60 + 30)),
    ReservationValidationError::BelowMinimumDuration { minimum_hours: 24 }
)]
#[case::one_minute_too_long(
    RentalWindow::new(at(2, 10), at(2, 10) + Duration::hours(720) + Duration::minutes(1)),
    ReservationValidationError::AboveMaximumDuration { maximum_hours: 720 }
)]
fn validator_names_the_broken_rule(
    #[case] window: RentalWindow,
    #[case] expected: ReservationValidationError,
) {
    let today = at(1, 9);
    let policy = ReservationPolicy::default();
    assert_eq!(
        policy.validate(&window, today, &BookingCalendar::utc()),
        Err(expected)
    );
}

#[rstest]
fn past_start_is_reported_before_range_problems() {
    let today = at(10, 9);
    let inverted_in_past = RentalWindow::new(at(5, 10), at(2, 10));
    assert_eq!(
        ReservationPolicy::default().validate(&inverted_in_past, today, &BookingCalendar::utc()),
        Err(ReservationValidationError::PastStartDate)
    );
}

#[rstest]
#[case(0, 30)]
#[case(48, 1)]
fn policy_rejects_impossible_bounds(#[case] min_hours: u32, #[case] max_days: u32) {
    assert!(ReservationPolicy::from_bounds(min_hours, max_days).is_none());
}

#[rstest]
#[case(window(1, 2), Err(ReservationValidationError::BelowCarMinimum { min_days: 2 }))]
#[case(window(1, 3), Ok(()))]
#[case(window(1, 6), Ok(()))]
#[case(
    RentalWindow::new(at(1, 10), at(6, 11)),
    Err(ReservationValidationError::AboveCarMaximum { max_days: 5 })
)]
fn rental_period_uses_elapsed_hours(
    #[case] window: RentalWindow,
    #[case] expected: Result<(), ReservationValidationError>,
) {
    let period = RentalPeriod::new(2, 5).expect("valid period");
    assert_eq!(
        ReservationPolicy::default().check_rental_period(period, &window),
        expected
    );
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[rstest]
fn quote_adds_ten_percent_fee() {
    let quote = PricingPolicy::default()
        .quote(Money::from_major(100), &window(1, 4))
        .expect("quote");
    assert_eq!(quote.billable_days, 3);
    assert_eq!(quote.subtotal, Money::from_major(300));
    assert_eq!(quote.service_fee, Money::from_major(30));
    assert_eq!(quote.total, Money::from_major(330));
}

#[rstest]
fn quote_bills_started_days() {
    let window = RentalWindow::new(at(1, 10), at(2, 11));
    let quote = PricingPolicy::new(0)
        .quote(Money::from_major(50), &window)
        .expect("quote");
    assert_eq!(quote.billable_days, 2);
    assert_eq!(quote.total, Money::from_major(100));
}

#[rstest]
#[case(Duration::zero(), 1)]
#[case(Duration::milliseconds(500), 2)]
#[case(Duration::nanoseconds(1), 2)]
fn a_started_fraction_of_a_second_bills_another_day(
    #[case] beyond_one_day: Duration,
    #[case] expected_days: u64,
) {
    let start = at(1, 10);
    let window = RentalWindow::new(start, start + Duration::days(1) + beyond_one_day);
    assert_eq!(window.billable_days(), expected_days);
}

#[rstest]
fn inverted_windows_bill_nothing() {
    assert_eq!(window(4, 1).billable_days(), 0);
}

#[rstest]
fn quote_reports_overflow() {
    let result = PricingPolicy::default().quote(Money::from_minor(u64::MAX), &window(1, 4));
    assert_eq!(result, Err(ReservationValidationError::PriceOverflow));
}

// ---------------------------------------------------------------------------
// Status machine
// ---------------------------------------------------------------------------

#[rstest]
#[case(ReservationStatus::Pending, ReservationStatus::Confirmed)]
#[case(ReservationStatus::Pending, ReservationStatus::Cancelled)]
#[case(ReservationStatus::Confirmed, ReservationStatus::Completed)]
#[case(ReservationStatus::Confirmed, ReservationStatus::Cancelled)]
fn legal_transitions_apply(#[case] from: ReservationStatus, #[case] to: ReservationStatus) {
    assert_eq!(from.check_transition(to), Ok(TransitionOutcome::Applied));
}

#[rstest]
#[case(ReservationStatus::Pending, ReservationStatus::Completed)]
#[case(ReservationStatus::Confirmed, ReservationStatus::Pending)]
fn illegal_transitions_name_target(#[case] from: ReservationStatus, #[case] to: ReservationStatus) {
    let err = from.check_transition(to).expect_err("illegal transition");
    assert!(matches!(
        err,
        StatusTransitionError::InvalidTransition { from: f, to: t, .. } if f == from && t == to
    ));
    assert!(err.to_string().contains(to.as_str()));
}

#[rstest]
fn terminal_statuses_never_change() {
    let all = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Cancelled,
        ReservationStatus::Completed,
    ];
    for from in [ReservationStatus::Cancelled, ReservationStatus::Completed] {
        for to in all.into_iter().filter(|to| *to != from) {
            assert_eq!(
                from.check_transition(to),
                Err(StatusTransitionError::TerminalStateViolation { from, to })
            );
        }
    }
}

#[rstest]
fn transition_stamps_timestamps() {
    let mut reservation = reservation_for(
        CarId::random(),
        UserId::random(),
        window(2, 4),
        BookingMode::RequestApproval,
    );
    let confirmed_at = at(1, 12);
    let completed_at = at(4, 12);

    reservation.confirm(confirmed_at).expect("confirm");
    reservation.complete(completed_at).expect("complete");

    assert_eq!(reservation.status(), ReservationStatus::Completed);
    assert_eq!(reservation.confirmed_at(), Some(confirmed_at));
    assert_eq!(reservation.completed_at(), Some(completed_at));
    assert_eq!(reservation.updated_at(), completed_at);
}

#[rstest]
fn cancellation_records_reason() {
    let mut reservation = reservation_for(
        CarId::random(),
        UserId::random(),
        window(2, 4),
        BookingMode::RequestApproval,
    );
    reservation
        .cancel(at(1, 12), Some("plans changed".to_owned()))
        .expect("cancel");

    assert_eq!(reservation.cancelled_at(), Some(at(1, 12)));
    assert_eq!(reservation.cancellation_reason(), Some("plans changed"));
}

#[rstest]
fn same_status_is_a_no_op() {
    let mut reservation = reservation_for(
        CarId::random(),
        UserId::random(),
        window(2, 4),
        BookingMode::Instant,
    );
    let before = reservation.clone();

    let outcome = reservation.confirm(at(1, 23)).expect("no-op confirm");

    assert_eq!(outcome, TransitionOutcome::Unchanged);
    assert_eq!(reservation, before);
}

#[rstest]
fn instant_reservations_start_confirmed() {
    let reservation = reservation_for(
        CarId::random(),
        UserId::random(),
        window(2, 4),
        BookingMode::Instant,
    );
    assert_eq!(reservation.status(), ReservationStatus::Confirmed);
    assert_eq!(reservation.confirmed_at(), Some(reservation.created_at()));
}

#[rstest]
fn status_update_round_trips_fields() {
    let mut reservation = reservation_for(
        CarId::random(),
        UserId::random(),
        window(2, 4),
        BookingMode::RequestApproval,
    );
    let mut stored = reservation.clone();
    reservation.cancel(at(1, 5), Some("no".to_owned())).expect("cancel");

    stored.apply_status_update(&reservation.status_update());

    assert_eq!(stored, reservation);
}

#[rstest]
fn status_filter_matches() {
    assert!(StatusFilter::Active.matches(ReservationStatus::Pending));
    assert!(!StatusFilter::Active.matches(ReservationStatus::Completed));
    assert!(StatusFilter::Terminal.matches(ReservationStatus::Cancelled));
    assert!(StatusFilter::Only(ReservationStatus::Confirmed).matches(ReservationStatus::Confirmed));
    assert!(!StatusFilter::Only(ReservationStatus::Confirmed).matches(ReservationStatus::Pending));
}

// ---------------------------------------------------------------------------
// Conflict guard
// ---------------------------------------------------------------------------

#[rstest]
fn guard_reports_duplicate_before_overlap() {
    let car = CarId::random();
    let renter = UserId::random();
    let existing = vec![reservation_for(
        car,
        renter,
        window(2, 4),
        BookingMode::RequestApproval,
    )];
    let candidate = reservation_for(car, renter, window(3, 5), BookingMode::RequestApproval);

    let guard = ConflictGuard::new(BookingCalendar::utc(), BookingMode::RequestApproval);
    assert!(matches!(
        guard.check(&existing, &candidate),
        Err(ConflictError::DuplicatePendingRequest { .. })
    ));
}

#[rstest]
fn guard_blocks_instant_booking_with_outstanding_requests() {
    let car = CarId::random();
    let existing = vec![reservation_for(
        car,
        UserId::random(),
        window(20, 22),
        BookingMode::RequestApproval,
    )];
    let candidate = reservation_for(car, UserId::random(), window(2, 4), BookingMode::Instant);

    let guard = ConflictGuard::new(BookingCalendar::utc(), BookingMode::Instant);
    assert_eq!(
        guard.check(&existing, &candidate),
        Err(ConflictError::InstantBookingBlocked { outstanding: 1 })
    );
}

#[rstest]
fn guard_ignores_terminal_and_other_cars() {
    let car = CarId::random();
    let mut cancelled = reservation_for(
        car,
        UserId::random(),
        window(2, 4),
        BookingMode::RequestApproval,
    );
    cancelled.cancel(at(1, 1), None).expect("cancel");
    let elsewhere = reservation_for(
        CarId::random(),
        UserId::random(),
        window(2, 4),
        BookingMode::RequestApproval,
    );
    let candidate = reservation_for(car, UserId::random(), window(2, 4), BookingMode::Instant);

    let guard = ConflictGuard::new(BookingCalendar::utc(), BookingMode::Instant);
    assert_eq!(guard.check(&[cancelled, elsewhere], &candidate), Ok(()));
}

#[rstest]
fn guard_names_conflicting_reservation() {
    let car = CarId::random();
    let existing = reservation_for(
        car,
        UserId::random(),
        window(1, 4),
        BookingMode::RequestApproval,
    );
    let expected_id = *existing.id();
    let candidate = reservation_for(
        car,
        UserId::random(),
        window(3, 5),
        BookingMode::RequestApproval,
    );

    let guard = ConflictGuard::new(BookingCalendar::utc(), BookingMode::RequestApproval);
    assert_eq!(
        guard.check(&[existing], &candidate),
        Err(ConflictError::DateRangeConflict {
            conflicting_id: expected_id
        })
    );
}

#[rstest]
fn validation_fixture_clock_precedes_scenarios(now: DateTime<Utc>) {
    let policy = ReservationPolicy::default();
    assert_eq!(
        policy.validate(&window(1, 4), now, &BookingCalendar::utc()),
        Ok(())
    );
}
