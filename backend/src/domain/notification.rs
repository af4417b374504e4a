//! Notices sent to the other party of a booking.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    BookingCalendar, Car, CarId, NotificationId, Reservation, ReservationId, UserId,
};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A renter asked to book the recipient's car.
    BookingRequest,
    /// A booking was confirmed.
    BookingConfirmed,
    /// A booking was declined or cancelled.
    BookingCancelled,
}

impl NotificationKind {
    /// Stable snake_case label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BookingRequest => "booking_request",
            Self::BookingConfirmed => "booking_confirmed",
            Self::BookingCancelled => "booking_cancelled",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured payload stored in a notification's `data` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub car_id: CarId,
    pub booking_id: ReservationId,
    pub renter_id: UserId,
}

impl NotificationPayload {
    /// Payload describing `reservation`.
    pub const fn for_reservation(reservation: &Reservation) -> Self {
        Self {
            car_id: *reservation.car_id(),
            booking_id: *reservation.id(),
            renter_id: *reservation.requester_id(),
        }
    }

    /// Opaque JSON form.
    pub fn to_value(self) -> Value {
        serde_json::json!({
            "carId": self.car_id,
            "bookingId": self.booking_id,
            "renterId": self.renter_id,
        })
    }
}

/// A notification ready to be handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

fn describe_dates(calendar: &BookingCalendar, reservation: &Reservation) -> (NaiveDate, NaiveDate) {
    calendar.day_span(reservation.window())
}

impl NewNotification {
    fn about(
        user_id: UserId,
        kind: NotificationKind,
        title: &str,
        message: String,
        reservation: &Reservation,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.to_owned(),
            message,
            data: NotificationPayload::for_reservation(reservation).to_value(),
            created_at,
        }
    }

    /// Tell the owner that a renter asked to book their car.
    pub fn booking_requested(
        reservation: &Reservation,
        car: &Car,
        calendar: &BookingCalendar,
        created_at: DateTime<Utc>,
    ) -> Self {
        let (from, to) = describe_dates(calendar, reservation);
        Self::about(
            *reservation.owner_id(),
            NotificationKind::BookingRequest,
            "New booking request",
            format!(
                "Your {} was requested from {from} to {to} for {}.",
                car.display_name(),
                reservation.total_price()
            ),
            reservation,
            created_at,
        )
    }

    /// Tell the owner that their instant-booking car was booked.
    pub fn booked_instantly(
        reservation: &Reservation,
        car: &Car,
        calendar: &BookingCalendar,
        created_at: DateTime<Utc>,
    ) -> Self {
        let (from, to) = describe_dates(calendar, reservation);
        Self::about(
            *reservation.owner_id(),
            NotificationKind::BookingConfirmed,
            "New confirmed booking",
            format!(
                "Your {} was booked from {from} to {to} for {}.",
                car.display_name(),
                reservation.total_price()
            ),
            reservation,
            created_at,
        )
    }

    /// Tell the renter that the owner approved their request.
    pub fn booking_approved(
        reservation: &Reservation,
        calendar: &BookingCalendar,
        created_at: DateTime<Utc>,
    ) -> Self {
        let (from, to) = describe_dates(calendar, reservation);
        Self::about(
            *reservation.requester_id(),
            NotificationKind::BookingConfirmed,
            "Booking approved",
            format!("Your booking from {from} to {to} was approved."),
            reservation,
            created_at,
        )
    }

    /// Tell the renter that the owner declined their request.
    pub fn booking_declined(
        reservation: &Reservation,
        calendar: &BookingCalendar,
        created_at: DateTime<Utc>,
    ) -> Self {
        let (from, to) = describe_dates(calendar, reservation);
        Self::about(
            *reservation.requester_id(),
            NotificationKind::BookingCancelled,
            "Booking declined",
            format!("Your booking request from {from} to {to} was declined."),
            reservation,
            created_at,
        )
    }

    /// Tell `recipient` that the other party cancelled the booking.
    pub fn booking_cancelled(
        recipient: UserId,
        reservation: &Reservation,
        calendar: &BookingCalendar,
        created_at: DateTime<Utc>,
    ) -> Self {
        let (from, to) = describe_dates(calendar, reservation);
        Self::about(
            recipient,
            NotificationKind::BookingCancelled,
            "Booking cancelled",
            format!("The booking from {from} to {to} was cancelled."),
            reservation,
            created_at,
        )
    }
}

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    id: NotificationId,
    user_id: UserId,
    #[serde(rename = "type")]
    kind: NotificationKind,
    title: String,
    message: String,
    read: bool,
    created_at: DateTime<Utc>,
    data: Value,
}

impl Notification {
    /// Materialise a notification under `id`, unread.
    pub fn from_new(id: NotificationId, new: NewNotification) -> Self {
        Self {
            id,
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            read: false,
            created_at: new.created_at,
            data: new.data,
        }
    }

    pub const fn id(&self) -> &NotificationId {
        &self.id
    }

    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub const fn is_read(&self) -> bool {
        self.read
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Flip the read flag.
    pub fn mark_read(&mut self) {
        self.read = true;
    }

    /// Decode the structured payload.
    pub fn payload(&self) -> Result<NotificationPayload, serde_json::Error> {
        NotificationPayload::deserialize(&self.data)
    }
}
