//! Strongly typed identifiers for the booking core.
//!
//! Every identifier wraps a UUID and serialises as its canonical string form.
//! Distinct newtypes stop a car id being passed where a reservation id is
//! expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised when parsing identifiers from strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// The raw value was empty or whitespace.
    #[error("{kind} id must not be empty")]
    Empty {
        /// Identifier family, e.g. `car`.
        kind: &'static str,
    },
    /// The raw value was not a canonical UUID.
    #[error("{kind} id must be a valid UUID")]
    Invalid {
        /// Identifier family, e.g. `car`.
        kind: &'static str,
    },
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct the identifier from its string form.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = id.as_ref();
                if raw.trim().is_empty() {
                    return Err(IdValidationError::Empty { kind: $kind });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid { kind: $kind })
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_id! {
    /// Identity of a marketplace user, either renter or owner.
    UserId => "user"
}

define_id! {
    /// Identity of a listed car.
    CarId => "car"
}

define_id! {
    /// Identity of a reservation record.
    ReservationId => "reservation"
}

define_id! {
    /// Identity of a notification.
    NotificationId => "notification"
}

/// The authenticated user on whose behalf an operation runs.
///
/// The booking core never reads session state; inbound adapters resolve the
/// caller and pass it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
}

impl Actor {
    /// Act as the given user.
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The acting user's id.
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
