//! Failure taxonomy of booking operations.
//!
//! Every variant maps onto one [`ErrorCode`] so inbound adapters can render
//! it without knowing booking internals. The `reason` slug travels in the
//! error details for clients that branch on the precise cause.

use serde_json::json;

use crate::domain::{
    ConflictError, Error, ErrorCode, ReservationId, ReservationStatus,
    ReservationValidationError, StatusTransitionError,
};

/// Why a booking operation did not go through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ReservationValidationError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    State(#[from] StatusTransitionError),
    #[error("{entity} {id} was not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{message}")]
    Forbidden { message: String },
    #[error("notification is not a booking decision: {message}")]
    InvalidNotification { message: String },
    #[error("{dependency} is unavailable: {message}")]
    Dependency {
        dependency: &'static str,
        message: String,
    },
    #[error("reservation changed concurrently; it is now {current}")]
    ConcurrentModification { current: ReservationStatus },
    #[error("booking {reservation_id} could not be set up or rolled back: {message}")]
    SetupFailed {
        reservation_id: ReservationId,
        message: String,
    },
}

impl BookingError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn dependency(dependency: &'static str, message: impl ToString) -> Self {
        Self::Dependency {
            dependency,
            message: message.to_string(),
        }
    }

    /// Transport-agnostic category.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::InvalidNotification { .. } => ErrorCode::InvalidRequest,
            Self::Conflict(_) | Self::State(_) | Self::ConcurrentModification { .. } => {
                ErrorCode::Conflict
            }
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::Dependency { .. } => ErrorCode::ServiceUnavailable,
            Self::SetupFailed { .. } => ErrorCode::InternalError,
        }
    }

    /// Stable snake_case cause.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.reason(),
            Self::Conflict(err) => err.reason(),
            Self::State(StatusTransitionError::InvalidTransition { .. }) => "invalid_transition",
            Self::State(StatusTransitionError::TerminalStateViolation { .. }) => {
                "terminal_state_violation"
            }
            Self::NotFound { .. } => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidNotification { .. } => "invalid_notification",
            Self::Dependency { .. } => "dependency_failure",
            Self::ConcurrentModification { .. } => "concurrent_modification",
            Self::SetupFailed { .. } => "setup_failed",
        }
    }
}

impl From<BookingError> for Error {
    fn from(value: BookingError) -> Self {
        let details = match &value {
            BookingError::Conflict(ConflictError::DateRangeConflict { conflicting_id }) => json!({
                "reason": value.reason(),
                "conflictingId": conflicting_id,
            }),
            BookingError::SetupFailed { reservation_id, .. } => json!({
                "reason": value.reason(),
                "reservationId": reservation_id,
                "reconciliationRequired": true,
            }),
            _ => json!({ "reason": value.reason() }),
        };
        Error::new(value.code(), value.to_string()).with_details(details)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::CarAvailability;

    #[rstest]
    #[case(BookingError::from(ReservationValidationError::PastStartDate), ErrorCode::InvalidRequest, "past_start_date")]
    #[case(
        BookingError::from(ConflictError::InstantBookingBlocked { outstanding: 2 }),
        ErrorCode::Conflict,
        "instant_booking_blocked"
    )]
    #[case(
        BookingError::from(ConflictError::CarUnavailable { availability: CarAvailability::Maintenance }),
        ErrorCode::Conflict,
        "car_unavailable"
    )]
    #[case(
        BookingError::from(StatusTransitionError::TerminalStateViolation {
            from: ReservationStatus::Cancelled,
            to: ReservationStatus::Confirmed,
        }),
        ErrorCode::Conflict,
        "terminal_state_violation"
    )]
    #[case(BookingError::not_found("car", "abc"), ErrorCode::NotFound, "not_found")]
    #[case(BookingError::forbidden("nope"), ErrorCode::Forbidden, "forbidden")]
    #[case(
        BookingError::dependency("car catalog", "timeout"),
        ErrorCode::ServiceUnavailable,
        "dependency_failure"
    )]
    fn maps_code_and_reason(
        #[case] err: BookingError,
        #[case] code: ErrorCode,
        #[case] reason: &str,
    ) {
        assert_eq!(err.code(), code);
        assert_eq!(err.reason(), reason);

        let payload = Error::from(err);
        assert_eq!(payload.code(), code);
        assert_eq!(
            payload.details().and_then(|d| d.get("reason")),
            Some(&json!(reason))
        );
    }

    #[rstest]
    fn date_conflict_details_name_the_blocking_reservation() {
        let conflicting_id = ReservationId::random();
        let payload = Error::from(BookingError::from(ConflictError::DateRangeConflict {
            conflicting_id,
        }));

        let details = payload.details().expect("details present");
        assert_eq!(details["conflictingId"], json!(conflicting_id));
    }

    #[rstest]
    fn setup_failure_flags_reconciliation() {
        let payload = Error::from(BookingError::SetupFailed {
            reservation_id: ReservationId::random(),
            message: "store unreachable".to_owned(),
        });

        assert_eq!(payload.code(), ErrorCode::InternalError);
        let details = payload.details().expect("details present");
        assert_eq!(details["reconciliationRequired"], json!(true));
    }
}
