//! Attempt-local classification for one compensating write.

use super::TransientFailure;

pub(super) enum AttemptError<E> {
    Retryable(E),
    Fatal(E),
}

impl<E: TransientFailure> AttemptError<E> {
    pub(super) fn classify(err: E) -> Self {
        if err.is_transient() {
            Self::Retryable(err)
        } else {
            Self::Fatal(err)
        }
    }
}
