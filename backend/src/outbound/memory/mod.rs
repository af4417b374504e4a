//! In-memory adapters for the booking ports.
//!
//! Each adapter keeps its state behind a [`std::sync::Mutex`] and never holds
//! the lock across an `.await`. Failures can be scripted per operation so
//! tests can drive retry and compensation paths.

mod car_catalog;
mod notification_sink;
mod reservation_store;

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

pub use car_catalog::InMemoryCarCatalog;
pub use notification_sink::InMemoryNotificationSink;
pub use reservation_store::InMemoryReservationStore;

/// Lock `mutex`, turning poisoning into an adapter error.
fn lock_state<'a, T, E>(
    mutex: &'a Mutex<T>,
    poisoned: impl FnOnce(String) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    mutex
        .lock()
        .map_err(|_| poisoned("in-memory adapter state lock poisoned".to_owned()))
}

/// Queue of failures to return from the next calls of one operation.
#[derive(Debug)]
struct ScriptedFailures<E>(VecDeque<E>);

impl<E> Default for ScriptedFailures<E> {
    fn default() -> Self {
        Self(VecDeque::new())
    }
}

impl<E> ScriptedFailures<E> {
    fn push(&mut self, error: E) {
        self.0.push_back(error);
    }

    fn take(&mut self) -> Result<(), E> {
        match self.0.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
