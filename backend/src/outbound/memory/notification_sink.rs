//! In-memory notification sink.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{NotificationSink, NotificationSinkError};
use crate::domain::{NewNotification, Notification, NotificationId, UserId};

use super::{ScriptedFailures, lock_state};

#[derive(Default)]
struct SinkState {
    notifications: Vec<Notification>,
    create_failures: ScriptedFailures<NotificationSinkError>,
}

/// Notification sink backed by a vector in insertion order.
#[derive(Default)]
pub struct InMemoryNotificationSink {
    state: Mutex<SinkState>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create` fail with `error`.
    pub fn fail_next_create(&self, error: NotificationSinkError) {
        if let Ok(mut state) = self.state.lock() {
            state.create_failures.push(error);
        }
    }

    /// Every stored notification, oldest first.
    pub fn all(&self) -> Vec<Notification> {
        self.state
            .lock()
            .map(|state| state.notifications.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn create(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationId, NotificationSinkError> {
        let mut state = lock_state(&self.state, |m| NotificationSinkError::query(m))?;
        state.create_failures.take()?;

        let id = NotificationId::random();
        debug!(
            notification_id = %id,
            user_id = %notification.user_id,
            kind = %notification.kind,
            "notification stored"
        );
        state
            .notifications
            .push(Notification::from_new(id, notification));
        Ok(id)
    }

    async fn find_by_id(
        &self,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationSinkError> {
        let state = lock_state(&self.state, |m| NotificationSinkError::query(m))?;
        Ok(state
            .notifications
            .iter()
            .find(|n| n.id() == notification_id)
            .cloned())
    }

    async fn mark_read(
        &self,
        notification_id: &NotificationId,
    ) -> Result<(), NotificationSinkError> {
        let mut state = lock_state(&self.state, |m| NotificationSinkError::query(m))?;
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id() == notification_id)
            .ok_or_else(|| NotificationSinkError::not_found(*notification_id))?;
        notification.mark_read();
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationSinkError> {
        let state = lock_state(&self.state, |m| NotificationSinkError::query(m))?;
        let mut listed: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id() == user_id)
            .cloned()
            .collect();
        listed.reverse();
        listed.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(listed)
    }
}
