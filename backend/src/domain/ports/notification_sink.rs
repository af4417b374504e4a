//! Port for storing user notifications.

use async_trait::async_trait;

use crate::domain::{NewNotification, Notification, NotificationId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification sink adapters.
    pub enum NotificationSinkError {
        /// Sink connection could not be established.
        [transient] Connection { message: String } =>
            "notification sink connection failed: {message}",
        /// Write or read failed during execution.
        [transient] Query { message: String } =>
            "notification sink query failed: {message}",
        /// No notification has the requested id.
        NotFound { notification_id: NotificationId } =>
            "notification {notification_id} was not found",
    }
}

/// Port for creating and reading notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Store a notification and return its id.
    async fn create(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationId, NotificationSinkError>;

    /// Find a notification by id.
    async fn find_by_id(
        &self,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationSinkError>;

    /// Set the read flag.
    async fn mark_read(&self, notification_id: &NotificationId)
    -> Result<(), NotificationSinkError>;

    /// Notifications addressed to `user_id`, newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationSinkError>;
}

/// Fixture implementation that accepts and forgets every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationSink;

#[async_trait]
impl NotificationSink for FixtureNotificationSink {
    async fn create(
        &self,
        _notification: NewNotification,
    ) -> Result<NotificationId, NotificationSinkError> {
        Ok(NotificationId::random())
    }

    async fn find_by_id(
        &self,
        _notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationSinkError> {
        Ok(None)
    }

    async fn mark_read(
        &self,
        _notification_id: &NotificationId,
    ) -> Result<(), NotificationSinkError> {
        Ok(())
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationSinkError> {
        Ok(Vec::new())
    }
}
