//! Driving port for reading and clearing a user's notifications.

use async_trait::async_trait;

use crate::domain::{Error, NewNotification, Notification, NotificationId, UserId};

/// Driving port for notification use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// Validate and store a notification addressed to one user.
    async fn create(&self, notification: NewNotification) -> Result<Notification, Error>;

    /// List a user's notifications, optionally only unread ones.
    async fn list_for_user(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error>;

    /// Mark one notification read.
    async fn mark_read(&self, notification_id: NotificationId) -> Result<(), Error>;

    /// Mark all of a user's notifications read and return how many changed.
    async fn mark_all_read(&self, user_id: UserId) -> Result<usize, Error>;

    /// Delete one notification.
    async fn delete(&self, notification_id: NotificationId) -> Result<(), Error>;

    /// Delete all of a user's notifications and return how many went.
    async fn delete_for_user(&self, user_id: UserId) -> Result<usize, Error>;
}
