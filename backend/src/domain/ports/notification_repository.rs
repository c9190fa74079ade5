//! Port for notification persistence.

use async_trait::async_trait;

use crate::domain::{NewNotification, Notification, NotificationId, ProductId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}",
        /// The recipient has no user row.
        RecipientNotFound { recipient_id: UserId } =>
            "recipient {recipient_id} not found",
        /// The referenced product has no row.
        ProductNotFound { product_id: ProductId } =>
            "product {product_id} not found",
    }
}

/// Port owning notification rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Store a new unread notification.
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError>;

    /// List a recipient's notifications, newest first.
    async fn list_for_recipient(
        &self,
        recipient_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Mark one notification read. Returns `false` when it does not exist.
    async fn mark_read(
        &self,
        notification_id: NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Mark every unread notification of a recipient read and return how many
    /// changed.
    async fn mark_all_read(&self, recipient_id: UserId)
    -> Result<usize, NotificationRepositoryError>;

    /// Delete one notification. Returns `false` when it does not exist.
    async fn delete(
        &self,
        notification_id: NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Delete every notification of a recipient and return how many went.
    async fn delete_for_recipient(
        &self,
        recipient_id: UserId,
    ) -> Result<usize, NotificationRepositoryError>;
}
