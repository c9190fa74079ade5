//! Notification inbox service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    NotificationInbox, NotificationRepository, NotificationRepositoryError,
};
use crate::domain::{
    Error, NewNotification, Notification, NotificationId, NotificationValidationError, UserId,
};

/// Notification service implementing [`NotificationInbox`].
#[derive(Clone)]
pub struct NotificationService<R> {
    repo: Arc<R>,
}

impl<R> NotificationService<R> {
    /// Create a new service over the notification repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

pub(crate) fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
        NotificationRepositoryError::RecipientNotFound { recipient_id } => {
            Error::not_found(format!("user {recipient_id} not found"))
                .with_details(json!({ "userId": recipient_id, "code": "user_not_found" }))
        }
        NotificationRepositoryError::ProductNotFound { product_id } => {
            Error::not_found(format!("product {product_id} not found"))
                .with_details(json!({ "productId": product_id, "code": "product_not_found" }))
        }
    }
}

fn invalid_notification(error: NotificationValidationError) -> Error {
    let field = match error {
        NotificationValidationError::InvalidKind => "type",
        NotificationValidationError::EmptyMessage => "message",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

fn missing(notification_id: NotificationId) -> Error {
    Error::not_found(format!("notification {notification_id} not found")).with_details(json!({
        "notificationId": notification_id,
        "code": "notification_not_found",
    }))
}

#[async_trait]
impl<R> NotificationInbox for NotificationService<R>
where
    R: NotificationRepository,
{
    async fn create(&self, notification: NewNotification) -> Result<Notification, Error> {
        notification.validate().map_err(invalid_notification)?;
        let stored = self
            .repo
            .create(&notification)
            .await
            .map_err(map_notification_error)?;
        info!(
            notification_id = %stored.id,
            recipient_id = %stored.recipient_id,
            level = %stored.level,
            "notification created"
        );
        Ok(stored)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error> {
        self.repo
            .list_for_recipient(user_id, unread_only)
            .await
            .map_err(map_notification_error)
    }

    async fn mark_read(&self, notification_id: NotificationId) -> Result<(), Error> {
        let found = self
            .repo
            .mark_read(notification_id)
            .await
            .map_err(map_notification_error)?;
        if found {
            Ok(())
        } else {
            Err(missing(notification_id))
        }
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<usize, Error> {
        self.repo
            .mark_all_read(user_id)
            .await
            .map_err(map_notification_error)
    }

    async fn delete(&self, notification_id: NotificationId) -> Result<(), Error> {
        let found = self
            .repo
            .delete(notification_id)
            .await
            .map_err(map_notification_error)?;
        if found {
            Ok(())
        } else {
            Err(missing(notification_id))
        }
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<usize, Error> {
        self.repo
            .delete_for_recipient(user_id)
            .await
            .map_err(map_notification_error)
    }
}
