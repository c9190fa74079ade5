//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{
    NewNotification, Notification, NotificationId, NotificationLevel, ProductId, UserId,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationRepositoryError {
    NotificationRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => NotificationRepositoryError::connection(message),
        DieselFailure::Query(message) | DieselFailure::LockTimeout(message) => {
            NotificationRepositoryError::query(message)
        }
        other => {
            NotificationRepositoryError::query(format!("unexpected database failure: {other:?}"))
        }
    }
}

fn row_to_notification(row: NotificationRow) -> Notification {
    let level = row.level.parse().unwrap_or_else(|_| {
        warn!(value = %row.level, notification_id = row.id, "unrecognised level, treating as info");
        NotificationLevel::Info
    });
    Notification {
        id: NotificationId::new(row.id),
        kind: row.kind,
        message: row.message,
        product_id: row.product_id.map(ProductId::new),
        recipient_id: UserId::new(row.recipient_id),
        read: row.read,
        level,
    }
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::insert_into(notifications::table)
            .values(&NewNotificationRow {
                kind: &notification.kind,
                message: &notification.message,
                product_id: notification.product_id.map(ProductId::get),
                recipient_id: notification.recipient_id.get(),
                level: notification.level.as_str(),
            })
            .returning(NotificationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match classify_diesel_error(err) {
                DieselFailure::ForeignKeyViolation { constraint } => {
                    match notification.product_id {
                        Some(product_id)
                            if constraint.as_deref().is_some_and(|name| name.contains("product")) =>
                        {
                            NotificationRepositoryError::product_not_found(product_id)
                        }
                        _ => NotificationRepositoryError::recipient_not_found(
                            notification.recipient_id,
                        ),
                    }
                }
                DieselFailure::Connection(message) => {
                    NotificationRepositoryError::connection(message)
                }
                other => NotificationRepositoryError::query(format!(
                    "notification insert failed: {other:?}"
                )),
            })?;

        Ok(row_to_notification(row))
    }

    async fn list_for_recipient(
        &self,
        recipient_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = notifications::table
            .filter(notifications::recipient_id.eq(recipient_id.get()))
            .order(notifications::id.desc())
            .select(NotificationRow::as_select())
            .into_boxed();
        if unread_only {
            query = query.filter(notifications::read.eq(false));
        }

        let rows: Vec<NotificationRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_notification).collect())
    }

    async fn mark_read(
        &self,
        notification_id: NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(notifications::table.find(notification_id.get()))
            .set(notifications::read.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn mark_all_read(
        &self,
        recipient_id: UserId,
    ) -> Result<usize, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(
            notifications::table
                .filter(notifications::recipient_id.eq(recipient_id.get()))
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(
        &self,
        notification_id: NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(notifications::table.find(notification_id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn delete_for_recipient(
        &self,
        recipient_id: UserId,
    ) -> Result<usize, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(
            notifications::table.filter(notifications::recipient_id.eq(recipient_id.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
