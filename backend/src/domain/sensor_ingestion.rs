//! Sensor stock ingestion.
//!
//! Each reading overwrites the stored quantity and, when the new figure is at
//! or below the low-stock threshold, alerts every administrator. Readings are
//! independent: a failure is logged and the batch carries on.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    IngestionSummary, NotificationRepository, ProductRepository, StockIngestion, StockReading,
    UserRepository,
};
use crate::domain::{Error, NewNotification, NotificationLevel, Product, UserRole};
use crate::domain::notification_service::map_notification_error;
use crate::domain::product_service::map_product_error;
use crate::domain::user_service::map_user_error;

/// Default quantity at or below which a reading raises a warning.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// Notification kind used for stock alerts.
pub const STOCK_NOTIFICATION_KIND: &str = "stock";

/// Message for a product that ran out.
pub const OUT_OF_STOCK_MESSAGE: &str = "stock agotado";

/// Message for a product at or below the threshold.
pub const LOW_STOCK_MESSAGE: &str = "stock bajo";

/// Decide whether a quantity warrants an alert.
///
/// # Examples
/// ```
/// use inventory::domain::{NotificationLevel, classify_stock};
///
/// assert_eq!(classify_stock(0, 10), Some((NotificationLevel::Error, "stock agotado")));
/// assert_eq!(classify_stock(10, 10), Some((NotificationLevel::Warning, "stock bajo")));
/// assert_eq!(classify_stock(11, 10), None);
/// ```
#[must_use]
pub fn classify_stock(quantity: i32, threshold: i32) -> Option<(NotificationLevel, &'static str)> {
    if quantity <= 0 {
        Some((NotificationLevel::Error, OUT_OF_STOCK_MESSAGE))
    } else if quantity <= threshold {
        Some((NotificationLevel::Warning, LOW_STOCK_MESSAGE))
    } else {
        None
    }
}

enum ReadingOutcome {
    Applied { notifications: usize },
    Skipped,
}

/// Sensor ingestion service implementing [`StockIngestion`].
#[derive(Clone)]
pub struct SensorIngestionService<P, U, N> {
    products: Arc<P>,
    users: Arc<U>,
    notifications: Arc<N>,
    low_stock_threshold: i32,
}

impl<P, U, N> SensorIngestionService<P, U, N> {
    /// Create a service with the default threshold.
    pub fn new(products: Arc<P>, users: Arc<U>, notifications: Arc<N>) -> Self {
        Self {
            products,
            users,
            notifications,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// Override the low-stock threshold.
    #[must_use]
    pub fn with_threshold(mut self, low_stock_threshold: i32) -> Self {
        self.low_stock_threshold = low_stock_threshold;
        self
    }
}

impl<P, U, N> SensorIngestionService<P, U, N>
where
    P: ProductRepository,
    U: UserRepository,
    N: NotificationRepository,
{
    async fn apply(&self, reading: StockReading) -> Result<ReadingOutcome, Error> {
        if reading.quantity < 0 {
            warn!(
                product_id = %reading.product_id,
                quantity = reading.quantity,
                "negative sensor reading ignored"
            );
            return Ok(ReadingOutcome::Skipped);
        }

        self.products
            .replace_stock(reading.product_id, reading.quantity)
            .await
            .map_err(map_product_error)?;

        let Some(product) = self
            .products
            .find_by_id(reading.product_id)
            .await
            .map_err(map_product_error)?
        else {
            warn!(product_id = %reading.product_id, "product vanished after stock update");
            return Ok(ReadingOutcome::Skipped);
        };

        let notifications = self.alert_admins(&product).await?;
        Ok(ReadingOutcome::Applied { notifications })
    }

    async fn alert_admins(&self, product: &Product) -> Result<usize, Error> {
        let Some((level, message)) = classify_stock(product.quantity, self.low_stock_threshold)
        else {
            return Ok(0);
        };

        let admins = self
            .users
            .list_by_role(UserRole::Admin)
            .await
            .map_err(map_user_error)?;
        if admins.is_empty() {
            debug!(product_id = %product.id, "no administrators to alert");
        }

        let mut created = 0;
        for admin in admins {
            let notification = NewNotification {
                kind: STOCK_NOTIFICATION_KIND.to_owned(),
                message: message.to_owned(),
                product_id: Some(product.id),
                recipient_id: admin.id,
                level,
            };
            self.notifications
                .create(&notification)
                .await
                .map_err(map_notification_error)?;
            created += 1;
        }
        info!(
            product_id = %product.id,
            quantity = product.quantity,
            level = %level,
            recipients = created,
            "stock alert raised"
        );
        Ok(created)
    }
}

#[async_trait]
impl<P, U, N> StockIngestion for SensorIngestionService<P, U, N>
where
    P: ProductRepository,
    U: UserRepository,
    N: NotificationRepository,
{
    async fn ingest_readings(&self, readings: Vec<StockReading>) -> IngestionSummary {
        let mut summary = IngestionSummary::default();
        for reading in readings {
            match self.apply(reading).await {
                Ok(ReadingOutcome::Applied { notifications }) => {
                    summary.applied += 1;
                    summary.notifications += notifications;
                }
                Ok(ReadingOutcome::Skipped) => summary.skipped += 1,
                Err(error) => {
                    warn!(
                        product_id = %reading.product_id,
                        quantity = reading.quantity,
                        code = ?error.code(),
                        error = %error,
                        "sensor reading failed"
                    );
                    summary.skipped += 1;
                }
            }
        }
        debug!(
            applied = summary.applied,
            skipped = summary.skipped,
            notifications = summary.notifications,
            "sensor batch ingested"
        );
        summary
    }
}

#[cfg(test)]
#[path = "sensor_ingestion_tests.rs"]
mod tests;
