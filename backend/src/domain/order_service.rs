//! Order placement workflow and order read services.
//!
//! Placing an order runs inside one store transaction:
//!
//! ```text
//! Started -> Validated -> Persisted -> StockAdjusted -> Committed
//!    \___________\____________\______________\______-> Aborted
//! ```
//!
//! Product rows are locked in ascending id order before validation, so two
//! multi-line orders can never wait on each other in a cycle, and no other
//! order can slip a decrement between this order's stock check and its own
//! decrement. Any failure rolls the transaction back; nothing is retried.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{OrderCommand, OrderQuery, OrderStore, OrderStoreError, OrderTransaction};
use crate::domain::{
    Error, Order, OrderDraft, OrderError, OrderId, OrderStatus, UserId, validate_order,
};

/// Progress of a single order placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderWorkflowState {
    /// Transaction open, nothing read yet.
    Started,
    /// Lines checked against locked stock and priced.
    Validated,
    /// Header and lines inserted.
    Persisted,
    /// Stock decremented for every line.
    StockAdjusted,
    /// Transaction committed.
    Committed,
    /// Transaction rolled back.
    Aborted,
}

impl fmt::Display for OrderWorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Started => "started",
            Self::Validated => "validated",
            Self::Persisted => "persisted",
            Self::StockAdjusted => "stock_adjusted",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

fn map_store_error(error: OrderStoreError) -> Error {
    match error {
        OrderStoreError::Connection { message } => {
            Error::service_unavailable(format!("order store unavailable: {message}"))
        }
        OrderStoreError::Query { message } => {
            Error::internal(format!("order store error: {message}"))
        }
        OrderStoreError::LockTimeout { .. } => OrderError::LockTimeout.into(),
        OrderStoreError::StockConflict { product_id } => {
            OrderError::StockConflict { product_id }.into()
        }
        OrderStoreError::ProductNotFound { product_id } => {
            OrderError::ProductNotFound { product_id }.into()
        }
        OrderStoreError::UserNotFound { user_id } => OrderError::UserNotFound { user_id }.into(),
        OrderStoreError::OutOfRange { .. } => OrderError::AmountOutOfRange.into(),
    }
}

/// Tracks the workflow state of one placement for logging.
struct Placement {
    user_id: UserId,
    state: OrderWorkflowState,
}

impl Placement {
    fn new(user_id: UserId) -> Self {
        debug!(user_id = %user_id, state = %OrderWorkflowState::Started, "order workflow");
        Self {
            user_id,
            state: OrderWorkflowState::Started,
        }
    }

    fn advance(&mut self, next: OrderWorkflowState) {
        debug!(
            user_id = %self.user_id,
            from = %self.state,
            to = %next,
            "order workflow"
        );
        self.state = next;
    }
}

/// Order service implementing the order driving ports.
#[derive(Clone)]
pub struct OrderService<S> {
    store: Arc<S>,
}

impl<S> OrderService<S> {
    /// Create a service over the order store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> OrderService<S>
where
    S: OrderStore,
{
    async fn run_steps(
        tx: &mut dyn OrderTransaction,
        draft: &OrderDraft,
        placement: &mut Placement,
    ) -> Result<Order, Error> {
        let product_ids = draft.product_ids();
        let stock = tx
            .lock_products(&product_ids)
            .await
            .map_err(map_store_error)?;
        let user_exists = tx
            .user_exists(draft.user_id)
            .await
            .map_err(map_store_error)?;

        let priced = validate_order(draft, &stock, user_exists)?;
        placement.advance(OrderWorkflowState::Validated);

        let order = tx.insert_order(&priced).await.map_err(map_store_error)?;
        placement.advance(OrderWorkflowState::Persisted);

        for line in &priced.lines {
            let remaining = tx
                .decrement_stock(line.product_id, line.quantity)
                .await
                .map_err(map_store_error)?;
            if remaining < 0 {
                return Err(OrderError::StockConflict {
                    product_id: line.product_id,
                }
                .into());
            }
        }
        placement.advance(OrderWorkflowState::StockAdjusted);

        Ok(order)
    }
}

#[async_trait]
impl<S> OrderCommand for OrderService<S>
where
    S: OrderStore,
{
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, Error> {
        let mut tx = self.store.begin().await.map_err(map_store_error)?;
        let mut placement = Placement::new(draft.user_id);

        let outcome = Self::run_steps(tx.as_mut(), &draft, &mut placement).await;
        let order = match outcome {
            Ok(order) => order,
            Err(error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(error = %rollback_error, "order rollback failed");
                }
                placement.advance(OrderWorkflowState::Aborted);
                return Err(error);
            }
        };

        if let Err(commit_error) = tx.commit().await {
            placement.advance(OrderWorkflowState::Aborted);
            return Err(map_store_error(commit_error));
        }
        placement.advance(OrderWorkflowState::Committed);

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total,
            lines = order.lines.len(),
            "order placed"
        );
        Ok(order)
    }

    async fn change_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, Error> {
        let order = self
            .store
            .update_status(order_id, status)
            .await
            .map_err(map_store_error)?
            .ok_or(OrderError::OrderNotFound { order_id })?;

        info!(order_id = %order_id, status = %status, "order status changed");
        Ok(order)
    }
}

#[async_trait]
impl<S> OrderQuery for OrderService<S>
where
    S: OrderStore,
{
    async fn get_order(&self, order_id: OrderId) -> Result<Order, Error> {
        let order = self
            .store
            .find_by_id(order_id)
            .await
            .map_err(map_store_error)?
            .ok_or(OrderError::OrderNotFound { order_id })?;
        Ok(order)
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, Error> {
        let orders = self
            .store
            .list_for_user(user_id)
            .await
            .map_err(map_store_error)?
            .ok_or(OrderError::UserNotFound { user_id })?;
        Ok(orders)
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
