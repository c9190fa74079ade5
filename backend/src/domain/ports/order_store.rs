//! Port for order persistence and the unit of work used to place orders.
//!
//! [`OrderStore::begin`] opens a transaction. Everything done through the
//! returned [`OrderTransaction`] becomes visible only after
//! [`OrderTransaction::commit`]. Dropping the transaction without committing
//! discards its writes and releases its row locks.

use async_trait::async_trait;

use crate::domain::{
    Order, OrderId, OrderStatus, PricedOrder, ProductId, StockSnapshot, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order store adapters.
    pub enum OrderStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "order store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "order store query failed: {message}",
        /// A row lock was not granted within the configured wait.
        LockTimeout { message: String } =>
            "timed out waiting for a product lock: {message}",
        /// A stock decrement would have left the product negative.
        StockConflict { product_id: ProductId } =>
            "stock for product {product_id} would become negative",
        /// The product row disappeared between lock and write.
        ProductNotFound { product_id: ProductId } =>
            "product {product_id} not found",
        /// The ordering user disappeared before the order was written.
        UserNotFound { user_id: UserId } =>
            "user {user_id} not found",
        /// A value did not fit its column.
        OutOfRange { message: String } =>
            "value out of range: {message}",
    }
}

/// Transactional unit of work for placing one order.
#[async_trait]
pub trait OrderTransaction: Send {
    /// Lock the rows of `product_ids` for update and read their stock.
    ///
    /// Callers pass ids in ascending order; adapters lock in the order given.
    /// Ids with no row are absent from the result.
    async fn lock_products(
        &mut self,
        product_ids: &[ProductId],
    ) -> Result<Vec<StockSnapshot>, OrderStoreError>;

    /// Report whether the user exists.
    async fn user_exists(&mut self, user_id: UserId) -> Result<bool, OrderStoreError>;

    /// Insert the order header as `pending` together with its lines.
    async fn insert_order(&mut self, order: &PricedOrder) -> Result<Order, OrderStoreError>;

    /// Subtract `quantity` from a locked product and return the new stock.
    async fn decrement_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<i32, OrderStoreError>;

    /// Make every write of this transaction durable and visible.
    async fn commit(self: Box<Self>) -> Result<(), OrderStoreError>;

    /// Discard every write of this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), OrderStoreError>;
}

/// Port owning order headers and lines.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Open a transaction for placing an order.
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, OrderStoreError>;

    /// Find an order with its lines.
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// List a user's orders, newest first, or `None` when no user has the
    /// id.
    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Vec<Order>>, OrderStoreError>;

    /// Set the status of an order and return the updated order, or `None`
    /// when no order has the id.
    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn lock_timeout_keeps_driver_message() {
        let err = OrderStoreError::lock_timeout("canceling statement due to lock timeout");
        assert!(err.to_string().contains("lock timeout"));
    }

    #[rstest]
    fn stock_conflict_names_the_product() {
        let err = OrderStoreError::stock_conflict(ProductId::new(3));
        assert_eq!(
            err.to_string(),
            "stock for product 3 would become negative"
        );
    }
}
