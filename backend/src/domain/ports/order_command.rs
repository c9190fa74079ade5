//! Driving ports for placing orders and reading them back.

use async_trait::async_trait;

use crate::domain::{Error, Order, OrderDraft, OrderId, OrderStatus, UserId};

/// Driving port for order mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Validate, price, persist, and reserve stock for `draft` atomically.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, Error>;

    /// Move an order to `status`.
    async fn change_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, Error>;
}

/// Driving port for order reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// Fetch one order with its lines.
    async fn get_order(&self, order_id: OrderId) -> Result<Order, Error>;

    /// Fetch a user's orders, newest first.
    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, Error>;
}
