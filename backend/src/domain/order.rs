//! Orders, order lines, and the typed failures of order placement.
//!
//! [`OrderDraft`] is the single canonical input for placing an order. Inbound
//! adapters convert their wire formats into it before calling the workflow.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, OrderId, OrderLineId, ProductId, UserId};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Newly placed; the initial status.
    Pending,
    /// Accepted for fulfilment.
    Confirmed,
    /// Handed to the carrier.
    Shipped,
    /// Withdrawn.
    Cancelled,
}

impl OrderStatus {
    /// Every accepted status value, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Shipped,
        Self::Cancelled,
    ];

    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a status string names none of the four statuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status `{value}`")]
pub struct UnknownOrderStatus {
    pub value: String,
}

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownOrderStatus {
                value: value.to_owned(),
            })
    }
}

/// One requested line of a candidate order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDraft {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Caller-supplied price; filled from the product when absent.
    pub unit_price: Option<Decimal>,
}

/// Candidate order submitted for placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub user_id: UserId,
    pub lines: Vec<OrderLineDraft>,
}

impl OrderDraft {
    /// Distinct product ids referenced by the draft, ascending.
    ///
    /// This is the order in which row locks are taken.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.lines.iter().map(|line| line.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// A validated line with its price fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// A validated order ready to persist.
///
/// `total` equals the sum of line subtotals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub user_id: UserId,
    pub lines: Vec<PricedLine>,
    pub total: Decimal,
}

/// A persisted order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// A persisted order with its lines in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub lines: Vec<OrderLine>,
}

/// Typed failures of order placement and status changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// The order has no lines.
    #[error("order must contain at least one line")]
    EmptyOrder,
    /// A line requests zero or fewer units.
    #[error("quantity for product {product_id} must be positive, got {quantity}")]
    InvalidQuantity { product_id: ProductId, quantity: i32 },
    /// A caller-supplied unit price is negative, finer than a cent, or too
    /// large to store.
    #[error(
        "unit price for product {product_id} must be a non-negative amount of whole cents \
         not exceeding 9999999999.99"
    )]
    InvalidUnitPrice { product_id: ProductId },
    /// A line subtotal or the order total exceeds the storable amount.
    #[error("order amount exceeds 999999999999.99")]
    AmountOutOfRange,
    /// A line names a product that does not exist.
    #[error("product {product_id} not found")]
    ProductNotFound { product_id: ProductId },
    /// The ordering user does not exist.
    #[error("user {user_id} not found")]
    UserNotFound { user_id: UserId },
    /// Stock on hand cannot cover the requested quantity.
    #[error("insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        available: i32,
        requested: i32,
    },
    /// A decrement would have left stock negative.
    #[error("stock for product {product_id} would become negative")]
    StockConflict { product_id: ProductId },
    /// A product row lock was not granted in time.
    #[error("timed out waiting for a product lock")]
    LockTimeout,
    /// The order does not exist.
    #[error("order {order_id} not found")]
    OrderNotFound { order_id: OrderId },
}

impl OrderError {
    /// Stable snake_case tag exposed in error details.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EmptyOrder => "empty_order",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::InvalidUnitPrice { .. } => "invalid_unit_price",
            Self::AmountOutOfRange => "amount_out_of_range",
            Self::ProductNotFound { .. } => "product_not_found",
            Self::UserNotFound { .. } => "user_not_found",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::StockConflict { .. } => "stock_conflict",
            Self::LockTimeout => "lock_timeout",
            Self::OrderNotFound { .. } => "order_not_found",
        }
    }
}

impl From<OrderError> for Error {
    fn from(value: OrderError) -> Self {
        let message = value.to_string();
        let mut details = json!({ "code": value.kind() });
        match &value {
            OrderError::InvalidQuantity { product_id, .. }
            | OrderError::InvalidUnitPrice { product_id }
            | OrderError::ProductNotFound { product_id }
            | OrderError::StockConflict { product_id } => {
                details["productId"] = json!(product_id.get());
            }
            OrderError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                details["productId"] = json!(product_id.get());
                details["available"] = json!(available);
                details["requested"] = json!(requested);
            }
            OrderError::UserNotFound { user_id } => {
                details["userId"] = json!(user_id.get());
            }
            OrderError::OrderNotFound { order_id } => {
                details["orderId"] = json!(order_id.get());
            }
            OrderError::EmptyOrder | OrderError::AmountOutOfRange | OrderError::LockTimeout => {}
        }

        let error = match value {
            OrderError::EmptyOrder
            | OrderError::InvalidQuantity { .. }
            | OrderError::InvalidUnitPrice { .. }
            | OrderError::AmountOutOfRange => Error::invalid_request(message),
            OrderError::ProductNotFound { .. }
            | OrderError::UserNotFound { .. }
            | OrderError::OrderNotFound { .. } => Error::not_found(message),
            OrderError::InsufficientStock { .. }
            | OrderError::StockConflict { .. }
            | OrderError::LockTimeout => Error::conflict(message),
        };
        error.with_details(details)
    }
}
