//! Inventory domain: aggregates, validation rules and services.
//!
//! Types here are transport and storage agnostic. Inbound adapters call the
//! driving ports in [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: error payload shared by every adapter.
//! - [`Product`], [`Order`], [`User`], [`Notification`]: persisted aggregates.
//! - [`validate_order`]: pure order validation against locked stock.
//! - [`OrderService`], [`ProductService`], [`UserService`],
//!   [`NotificationService`], [`SensorIngestionService`]: driving port
//!   implementations.

pub mod error;
pub mod ids;
pub mod notification;
pub mod notification_service;
pub mod order;
pub mod order_service;
pub mod order_validator;
pub mod ports;
pub mod product;
pub mod product_service;
pub mod sensor_ingestion;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{NotificationId, OrderId, OrderLineId, ProductId, UserId};
pub use self::notification::{
    NewNotification, Notification, NotificationLevel, NotificationValidationError,
    UnknownNotificationLevel,
};
pub use self::notification_service::NotificationService;
pub use self::order::{
    Order, OrderDraft, OrderError, OrderLine, OrderLineDraft, OrderStatus, PricedLine,
    PricedOrder, UnknownOrderStatus,
};
pub use self::order_service::{OrderService, OrderWorkflowState};
pub use self::order_validator::validate_order;
pub use self::product::{
    Product, ProductDraft, ProductValidationError, StockSnapshot, is_storable_price, max_amount,
    max_price,
};
pub use self::product_service::ProductService;
pub use self::sensor_ingestion::{
    DEFAULT_LOW_STOCK_THRESHOLD, SensorIngestionService, classify_stock,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{User, UserDraft, UserRole, UserValidationError};
pub use self::user_service::UserService;
