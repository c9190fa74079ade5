//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`OrderStore`]) are implemented by outbound
//! adapters. Driving ports ([`OrderCommand`], [`ProductCatalogue`],
//! [`StockIngestion`], ...) are implemented by domain services and called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod notification_inbox;
mod notification_repository;
mod order_command;
mod order_store;
mod product_catalogue;
mod product_repository;
mod stock_ingestion;
mod user_directory;
mod user_repository;

#[cfg(test)]
pub use notification_inbox::MockNotificationInbox;
pub use notification_inbox::NotificationInbox;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use order_command::{MockOrderCommand, MockOrderQuery};
pub use order_command::{OrderCommand, OrderQuery};
#[cfg(test)]
pub use order_store::MockOrderStore;
pub use order_store::{OrderStore, OrderStoreError, OrderTransaction};
#[cfg(test)]
pub use product_catalogue::MockProductCatalogue;
pub use product_catalogue::ProductCatalogue;
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{ProductRepository, ProductRepositoryError};
#[cfg(test)]
pub use stock_ingestion::MockStockIngestion;
pub use stock_ingestion::{IngestionSummary, StockIngestion, StockReading};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
