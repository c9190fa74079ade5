//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are thin translators between Diesel rows and domain types.
//! Row structs (`models.rs`) and table definitions (`schema.rs`) never leave
//! this module. Connections come from a `bb8` pool of `diesel-async`
//! connections; database failures are classified once in
//! `diesel_error_mapping` and mapped onto each port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use inventory::outbound::persistence::{DbPool, DieselOrderStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/inventory")).await?;
//! let orders = DieselOrderStore::new(pool.clone())
//!     .with_lock_timeout(std::time::Duration::from_secs(2));
//! ```

mod diesel_error_mapping;
mod diesel_notification_repository;
mod diesel_order_store;
mod diesel_product_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_order_store::{DEFAULT_LOCK_TIMEOUT, DieselOrderStore};
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
