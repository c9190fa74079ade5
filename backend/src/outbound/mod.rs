//! Outbound adapters implementing the driven domain ports.
//!
//! - **persistence**: PostgreSQL repositories and the order store on Diesel.
//! - **memory**: a single in-process store implementing every driven port,
//!   used when no database is configured.
//!
//! Adapters translate between domain types and storage representations and
//! contain no business rules.

pub mod memory;
pub mod persistence;

pub use memory::InMemoryInventory;
