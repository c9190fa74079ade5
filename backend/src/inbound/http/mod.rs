//! HTTP inbound adapter exposing the REST API.

pub mod error;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod routes;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
