//! Inbound adapters translating external requests into domain port calls.
//!
//! - [`http`]: the REST API.
//! - [`telemetry`]: the sensor message callback.

pub mod http;
pub mod telemetry;
