//! HTTP server configuration object.

use std::net::SocketAddr;
use std::time::Duration;

use inventory::domain::DEFAULT_LOW_STOCK_THRESHOLD;
use inventory::inbound::telemetry::DEFAULT_TELEMETRY_TOPIC;
use inventory::outbound::persistence::{DEFAULT_LOCK_TIMEOUT, DbPool};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) lock_timeout: Duration,
    pub(crate) low_stock_threshold: i32,
    pub(crate) telemetry_topic: String,
}

impl ServerConfig {
    /// Configuration with in-memory storage and default tuning.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            telemetry_topic: DEFAULT_TELEMETRY_TOPIC.to_owned(),
        }
    }

    /// Store everything in PostgreSQL through `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Bound on how long an order waits for a product row lock.
    #[must_use]
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Quantity at or below which sensor readings raise a warning.
    #[must_use]
    pub fn with_low_stock_threshold(mut self, threshold: i32) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    /// Topic filter for sensor messages.
    #[must_use]
    pub fn with_telemetry_topic(mut self, topic: impl Into<String>) -> Self {
        self.telemetry_topic = topic.into();
        self
    }
}
