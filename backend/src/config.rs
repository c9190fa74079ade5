//! Server settings loaded via OrthoConfig.
//!
//! Every value may come from the command line, an `INVENTORY_*` environment
//! variable, or a configuration file. Unset values fall back to the defaults
//! exposed by the accessor methods.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_LOW_STOCK_THRESHOLD;
use crate::inbound::telemetry::DEFAULT_TELEMETRY_TOPIC;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Runtime settings for the inventory server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "INVENTORY")]
pub struct InventorySettings {
    /// PostgreSQL connection string. Without it the server keeps everything
    /// in memory.
    pub database_url: Option<String>,
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// How long an order waits for a product row lock, in milliseconds.
    pub lock_timeout_ms: Option<u64>,
    /// Quantity at or below which sensor readings raise a warning.
    pub low_stock_threshold: Option<i32>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// MQTT-style topic filter for sensor messages.
    pub telemetry_topic: Option<String>,
}

impl InventorySettings {
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms.unwrap_or(DEFAULT_LOCK_TIMEOUT_MS))
    }

    #[must_use]
    pub fn low_stock_threshold(&self) -> i32 {
        self.low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
    }

    #[must_use]
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    #[must_use]
    pub fn telemetry_topic(&self) -> &str {
        self.telemetry_topic
            .as_deref()
            .unwrap_or(DEFAULT_TELEMETRY_TOPIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "INVENTORY_DATABASE_URL",
        "INVENTORY_BIND_ADDR",
        "INVENTORY_LOCK_TIMEOUT_MS",
        "INVENTORY_LOW_STOCK_THRESHOLD",
        "INVENTORY_POOL_MAX_SIZE",
        "INVENTORY_TELEMETRY_TOPIC",
    ];

    fn load_from_empty_args() -> InventorySettings {
        InventorySettings::load_from_iter([OsString::from("inventory")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert!(settings.database_url.is_none());
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
        assert_eq!(settings.lock_timeout(), Duration::from_millis(5_000));
        assert_eq!(settings.low_stock_threshold(), 10);
        assert_eq!(settings.pool_max_size(), 10);
        assert_eq!(settings.telemetry_topic(), "sensores/#");
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "INVENTORY_DATABASE_URL",
                Some("postgres://inv@localhost/inv".to_owned()),
            ),
            ("INVENTORY_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("INVENTORY_LOCK_TIMEOUT_MS", Some("250".to_owned())),
            ("INVENTORY_LOW_STOCK_THRESHOLD", Some("3".to_owned())),
            ("INVENTORY_POOL_MAX_SIZE", Some("4".to_owned())),
            ("INVENTORY_TELEMETRY_TOPIC", Some("planta/+/peso".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://inv@localhost/inv")
        );
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000");
        assert_eq!(settings.lock_timeout(), Duration::from_millis(250));
        assert_eq!(settings.low_stock_threshold(), 3);
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.telemetry_topic(), "planta/+/peso");
    }
}
