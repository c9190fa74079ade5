//! Telemetry inbound adapter.
//!
//! A message transport hands `(topic, payload)` pairs to
//! [`TelemetryHandler::handle_message`]. Messages on topics outside the
//! configured filter are ignored; payloads are decoded into
//! [`StockReading`]s and forwarded to the ingestion port. Nothing here ever
//! fails towards the transport: malformed input is logged and dropped.
//!
//! Accepted payload shape (English aliases are also accepted):
//!
//! ```json
//! {"lecturas": [{"producto_id": 3, "cantidad": 7}]}
//! ```

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::ports::{IngestionSummary, StockIngestion, StockReading};
use crate::domain::ProductId;

/// Topic filter used when none is configured.
pub const DEFAULT_TELEMETRY_TOPIC: &str = "sensores/#";

#[derive(Debug, Deserialize)]
struct ReadingPayload {
    #[serde(alias = "producto_id", alias = "productId")]
    product_id: i64,
    #[serde(alias = "cantidad")]
    quantity: i32,
}

#[derive(Debug, Deserialize)]
struct TelemetryPayload {
    #[serde(default, alias = "lecturas")]
    readings: Option<Vec<ReadingPayload>>,
}

/// Reasons a telemetry payload was dropped.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryPayloadError {
    #[error("payload is not valid UTF-8")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("payload is not a readings document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode a payload into readings; an absent or empty list yields none.
///
/// # Examples
/// ```
/// use inventory::inbound::telemetry::parse_readings;
///
/// let readings = parse_readings(br#"{"lecturas":[{"producto_id":3,"cantidad":7}]}"#)
///     .expect("valid payload");
/// assert_eq!(readings.len(), 1);
/// assert_eq!(readings[0].quantity, 7);
/// ```
pub fn parse_readings(payload: &[u8]) -> Result<Vec<StockReading>, TelemetryPayloadError> {
    let text = std::str::from_utf8(payload)?;
    let decoded: TelemetryPayload = serde_json::from_str(text)?;
    Ok(decoded
        .readings
        .unwrap_or_default()
        .into_iter()
        .map(|reading| StockReading {
            product_id: ProductId::new(reading.product_id),
            quantity: reading.quantity,
        })
        .collect())
}

/// Match `topic` against an MQTT-style filter.
///
/// `+` matches exactly one level and a trailing `#` matches the parent level
/// and everything below it.
///
/// # Examples
/// ```
/// use inventory::inbound::telemetry::topic_matches;
///
/// assert!(topic_matches("sensores/#", "sensores/almacen/1"));
/// assert!(topic_matches("sensores/+/peso", "sensores/a/peso"));
/// assert!(!topic_matches("sensores/+", "sensores/a/b"));
/// ```
#[must_use]
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    let mut topic_levels = topic.split('/');
    for level in filter.split('/') {
        if level == "#" {
            return true;
        }
        match topic_levels.next() {
            Some(actual) if level == "+" || level == actual => {}
            _ => return false,
        }
    }
    topic_levels.next().is_none()
}

/// Callback target for a telemetry transport.
#[derive(Clone)]
pub struct TelemetryHandler {
    ingestion: Arc<dyn StockIngestion>,
    topic_filter: String,
}

impl TelemetryHandler {
    pub fn new(ingestion: Arc<dyn StockIngestion>, topic_filter: impl Into<String>) -> Self {
        Self {
            ingestion,
            topic_filter: topic_filter.into(),
        }
    }

    /// The filter a transport should subscribe with.
    #[must_use]
    pub fn topic_filter(&self) -> &str {
        &self.topic_filter
    }

    /// Process one message. Returns the batch summary when the message was
    /// ingested, `None` when it was ignored or dropped.
    pub async fn handle_message(&self, topic: &str, payload: &[u8]) -> Option<IngestionSummary> {
        if !topic_matches(&self.topic_filter, topic) {
            debug!(topic, filter = %self.topic_filter, "ignoring message outside telemetry filter");
            return None;
        }
        let readings = match parse_readings(payload) {
            Ok(readings) => readings,
            Err(error) => {
                warn!(topic, %error, "dropping malformed telemetry payload");
                return None;
            }
        };
        if readings.is_empty() {
            debug!(topic, "telemetry message carried no readings");
            return None;
        }
        let summary = self.ingestion.ingest_readings(readings).await;
        info!(
            topic,
            applied = summary.applied,
            skipped = summary.skipped,
            notifications = summary.notifications,
            "telemetry batch ingested"
        );
        Some(summary)
    }
}
