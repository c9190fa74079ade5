//! Driving port for sensor stock readings.
//!
//! Ingestion is fire-and-forget: individual reading failures are logged by
//! the service and summarised, never returned as errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ProductId;

/// One gauge reading: the absolute quantity a sensor observed on the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReading {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Outcome counters for one ingested batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionSummary {
    /// Readings whose stock replacement succeeded.
    pub applied: usize,
    /// Readings dropped because of an error or a missing product.
    pub skipped: usize,
    /// Notifications stored for administrators.
    pub notifications: usize,
}

/// Driving port for telemetry adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockIngestion: Send + Sync {
    /// Apply every reading independently.
    async fn ingest_readings(&self, readings: Vec<StockReading>) -> IngestionSummary;
}
