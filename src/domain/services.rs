//! Domain service interfaces for catalog acquisition
//!
//! The catalog source is the seam between the task orchestration logic and
//! the scraping infrastructure; tests substitute a stub implementation.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::dataset::Row;

/// Optional narrowing of a catalog fetch, straight from the submission form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFilters {
    /// Restrict to vinyl pressings only.
    pub vinyl_only: bool,
    pub genre: Option<String>,
    pub style: Option<String>,
}

/// One catalog production job: whose inventory, narrowed how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRequest {
    pub seller: String,
    pub filters: CatalogFilters,
}

/// Raw ingested inventory before materialization: header names plus rows in
/// source order.
#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    pub column_names: Vec<String>,
    pub rows: Vec<Row>,
}

/// Provider of seller inventories.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Synchronous pre-flight check: does this seller exist and offer
    /// anything for sale? Runs before a task is allocated.
    async fn verify_seller(&self, seller: &str) -> Result<bool>;

    /// Fetch the full inventory for a verified seller. May take a while;
    /// always runs inside a background production task.
    async fn fetch_inventory(&self, request: &CatalogRequest) -> Result<InventorySnapshot>;
}
