//! Repository interfaces for dataset snapshots
//!
//! Contains trait definitions for data access patterns. Implementations live
//! in the infrastructure layer; tests use the in-memory variant from
//! `test_utils`.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::dataset::Dataset;

/// Write-once store of materialized datasets keyed by their opaque id.
///
/// A dataset id is written at most once; `find_by_id` answers `None` until
/// the write has completed, which is what lets pollers race the producer
/// without locks.
#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Store a snapshot under its id. Writing an id twice is a programmer
    /// error; implementations reject it rather than silently replacing.
    async fn insert(&self, dataset: &Dataset) -> Result<()>;

    /// Fetch a snapshot, or `None` when the id is unknown or still being
    /// produced.
    async fn find_by_id(&self, id: &str) -> Result<Option<Dataset>>;
}
