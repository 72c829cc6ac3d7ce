//! Test utilities for record-grid
//!
//! Provides in-memory fakes so orchestration and query tests run without a
//! network or a database file: a stub catalog source with scriptable
//! behavior and a map-backed dataset repository.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::dataset::{Dataset, Row};
use crate::domain::repositories::DatasetRepository;
use crate::domain::services::{CatalogRequest, CatalogSource, InventorySnapshot};

/// Column names matching the scraped inventory layout.
pub fn sample_column_names() -> Vec<String> {
    ["artist", "title", "label", "year", "price"]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// A small inventory with text, number and currency columns; three of the
/// rows mention "Vinyl" in a text column.
pub fn sample_inventory() -> InventorySnapshot {
    let rows: Vec<Row> = vec![
        vec!["Miles Davis", "Kind of Blue (Vinyl)", "Columbia", "1959", "$34.99"],
        vec!["John Coltrane", "A Love Supreme", "Impulse!", "1965", "€29.00"],
        vec!["Thelonious Monk", "Brilliant Corners", "Riverside", "1957", "£22.50"],
        vec!["Charles Mingus", "Mingus Ah Um (vinyl reissue)", "Columbia", "1959", "$27.00"],
        vec!["Eric Dolphy", "Out to Lunch!", "Blue Note", "1964", "$45.00"],
        vec!["Art Blakey", "Moanin'", "Blue Note", "1958", "CA$31.25"],
        vec!["Dave Brubeck", "Time Out", "Columbia", "1959", "$18.75"],
        vec!["Ornette Coleman", "The Shape of Jazz to Come", "Atlantic", "1959", "€26.40"],
        vec!["Horace Silver", "Song for My Father", "Blue Note", "1965", "$23.10"],
        vec!["Sonny Rollins", "Saxophone Colossus, Vinyl", "Prestige", "1956", "$39.99"],
    ]
    .into_iter()
    .map(|row| row.into_iter().map(String::from).collect())
    .collect();

    InventorySnapshot {
        column_names: sample_column_names(),
        rows,
    }
}

/// Scriptable catalog source. The default verifies every seller and serves
/// [`sample_inventory`].
#[derive(Debug, Clone, Default)]
pub struct StubCatalogSource {
    reject_sellers: bool,
    fail_fetches: bool,
}

impl StubCatalogSource {
    /// Rejects every seller at verification time.
    pub fn rejecting() -> Self {
        Self {
            reject_sellers: true,
            ..Self::default()
        }
    }

    /// Verifies sellers but errors on every inventory fetch.
    pub fn failing() -> Self {
        Self {
            fail_fetches: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CatalogSource for StubCatalogSource {
    async fn verify_seller(&self, _seller: &str) -> Result<bool> {
        Ok(!self.reject_sellers)
    }

    async fn fetch_inventory(&self, request: &CatalogRequest) -> Result<InventorySnapshot> {
        if self.fail_fetches {
            bail!("simulated fetch failure for '{}'", request.seller);
        }
        Ok(sample_inventory())
    }
}

/// Map-backed dataset repository with the same write-once contract as the
/// durable implementation.
#[derive(Debug, Default)]
pub struct MemoryDatasetRepository {
    datasets: Arc<RwLock<HashMap<String, Dataset>>>,
}

impl MemoryDatasetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetRepository for MemoryDatasetRepository {
    async fn insert(&self, dataset: &Dataset) -> Result<()> {
        let mut datasets = self.datasets.write().await;
        if datasets.contains_key(&dataset.id) {
            bail!("dataset {} already exists", dataset.id);
        }
        datasets.insert(dataset.id.clone(), dataset.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Dataset>> {
        let datasets = self.datasets.read().await;
        Ok(datasets.get(id).cloned())
    }
}
