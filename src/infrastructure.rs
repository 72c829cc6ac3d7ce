//! Infrastructure layer for HTTP fetching, HTML parsing, persistence and
//! runtime concerns
//!
//! Provides the rate-limited HTTP client, the seller inventory scraper, the
//! SQLite-backed dataset store, configuration loading and logging setup.

pub mod catalog;
pub mod config;
pub mod dataset_repository;
pub mod http_client;
pub mod logging;

// Re-export commonly used items
pub use catalog::{InventoryPageParser, SellerCatalogClient};
pub use config::AppConfig;
pub use dataset_repository::SqliteDatasetRepository;
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{init_logging, init_logging_with_config};
