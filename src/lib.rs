//! record-grid - Seller catalog fetcher with a server-side table query engine
//!
//! A background job scrapes a seller's record catalog into an immutable
//! tabular snapshot keyed by an opaque id, while clients poll the task status
//! and then browse the snapshot through paginated, searchable, sortable
//! windows served by the query engine.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod test_utils;

// Re-export the service surface for embedding callers
pub use application::use_cases::CatalogService;
pub use application::tasks::TaskRegistry;
