//! Catalog grid use cases
//!
//! Ties the pieces together: seller verification gates submission, accepted
//! jobs run as fire-and-forget tokio tasks that materialize and store a
//! dataset before flipping the completion flag, and the query surface serves
//! table windows over stored snapshots.

use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{error, info};

use crate::application::dto::{
    SubmitRequest, SubmitResponse, TableDataParams, TableDataResponse, TaskStatusResponse,
};
use crate::application::tasks::TaskRegistry;
use crate::domain::dataset::Dataset;
use crate::domain::query;
use crate::domain::repositories::DatasetRepository;
use crate::domain::services::{CatalogRequest, CatalogSource};
use crate::infrastructure::catalog::SellerCatalogClient;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::dataset_repository::SqliteDatasetRepository;

/// Status poll failures surfaced to the boundary.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Invalid task id: {0}")]
    UnknownTask(String),
}

/// Table query failures surfaced to the boundary.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Seller's collection with this id does not exist: {0}")]
    DatasetNotFound(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Application service for the catalog grid.
///
/// Submission never blocks on production; the only synchronous collaborator
/// call is the seller verification probe. Polling the task status is the
/// sole completion channel.
pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
    datasets: Arc<dyn DatasetRepository>,
    tasks: Arc<TaskRegistry>,
}

impl CatalogService {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        datasets: Arc<dyn DatasetRepository>,
        tasks: Arc<TaskRegistry>,
    ) -> Self {
        Self {
            source,
            datasets,
            tasks,
        }
    }

    /// Wire the production stack from configuration: scraping source,
    /// durable dataset store, and a task registry with its background
    /// reaper.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let source = SellerCatalogClient::new(config.catalog.clone(), config.http.clone())?;
        let datasets = SqliteDatasetRepository::connect(&config.storage.database_path).await?;

        let tasks = Arc::new(TaskRegistry::new());
        TaskRegistry::spawn_reaper(
            Arc::clone(&tasks),
            std::time::Duration::from_secs(config.storage.reap_interval_seconds),
            chrono::Duration::seconds(config.storage.task_ttl_seconds as i64),
        );

        Ok(Self::new(Arc::new(source), Arc::new(datasets), tasks))
    }

    /// Submit a catalog production job.
    ///
    /// Verifies the seller synchronously; a rejected seller short-circuits
    /// with `accepted=false` and no task allocated. Otherwise the job starts
    /// in the background and the fresh task id returns immediately.
    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse> {
        let job = request.into_catalog_request();

        let is_seller = self
            .source
            .verify_seller(&job.seller)
            .await
            .with_context(|| format!("Seller verification failed for '{}'", job.seller))?;
        if !is_seller {
            info!("Rejected submission for seller '{}'", job.seller);
            return Ok(SubmitResponse::rejected());
        }

        let task_id = self.tasks.register().await;
        self.spawn_production(task_id.clone(), job);
        Ok(SubmitResponse::accepted(task_id))
    }

    /// Poll the completion flag for a task id.
    pub async fn status(&self, task_id: &str) -> Result<TaskStatusResponse, StatusError> {
        match self.tasks.status(task_id).await {
            Some(state) => Ok(TaskStatusResponse {
                completed: state.completed,
            }),
            None => Err(StatusError::UnknownTask(task_id.to_string())),
        }
    }

    /// Answer a table-data request against the dataset stored under `id`.
    pub async fn table_data(
        &self,
        dataset_id: &str,
        params: TableDataParams,
    ) -> Result<TableDataResponse, QueryError> {
        let dataset = self
            .datasets
            .find_by_id(dataset_id)
            .await?
            .ok_or_else(|| QueryError::DatasetNotFound(dataset_id.to_string()))?;

        let window = query::run(&dataset, &params.into_query());
        Ok(TableDataResponse::from(window))
    }

    /// Launch the production run for an accepted job, detached from the
    /// submitting caller. Failures are absorbed here: the task still
    /// completes so pollers terminate, and the dataset read stays empty.
    fn spawn_production(&self, task_id: String, job: CatalogRequest) {
        let source = Arc::clone(&self.source);
        let datasets = Arc::clone(&self.datasets);
        let tasks = Arc::clone(&self.tasks);

        tokio::spawn(async move {
            match produce_dataset(source, datasets, &task_id, &job).await {
                Ok(row_count) => {
                    // The snapshot is durably stored before the flag flips,
                    // so a poller never sees completed without a dataset.
                    tasks.complete(&task_id).await;
                    info!(
                        "Produced dataset {} with {} rows for seller '{}'",
                        task_id, row_count, job.seller
                    );
                }
                Err(err) => {
                    error!(
                        "Production failed for task {} (seller '{}'): {:#}",
                        task_id, job.seller, err
                    );
                    tasks.fail(&task_id).await;
                }
            }
        });
    }
}

/// Fetch, materialize and store one catalog snapshot.
async fn produce_dataset(
    source: Arc<dyn CatalogSource>,
    datasets: Arc<dyn DatasetRepository>,
    task_id: &str,
    job: &CatalogRequest,
) -> Result<usize> {
    let snapshot = source
        .fetch_inventory(job)
        .await
        .with_context(|| format!("Failed to fetch inventory for '{}'", job.seller))?;

    let dataset = Dataset::materialize(task_id, snapshot.column_names, snapshot.rows);
    let row_count = dataset.row_count();

    datasets
        .insert(&dataset)
        .await
        .with_context(|| format!("Failed to store dataset {task_id}"))?;

    Ok(row_count)
}
