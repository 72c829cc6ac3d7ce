//! SQLite-backed dataset store
//!
//! One row per dataset id: column specs and row data are stored as JSON
//! alongside the creation timestamp. Datasets are write-once, so a plain
//! INSERT doubles as the double-write guard, and readers simply see no row
//! until the producer's write has committed.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Row as _, SqlitePool};

use crate::domain::dataset::{ColumnSpec, Dataset, Row};
use crate::domain::repositories::DatasetRepository;

pub struct SqliteDatasetRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteDatasetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open (or create) the database file and run the schema migration.
    pub async fn connect(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }
        if !database_path.exists() {
            std::fs::File::create(database_path)
                .with_context(|| format!("Failed to create db file: {}", database_path.display()))?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{}", database_path.display()))
            .await
            .with_context(|| format!("Failed to open database: {}", database_path.display()))?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS datasets (
                id TEXT PRIMARY KEY,
                columns TEXT NOT NULL,
                rows TEXT NOT NULL,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .context("Failed to create datasets table")?;
        Ok(())
    }
}

#[async_trait]
impl DatasetRepository for SqliteDatasetRepository {
    async fn insert(&self, dataset: &Dataset) -> Result<()> {
        let columns =
            serde_json::to_string(&dataset.columns).context("Failed to encode column specs")?;
        let rows = serde_json::to_string(&dataset.rows).context("Failed to encode rows")?;

        sqlx::query(
            r#"
            INSERT INTO datasets (id, columns, rows, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&dataset.id)
        .bind(columns)
        .bind(rows)
        .bind(dataset.created_at)
        .execute(&*self.pool)
        .await
        .with_context(|| format!("Failed to store dataset {}", dataset.id))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Dataset>> {
        let row = sqlx::query(
            r#"
            SELECT columns, rows, created_at FROM datasets WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .with_context(|| format!("Failed to load dataset {id}"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let columns: Vec<ColumnSpec> = serde_json::from_str(&row.get::<String, _>("columns"))
            .context("Corrupt column specs in store")?;
        let rows: Vec<Row> = serde_json::from_str(&row.get::<String, _>("rows"))
            .context("Corrupt row data in store")?;
        let created_at: DateTime<Utc> = row.get("created_at");

        Ok(Some(Dataset {
            id: id.to_string(),
            columns,
            rows,
            created_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repository_in(dir: &tempfile::TempDir) -> SqliteDatasetRepository {
        SqliteDatasetRepository::connect(&dir.path().join("datasets.db"))
            .await
            .expect("Failed to open test database")
    }

    fn dataset(id: &str) -> Dataset {
        Dataset::materialize(
            id,
            vec!["title".into(), "price".into()],
            vec![
                vec!["Blue Train".into(), "$39.99".into()],
                vec!["Giant Steps".into(), "€24.50".into()],
            ],
        )
    }

    #[tokio::test]
    async fn stored_dataset_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir).await;

        let original = dataset("task-1");
        repository.insert(&original).await.unwrap();

        let loaded = repository.find_by_id("task-1").await.unwrap().unwrap();
        assert_eq!(loaded.columns, original.columns);
        assert_eq!(loaded.rows, original.rows);
    }

    #[tokio::test]
    async fn unknown_id_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir).await;

        assert!(repository.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn double_write_of_an_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let repository = repository_in(&dir).await;

        repository.insert(&dataset("task-2")).await.unwrap();
        assert!(repository.insert(&dataset("task-2")).await.is_err());
    }
}
