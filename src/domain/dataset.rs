//! Immutable tabular dataset snapshots
//!
//! A dataset is written at most once under its id and never mutated after
//! materialization. Column kinds are computed here, at write time, and
//! persisted with the rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::columns::{self, ColumnKind};

/// One row of the catalog, cells aligned with the dataset's columns.
pub type Row = Vec<String>;

/// Name and inferred kind of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// Fully-materialized catalog snapshot addressed by an opaque id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Row>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Dataset {
    /// Build a snapshot from raw ingested rows, classifying every column.
    ///
    /// Row order is preserved as the default (unsorted) order. Ragged rows
    /// are padded or truncated to the column count so every cell access in
    /// the query engine is in bounds.
    pub fn materialize(id: impl Into<String>, column_names: Vec<String>, mut rows: Vec<Row>) -> Self {
        let width = column_names.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }

        let columns = column_names
            .into_iter()
            .enumerate()
            .map(|(index, name)| ColumnSpec {
                name,
                kind: columns::classify(rows.iter().map(|row| row[index].as_str())),
            })
            .collect();

        Self {
            id: id.into(),
            columns,
            rows,
            created_at: Utc::now(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Indexes of the text-kind columns, the ones free-text search scans.
    pub fn text_column_indexes(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, spec)| spec.kind == ColumnKind::Text)
            .map(|(index, _)| index)
            .collect()
    }
}
