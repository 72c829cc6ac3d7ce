//! Data Transfer Objects for the catalog grid surface
//!
//! Contains DTOs for data exchange between the use cases and whatever web
//! boundary embeds them. The table-data request mirrors the DataTables
//! server-side protocol, arriving as raw strings; malformed pagination and
//! sort parameters are recovered here by defaulting, never surfaced as
//! errors and never passed through to the query engine.

use serde::{Deserialize, Serialize};

use crate::domain::dataset::Row;
use crate::domain::query::{SortDirection, TableQuery, TableWindow};
use crate::domain::services::{CatalogFilters, CatalogRequest};

/// Fallback page length when the client sends none or garbage.
pub const DEFAULT_PAGE_LENGTH: usize = 250;

// ============================================================================
// Submission DTOs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    /// Free-text seller identifier as typed by the user.
    pub seller: String,
    #[serde(default)]
    pub vinyl_only: bool,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

impl SubmitRequest {
    /// Normalize the form input into a production job, dropping blank
    /// filter values the way the submission form sends them.
    pub fn into_catalog_request(self) -> CatalogRequest {
        let non_blank = |value: Option<String>| {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };
        CatalogRequest {
            seller: self.seller.trim().to_string(),
            filters: CatalogFilters {
                vinyl_only: self.vinyl_only,
                genre: non_blank(self.genre),
                style: non_blank(self.style),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub accepted: bool,
    pub message: String,
    #[serde(rename = "taskId", skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl SubmitResponse {
    pub fn accepted(task_id: String) -> Self {
        Self {
            accepted: true,
            message: "Getting data... (may take up to a minute)".to_string(),
            task_id: Some(task_id),
        }
    }

    pub fn rejected() -> Self {
        Self {
            accepted: false,
            message: "This seller does not exist or does not offer any records for sale"
                .to_string(),
            task_id: None,
        }
    }
}

// ============================================================================
// Status DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusResponse {
    pub completed: bool,
}

// ============================================================================
// Table data DTOs (DataTables server-side protocol)
// ============================================================================

/// Raw table-data parameters exactly as the grid client posts them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableDataParams {
    #[serde(default)]
    pub draw: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(rename = "search[value]", default)]
    pub search_value: Option<String>,
    #[serde(rename = "order[0][column]", default)]
    pub order_column: Option<String>,
    #[serde(rename = "order[0][dir]", default)]
    pub order_dir: Option<String>,
}

impl TableDataParams {
    /// Parse into a typed query, defaulting anything missing or unparseable:
    /// `start` → 0, `length` → 250, `draw` → 0, order → column 0 ascending.
    pub fn into_query(self) -> TableQuery {
        let parse_or = |raw: Option<String>, fallback: usize| {
            raw.and_then(|v| v.trim().parse::<usize>().ok()).unwrap_or(fallback)
        };

        let draw = self
            .draw
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let length = match parse_or(self.length, DEFAULT_PAGE_LENGTH) {
            0 => DEFAULT_PAGE_LENGTH,
            n => n,
        };
        let sort_direction = match self.order_dir.as_deref() {
            Some("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };

        TableQuery {
            draw,
            search: self.search_value.unwrap_or_default(),
            sort_column: parse_or(self.order_column, 0),
            sort_direction,
            offset: parse_or(self.start, 0),
            limit: length,
        }
    }
}

/// Response shape the grid client consumes directly.
#[derive(Debug, Clone, Serialize)]
pub struct TableDataResponse {
    pub draw: u64,
    #[serde(rename = "recordsTotal")]
    pub records_total: usize,
    #[serde(rename = "recordsFiltered")]
    pub records_filtered: usize,
    pub data: Vec<Row>,
}

impl From<TableWindow> for TableDataResponse {
    fn from(window: TableWindow) -> Self {
        Self {
            draw: window.draw,
            records_total: window.total,
            records_filtered: window.filtered,
            data: window.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_params_fall_back_to_defaults() {
        let params = TableDataParams {
            draw: Some("not-a-number".into()),
            start: Some("-3".into()),
            length: Some("".into()),
            search_value: None,
            order_column: Some("one".into()),
            order_dir: Some("sideways".into()),
        };

        let query = params.into_query();
        assert_eq!(query.draw, 0);
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, DEFAULT_PAGE_LENGTH);
        assert_eq!(query.sort_column, 0);
        assert_eq!(query.sort_direction, SortDirection::Ascending);
        assert!(query.search.is_empty());
    }

    #[test]
    fn well_formed_params_pass_through() {
        let params = TableDataParams {
            draw: Some("7".into()),
            start: Some("500".into()),
            length: Some("50".into()),
            search_value: Some("vinyl".into()),
            order_column: Some("4".into()),
            order_dir: Some("desc".into()),
        };

        let query = params.into_query();
        assert_eq!(query.draw, 7);
        assert_eq!(query.offset, 500);
        assert_eq!(query.limit, 50);
        assert_eq!(query.sort_column, 4);
        assert_eq!(query.sort_direction, SortDirection::Descending);
        assert_eq!(query.search, "vinyl");
    }

    #[test]
    fn blank_filters_are_dropped_from_the_job() {
        let request = SubmitRequest {
            seller: "  example_seller ".into(),
            vinyl_only: true,
            genre: Some("  ".into()),
            style: Some("Hard Bop".into()),
        };

        let job = request.into_catalog_request();
        assert_eq!(job.seller, "example_seller");
        assert!(job.filters.vinyl_only);
        assert_eq!(job.filters.genre, None);
        assert_eq!(job.filters.style.as_deref(), Some("Hard Bop"));
    }
}
