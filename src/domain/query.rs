//! Table query engine
//!
//! Serves windowed views over a materialized dataset: filter by a free-text
//! search term, stable-sort by one column, then slice out the requested page.
//! Purely synchronous and in-memory; the caller holds the snapshot.

use serde::{Deserialize, Serialize};

use crate::domain::columns;
use crate::domain::dataset::{Dataset, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A single windowed view request against a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableQuery {
    /// Echo token reconciling out-of-order responses; returned unchanged.
    pub draw: u64,
    /// Free-text term; empty means no filtering.
    pub search: String,
    pub sort_column: usize,
    pub sort_direction: SortDirection,
    pub offset: usize,
    pub limit: usize,
}

/// The answered window: counts plus the requested row slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableWindow {
    pub draw: u64,
    /// Unfiltered row count of the dataset.
    pub total: usize,
    /// Row count after the search filter.
    pub filtered: usize,
    pub rows: Vec<Row>,
}

/// Answer a query against a dataset snapshot.
///
/// The search term is matched case-insensitively as a literal substring
/// against text-kind columns only; metacharacters have no special meaning.
/// A sort column index outside the dataset's width leaves the filter order
/// untouched rather than failing. An offset past the end yields an empty
/// slice. Always upholds `offset + rows.len() <= filtered <= total`.
pub fn run(dataset: &Dataset, query: &TableQuery) -> TableWindow {
    let total = dataset.row_count();

    let mut selected: Vec<&Row> = if query.search.is_empty() {
        dataset.rows.iter().collect()
    } else {
        let text_columns = dataset.text_column_indexes();
        if text_columns.is_empty() {
            // Nothing searchable; mirror the unfiltered view.
            dataset.rows.iter().collect()
        } else {
            let needle = query.search.to_lowercase();
            dataset
                .rows
                .iter()
                .filter(|row| {
                    text_columns
                        .iter()
                        .any(|&index| row[index].to_lowercase().contains(&needle))
                })
                .collect()
        }
    };

    let filtered = selected.len();

    if let Some(spec) = dataset.columns.get(query.sort_column) {
        let kind = spec.kind;
        let index = query.sort_column;
        // sort_by is stable, so rows that compare equal keep their
        // pre-sort relative order in both directions.
        selected.sort_by(|a, b| {
            let ordering = columns::compare(&a[index], &b[index], kind);
            match query.sort_direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    let rows: Vec<Row> = selected
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .cloned()
        .collect();

    TableWindow {
        draw: query.draw,
        total,
        filtered,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Dataset;

    fn sample_dataset() -> Dataset {
        let rows = vec![
            vec!["Blue Train", "Blue Note", "1957", "$39.99"],
            vec!["Giant Steps", "Atlantic", "1960", "$24.50"],
            vec!["Blue Monk", "Riverside", "1954", "€19.00"],
            vec!["Alligator", "Delmark", "1971", "£12.75"],
        ]
        .into_iter()
        .map(|row| row.into_iter().map(String::from).collect())
        .collect();

        Dataset::materialize(
            "sample",
            vec!["title".into(), "label".into(), "year".into(), "price".into()],
            rows,
        )
    }

    fn query() -> TableQuery {
        TableQuery {
            draw: 1,
            search: String::new(),
            sort_column: 0,
            sort_direction: SortDirection::Ascending,
            offset: 0,
            limit: 250,
        }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let window = run(&sample_dataset(), &TableQuery { search: "BLUE".into(), ..query() });
        assert_eq!(window.total, 4);
        assert_eq!(window.filtered, 2);
        assert!(window.rows.iter().all(|row| row[0].contains("Blue")));
    }

    #[test]
    fn search_skips_numeric_and_currency_columns() {
        // "19" appears in year and price cells but in no text column.
        let window = run(&sample_dataset(), &TableQuery { search: "19".into(), ..query() });
        assert_eq!(window.filtered, 0);
        assert!(window.rows.is_empty());
    }

    #[test]
    fn metacharacters_match_literally() {
        let window = run(&sample_dataset(), &TableQuery { search: ".*".into(), ..query() });
        assert_eq!(window.filtered, 0);
    }

    #[test]
    fn sort_by_currency_column_orders_numerically_across_symbols() {
        let window = run(&sample_dataset(), &TableQuery { sort_column: 3, ..query() });
        let prices: Vec<&str> = window.rows.iter().map(|row| row[3].as_str()).collect();
        assert_eq!(prices, vec!["£12.75", "€19.00", "$24.50", "$39.99"]);
    }

    #[test]
    fn descending_sort_reverses_the_order() {
        let window = run(
            &sample_dataset(),
            &TableQuery { sort_column: 2, sort_direction: SortDirection::Descending, ..query() },
        );
        let years: Vec<&str> = window.rows.iter().map(|row| row[2].as_str()).collect();
        assert_eq!(years, vec!["1971", "1960", "1957", "1954"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let rows = vec![
            vec!["b".to_string(), "first".to_string()],
            vec!["a".to_string(), "second".to_string()],
            vec!["b".to_string(), "third".to_string()],
        ];
        let dataset = Dataset::materialize("stable", vec!["key".into(), "tag".into()], rows);

        let window = run(&dataset, &query());
        let tags: Vec<&str> = window.rows.iter().map(|row| row[1].as_str()).collect();
        assert_eq!(tags, vec!["second", "first", "third"]);
    }

    #[test]
    fn out_of_range_sort_column_preserves_filter_order() {
        let window = run(&sample_dataset(), &TableQuery { sort_column: 99, ..query() });
        assert_eq!(window.rows[0][0], "Blue Train");
        assert_eq!(window.rows[3][0], "Alligator");
    }

    #[test]
    fn out_of_range_offset_returns_empty_slice() {
        let window = run(&sample_dataset(), &TableQuery { offset: 1000, limit: 10, ..query() });
        assert!(window.rows.is_empty());
        assert_eq!(window.filtered, 4);
    }

    #[test]
    fn window_invariant_holds() {
        for offset in [0usize, 1, 3, 4, 50] {
            for limit in [1usize, 2, 10] {
                let window = run(&sample_dataset(), &TableQuery { offset, limit, ..query() });
                assert!(window.rows.len() <= window.filtered.saturating_sub(offset));
                assert!(window.filtered <= window.total);
            }
        }
    }

    #[test]
    fn dataset_without_text_columns_skips_the_filter() {
        let rows = vec![
            vec!["1".to_string(), "$5.00".to_string()],
            vec!["2".to_string(), "$6.00".to_string()],
        ];
        let dataset = Dataset::materialize("numeric", vec!["n".into(), "price".into()], rows);

        let window = run(&dataset, &TableQuery { search: "anything".into(), ..query() });
        assert_eq!(window.filtered, 2);
    }
}
