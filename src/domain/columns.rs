//! Column typing and cell comparison for table sorting
//!
//! A column's kind is inferred once when a dataset is materialized and stored
//! alongside it, so the query engine never re-sniffs types per request. The
//! comparators define a total order over arbitrary cell strings, including
//! malformed and missing values.

use std::cmp::Ordering;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Currency markers seen in seller listings: symbols of the locales the
    /// marketplace quotes prices in, plus thousands separators.
    static ref CURRENCY_MARKER: Regex =
        Regex::new(r"CA\$|MX\$|NZ\$|A\$|R\$|CHF|SEK|DKK|ZAR|[€$£¥,]").expect("valid currency pattern");
}

/// Semantic type of a column, driving comparison and free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Plain text; compared lexicographically, included in free-text search.
    Text,
    /// Every non-empty value parses as a plain number.
    Number,
    /// Locale-formatted monetary amounts ("$1,234.50", "€999.00").
    Currency,
}

/// Infer the kind of a column from its raw cell values.
///
/// Empty cells are ignored. A column is `Number` when every non-empty value
/// parses as a plain number, `Currency` when every non-empty value parses
/// after stripping currency markers and at least one value actually carries
/// a marker, and `Text` otherwise. Deterministic for a fixed set of values.
pub fn classify<'a, I>(values: I) -> ColumnKind
where
    I: IntoIterator<Item = &'a str>,
{
    let mut saw_value = false;
    let mut all_number = true;
    let mut all_currency = true;
    let mut saw_marker = false;

    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        saw_value = true;

        if value.parse::<f64>().is_err() {
            all_number = false;
        }
        if parse_currency(value).is_some() {
            if CURRENCY_MARKER.is_match(value) {
                saw_marker = true;
            }
        } else {
            all_currency = false;
        }
    }

    if !saw_value {
        return ColumnKind::Text;
    }
    if all_number {
        ColumnKind::Number
    } else if all_currency && saw_marker {
        ColumnKind::Currency
    } else {
        ColumnKind::Text
    }
}

/// Compare two raw cell values under the given column kind.
///
/// Number and Currency kinds place values that fail to parse after all
/// parseable ones, so malformed cells group together instead of raising.
pub fn compare(a: &str, b: &str, kind: ColumnKind) -> Ordering {
    match kind {
        ColumnKind::Text => a.cmp(b),
        ColumnKind::Number => compare_parsed(parse_number(a), parse_number(b)),
        ColumnKind::Currency => compare_parsed(parse_currency(a), parse_currency(b)),
    }
}

/// Parse a plain numeric cell, tolerating surrounding whitespace.
fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Parse a currency-formatted cell by stripping symbols and thousands
/// separators before the numeric parse. "$1,234.50" → 1234.5
pub fn parse_currency(value: &str) -> Option<f64> {
    let stripped = CURRENCY_MARKER.replace_all(value, "");
    stripped.trim().parse::<f64>().ok()
}

fn compare_parsed(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
