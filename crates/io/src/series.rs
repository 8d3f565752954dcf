//! Year/value column detection for time-series tables.
//!
//! The detection is a name-substring heuristic: it picks the first column
//! whose lower-cased header contains a keyword and otherwise falls back to a
//! fixed position. It is known to be fragile (a column named `population_year`
//! matches both roles) and the fallback order is kept exactly as is.

use serde::Serialize;

use crate::error::IoError;
use crate::table::{Cell, Table};

const YEAR_KEYWORDS: &[&str] = &["year", "date"];
const VALUE_KEYWORDS: &[&str] = &["value", "area", "pop"];

/// Columns selected by [`extract_series`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesColumns {
    #[serde(skip)]
    pub year_column: String,
    #[serde(skip)]
    pub value_column: String,
    pub years: Vec<Cell>,
    pub values: Vec<Cell>,
}

/// Picks the year and value columns of `table`.
///
/// Year: first header containing `year` or `date`, else column 0.
/// Value: first header containing `value`, `area` or `pop`, else column 1.
///
/// # Errors
///
/// [`IoError::MissingColumn`] when a fallback position does not exist.
pub fn extract_series(table: &Table) -> Result<SeriesColumns, IoError> {
    let columns = table.columns();
    let n_columns = columns.len();

    let year_idx = find_column(table, YEAR_KEYWORDS)
        .or((n_columns > 0).then_some(0))
        .ok_or(IoError::MissingColumn {
            role: "year",
            n_columns,
        })?;
    let value_idx = find_column(table, VALUE_KEYWORDS)
        .or((n_columns > 1).then_some(1))
        .ok_or(IoError::MissingColumn {
            role: "value",
            n_columns,
        })?;

    let year = &columns[year_idx];
    let value = &columns[value_idx];
    Ok(SeriesColumns {
        year_column: year.name.clone(),
        value_column: value.name.clone(),
        years: year.cells.clone(),
        values: value.cells.clone(),
    })
}

fn find_column(table: &Table, keywords: &[&str]) -> Option<usize> {
    table.columns().iter().position(|c| {
        let name = c.name.to_lowercase();
        keywords.iter().any(|k| name.contains(k))
    })
}
