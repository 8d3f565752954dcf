//! CSV decoding into typed columns.

use serde::Serialize;
use tracing::debug;

use crate::error::IoError;

/// A single CSV field after type inference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Number(f64),
    Text(String),
    /// Empty field, or a field absent from a short row. Serialises as `null`.
    Missing,
}

impl Cell {
    /// Infers the cell type of a trimmed field.
    pub fn parse(field: &str) -> Self {
        if field.is_empty() {
            Cell::Missing
        } else if let Ok(v) = field.parse::<i64>() {
            Cell::Integer(v)
        } else if let Ok(v) = field.parse::<f64>() {
            Cell::Number(v)
        } else {
            Cell::Text(field.to_string())
        }
    }

    /// Numeric value of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Number(v) => Some(*v),
            Cell::Text(_) | Cell::Missing => None,
        }
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// Columns of a CSV file, in header order. All columns have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Columns in header order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of data rows.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    /// Looks up a column by exact header name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Decodes a CSV file with a header row.
///
/// Fields are trimmed. Short rows are padded with [`Cell::Missing`]; rows
/// with more fields than the header are rejected.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`IoError::Csv`] | malformed CSV, invalid UTF-8, or an overlong row |
/// | [`IoError::EmptyTable`] | no header or no columns |
pub fn read_table(bytes: &[u8]) -> Result<Table, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(IoError::EmptyTable);
    }

    let mut columns: Vec<Column> = headers
        .iter()
        .map(|name| Column {
            name: name.to_string(),
            cells: Vec::new(),
        })
        .collect();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(IoError::Csv {
                reason: format!(
                    "record {} has {} fields, header has {}",
                    line + 1,
                    record.len(),
                    columns.len()
                ),
            });
        }
        for (i, column) in columns.iter_mut().enumerate() {
            let cell = record.get(i).map_or(Cell::Missing, Cell::parse);
            column.cells.push(cell);
        }
    }

    let table = Table { columns };
    debug!(
        columns = table.columns.len(),
        rows = table.n_rows(),
        "decoded table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_cell_types() {
        assert_eq!(Cell::parse("2001"), Cell::Integer(2001));
        assert_eq!(Cell::parse("1.5"), Cell::Number(1.5));
        assert_eq!(Cell::parse("forest"), Cell::Text("forest".into()));
        assert_eq!(Cell::parse(""), Cell::Missing);
    }

    #[test]
    fn reads_header_and_rows() {
        let table = read_table(b"year,area\n2000,1.5\n2001,2\n").unwrap();
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.n_rows(), 2);
        let area = table.column("area").unwrap();
        assert_eq!(area.cells, vec![Cell::Number(1.5), Cell::Integer(2)]);
    }

    #[test]
    fn trims_and_pads_short_rows() {
        let table = read_table(b"a, b ,c\n 1 ,x\n").unwrap();
        assert_eq!(table.columns()[1].name, "b");
        assert_eq!(table.columns()[0].cells, vec![Cell::Integer(1)]);
        assert_eq!(table.columns()[1].cells, vec![Cell::Text("x".into())]);
        assert_eq!(table.columns()[2].cells, vec![Cell::Missing]);
    }

    #[test]
    fn overlong_row_rejected() {
        let err = read_table(b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, IoError::Csv { .. }));
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(read_table(b""), Err(IoError::EmptyTable)));
    }

    #[test]
    fn header_only_has_no_rows() {
        let table = read_table(b"year,value\n").unwrap();
        assert_eq!(table.n_rows(), 0);
    }

    #[test]
    fn cells_serialize_untagged() {
        let cells = vec![
            Cell::Integer(3),
            Cell::Number(0.5),
            Cell::Text("t".into()),
            Cell::Missing,
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[3,0.5,"t",null]"#);
    }
}
