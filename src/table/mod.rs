pub mod reader;
pub mod schema;
pub mod writer;

use std::fmt;

pub use reader::read_manifest;
pub use schema::{normalize, ColumnAliases, ColumnMap, NormalizedTable, SchemaVariant};
pub use writer::{artifact_path, write_report};

/// A single spreadsheet cell, reduced to the value kinds the audit cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            // Whole numbers print without a trailing ".0" so that numeric
            // identifiers read the same as their text form.
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One data row with its 1-based line number in the source sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<Cell>,
}

impl RawRow {
    /// Cell at `column`; short rows read as empty.
    pub fn get(&self, column: usize) -> &Cell {
        self.cells.get(column).unwrap_or(&Cell::Empty)
    }
}

/// A manifest as handed over by the input side: a header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Build a table from header names and row cells, numbering rows as a
    /// spreadsheet would (header on line 1, data from line 2).
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| RawRow { line: i + 2, cells })
            .collect();
        Self { headers, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_display_whole_numbers() {
        assert_eq!(Cell::Number(12345.0).to_string(), "12345");
        assert_eq!(Cell::Number(-7.0).to_string(), "-7");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Text("AB-1".to_string()).to_string(), "AB-1");
        assert_eq!(Cell::Empty.to_string(), "");
    }

    #[test]
    fn test_blank_cells() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::Text("   ".to_string()).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
        assert!(!Cell::Bool(false).is_blank());
    }

    #[test]
    fn test_raw_table_line_numbers() {
        let table = RawTable::new(
            vec!["a".to_string()],
            vec![vec![Cell::Number(1.0)], vec![Cell::Number(2.0)]],
        );
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 3);
        assert_eq!(table.rows[1].get(5), &Cell::Empty);
    }
}
