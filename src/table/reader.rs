use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

use super::{Cell, RawRow, RawTable};
use crate::error::AuditError;

/// Read a manifest from the first worksheet of a spreadsheet (or the named
/// one). The first row is taken as the header row.
///
/// Rows whose cells are all blank are dropped: exports often pad the used
/// range with empty rows. Line numbers of the remaining rows still refer to
/// the sheet.
pub fn read_manifest(path: &Path, sheet: Option<&str>) -> Result<RawTable, AuditError> {
    if !path.exists() {
        return Err(AuditError::MissingInput(format!(
            "{} does not exist",
            path.display()
        )));
    }

    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook.sheet_names().first().cloned().ok_or_else(|| {
            AuditError::MissingInput(format!("{} contains no worksheets", path.display()))
        })?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    // Absolute sheet row of the first row in the used range (0-based).
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string()).collect(),
        None => {
            return Err(AuditError::MissingInput(format!(
                "sheet '{}' in {} is empty",
                sheet_name,
                path.display()
            )))
        }
    };

    let rows = rows
        .enumerate()
        .map(|(i, cells)| RawRow {
            line: first_row + i + 2,
            cells: cells.iter().map(convert_cell).collect(),
        })
        .filter(|row| !row.cells.iter().all(Cell::is_blank))
        .collect();

    tracing::debug!(path = %path.display(), sheet = %sheet_name, "read manifest");

    Ok(RawTable { headers, rows })
}

fn convert_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Float(n) => Cell::Number(*n),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        // Dates, durations and error values are kept as text; they only ever
        // reach numeric columns by mistake and are reported there.
        other => Cell::Text(other.to_string()),
    }
}
