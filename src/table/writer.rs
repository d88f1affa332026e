use atomic_write_file::AtomicWriteFile;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::Cell;
use crate::config::OutputConfig;
use crate::engine::{AuditReport, ShipmentRow, SummaryRow};
use crate::error::AuditError;

/// Derived columns appended after the input columns on the processed sheet.
pub const DERIVED_COLUMNS: [&str; 9] = [
    "kilos PESO REAL",
    "PESO VOLUMETRICO",
    "PESO A LIQUIDAR",
    "Rango",
    "Descripcion",
    "RANGO PRECIO A COBRAR",
    "DIFERENCIA",
    "REVISIÓN",
    "Repetido",
];

pub const SUMMARY_COLUMNS: [&str; 5] = [
    "Descripcion",
    "Total_Negativas",
    "Total_Positivas",
    "Total_OK",
    "Total_Repetidos",
];

const MONEY_FORMAT: &str = "#,##0.00";

/// Where the artifact for `input` goes: `<stem><suffix>.xlsx`, next to the
/// input unless an output directory is given.
pub fn artifact_path(input: &Path, output_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manifest".to_string());
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}{}.xlsx", stem, suffix))
}

/// Write the processed rows and the summary as two sheets of one workbook.
///
/// The workbook is rendered in memory and committed atomically, so a failed
/// run never leaves a truncated artifact behind.
pub fn write_report(
    report: &AuditReport,
    path: &Path,
    output: &OutputConfig,
) -> Result<(), AuditError> {
    let mut workbook = build_workbook(report, output).map_err(|e| AuditError::output(path, e))?;
    let bytes = workbook
        .save_to_buffer()
        .map_err(|e| AuditError::output(path, e))?;

    let mut file = AtomicWriteFile::open(path).map_err(|e| AuditError::output(path, e))?;
    file.write_all(&bytes).map_err(|e| AuditError::output(path, e))?;
    file.commit().map_err(|e| AuditError::output(path, e))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
    Ok(())
}

fn build_workbook(report: &AuditReport, output: &OutputConfig) -> Result<Workbook, XlsxError> {
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format(MONEY_FORMAT);

    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(&output.sheet_processed)?;
    let headers = report
        .headers
        .iter()
        .map(String::as_str)
        .chain(DERIVED_COLUMNS.iter().copied());
    for (col, name) in headers.enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &header)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    for (i, row) in report.rows.iter().enumerate() {
        write_processed_row(sheet, i as u32 + 1, report.headers.len(), row, &money)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(&output.sheet_summary)?;
    for (col, name) in SUMMARY_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (i, row) in report.summary.iter().enumerate() {
        let format = if row.is_total() { Some(&header) } else { None };
        write_summary_row(sheet, i as u32 + 1, row, &money, format)?;
    }

    Ok(workbook)
}

fn write_processed_row(
    sheet: &mut Worksheet,
    r: u32,
    input_width: usize,
    row: &ShipmentRow,
    money: &Format,
) -> Result<(), XlsxError> {
    for col in 0..input_width {
        let c = col as u16;
        match row.input.cells.get(col).unwrap_or(&Cell::Empty) {
            Cell::Empty => {}
            Cell::Number(n) => {
                sheet.write_number(r, c, *n)?;
            }
            Cell::Text(s) => {
                sheet.write_string(r, c, s)?;
            }
            Cell::Bool(b) => {
                sheet.write_boolean(r, c, *b)?;
            }
        }
    }

    let c = input_width as u16;
    sheet.write_number(r, c, to_f64(row.weight.actual_kg))?;
    sheet.write_number(r, c + 1, to_f64(row.weight.volumetric_kg))?;
    sheet.write_number(r, c + 2, to_f64(row.weight.billable_kg))?;
    sheet.write_string(r, c + 3, &row.bracket_label)?;
    if let Some(name) = row.zone_name {
        sheet.write_string(r, c + 4, name)?;
    }
    sheet.write_number_with_format(r, c + 5, to_f64(row.expected()), money)?;
    sheet.write_number_with_format(r, c + 6, to_f64(row.delta), money)?;
    sheet.write_string(r, c + 7, row.review.as_str())?;
    sheet.write_boolean(r, c + 8, row.duplicate)?;
    Ok(())
}

fn write_summary_row(
    sheet: &mut Worksheet,
    r: u32,
    row: &SummaryRow,
    money: &Format,
    emphasis: Option<&Format>,
) -> Result<(), XlsxError> {
    let label = row.zone.to_string();
    match emphasis {
        Some(format) => sheet.write_string_with_format(r, 0, &label, format)?,
        None => sheet.write_string(r, 0, &label)?,
    };
    sheet.write_number_with_format(r, 1, to_f64(row.total_negative), money)?;
    sheet.write_number_with_format(r, 2, to_f64(row.total_positive), money)?;
    sheet.write_number(r, 3, row.total_ok as f64)?;
    sheet.write_number(r, 4, row.total_duplicates as f64)?;
    Ok(())
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
