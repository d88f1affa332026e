use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::weight::Measurements;
use crate::error::AuditError;
use crate::table::schema::{
    MeasurementColumns, ASSESSED, BILLED, GRAMS, HEIGHT, LENGTH, WIDTH, ZONE,
};
use crate::table::{Cell, ColumnMap, RawRow};
use crate::tariff::Zone;

/// Largest magnitude accepted in a numeric column. Keeps weight derivation
/// inside the range of an exact decimal; charges and totals are checked where
/// they are computed.
const MAX_CELL_MAGNITUDE: Decimal = dec!(1000000000);

/// The typed fields of one manifest row, ready for computation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentInput {
    pub line: usize,
    pub identifier: String,
    pub zone: Zone,
    pub actual_grams: Decimal,
    pub measurements: Measurements,
    pub billed: Decimal,
    /// Every cell of the source row, in normalized header order
    pub cells: Vec<Cell>,
}

/// Extract the typed fields of a row. Any blank or non-numeric value in a
/// numeric column fails with the row, column and offending value.
pub fn parse_row(row: RawRow, columns: &ColumnMap) -> Result<ShipmentInput, AuditError> {
    let line = row.line;
    let number = |index: usize, field: &'static str| parse_decimal(row.get(index), line, field);

    let actual_grams = number(columns.grams, GRAMS)?;
    let zone = parse_zone(row.get(columns.zone), line)?;
    let measurements = match columns.measurements {
        MeasurementColumns::Dimensional {
            height,
            width,
            length,
        } => Measurements::Dimensional {
            height_cm: number(height, HEIGHT)?,
            width_cm: number(width, WIDTH)?,
            length_cm: number(length, LENGTH)?,
        },
        MeasurementColumns::Assessed { assessed } => Measurements::Assessed {
            assessed_grams: number(assessed, ASSESSED)?,
        },
    };
    let billed = number(columns.billed, BILLED)?;
    let identifier = row.get(columns.identifier).to_string().trim().to_string();

    Ok(ShipmentInput {
        line,
        identifier,
        zone,
        actual_grams,
        measurements,
        billed,
        cells: row.cells,
    })
}

fn parse_decimal(cell: &Cell, line: usize, field: &'static str) -> Result<Decimal, AuditError> {
    let fail = |reason: &'static str| AuditError::Computation {
        line,
        field,
        value: cell.to_string(),
        reason,
    };

    let value = match cell {
        Cell::Number(n) if !n.is_finite() => return Err(fail("not a finite number")),
        Cell::Number(n) => Decimal::from_f64(*n).ok_or_else(|| fail("value out of range"))?,
        Cell::Text(s) if s.trim().is_empty() => return Err(fail("empty cell")),
        Cell::Text(s) => s.trim().parse::<Decimal>().map_err(|_| fail("not a number"))?,
        Cell::Empty => return Err(fail("empty cell")),
        Cell::Bool(_) => return Err(fail("not a number")),
    };

    if value.abs() > MAX_CELL_MAGNITUDE {
        return Err(fail("value out of range"));
    }
    Ok(value)
}

fn parse_zone(cell: &Cell, line: usize) -> Result<Zone, AuditError> {
    let value = parse_decimal(cell, line, ZONE)?;
    if !value.fract().is_zero() {
        return Err(AuditError::Computation {
            line,
            field: ZONE,
            value: cell.to_string(),
            reason: "zone must be a whole number",
        });
    }
    // In range after the magnitude check above.
    Ok(Zone(value.to_i64().unwrap_or_default()))
}
