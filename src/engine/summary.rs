use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

use super::reconcile::{Review, ShipmentRow};
use crate::error::AuditError;

pub const TOTAL_LABEL: &str = "Total";

/// Grouping key of a summary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryKey {
    Zone(String),
    /// Rows whose zone has no name
    Unmapped,
    Total,
}

impl fmt::Display for SummaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryKey::Zone(name) => f.write_str(name),
            SummaryKey::Unmapped => Ok(()),
            SummaryKey::Total => f.write_str(TOTAL_LABEL),
        }
    }
}

impl Serialize for SummaryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SummaryKey::Unmapped => serializer.serialize_none(),
            other => serializer.collect_str(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub zone: SummaryKey,
    /// Sum of negative deltas (under-billing)
    pub total_negative: Decimal,
    /// Sum of positive deltas (over-billing)
    pub total_positive: Decimal,
    pub total_ok: usize,
    /// Rows in the group whose identifier is duplicated anywhere in the manifest
    pub total_duplicates: usize,
}

impl SummaryRow {
    fn empty(zone: SummaryKey) -> Self {
        Self {
            zone,
            total_negative: Decimal::ZERO,
            total_positive: Decimal::ZERO,
            total_ok: 0,
            total_duplicates: 0,
        }
    }

    /// Fold one row into the group. None when a sum leaves the decimal range.
    fn add_row(&mut self, row: &ShipmentRow) -> Option<()> {
        if row.delta < Decimal::ZERO {
            self.total_negative = self.total_negative.checked_add(row.delta)?;
        } else if row.delta > Decimal::ZERO {
            self.total_positive = self.total_positive.checked_add(row.delta)?;
        }
        if row.review == Review::Ok {
            self.total_ok += 1;
        }
        if row.duplicate {
            self.total_duplicates += 1;
        }
        Some(())
    }

    pub fn is_total(&self) -> bool {
        self.zone == SummaryKey::Total
    }
}

/// Group rows by zone name in order of first appearance and append a Total
/// row. Total is always last, even for an empty manifest, and equals the
/// column-wise sum of the group rows.
pub fn summarize(rows: &[ShipmentRow]) -> Result<Vec<SummaryRow>, AuditError> {
    let mut groups: Vec<SummaryRow> = Vec::new();
    let mut total = SummaryRow::empty(SummaryKey::Total);

    for row in rows {
        let key = match row.zone_name {
            Some(name) => SummaryKey::Zone(name.to_string()),
            None => SummaryKey::Unmapped,
        };
        let index = match groups.iter().position(|g| g.zone == key) {
            Some(i) => i,
            None => {
                groups.push(SummaryRow::empty(key));
                groups.len() - 1
            }
        };
        groups[index]
            .add_row(row)
            .and_then(|_| total.add_row(row))
            .ok_or_else(|| AuditError::Computation {
                line: row.input.line,
                field: "DIFERENCIA",
                value: row.delta.to_string(),
                reason: "summary total is out of range",
            })?;
    }

    groups.push(total);
    Ok(groups)
}
