use std::path::Path;

use super::input::parse_row;
use super::reconcile::{reconcile, Review, ShipmentRow};
use super::summary::{summarize, SummaryRow};
use crate::error::AuditError;
use crate::table::{normalize, read_manifest, ColumnAliases, RawTable, SchemaVariant};
use crate::tariff::TariffSchedule;

/// Everything produced for one manifest.
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// Normalized input headers, in source order
    pub headers: Vec<String>,
    pub variant: SchemaVariant,
    pub rows: Vec<ShipmentRow>,
    /// Zone groups followed by the Total row
    pub summary: Vec<SummaryRow>,
}

impl AuditReport {
    pub fn total(&self) -> Option<&SummaryRow> {
        self.summary.last()
    }

    pub fn needs_review_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.review == Review::NeedsReview)
            .count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.rows.iter().filter(|r| r.duplicate).count()
    }
}

/// Run the full audit over an in-memory manifest.
///
/// Stages run strictly in order and the first failure aborts the batch: a
/// schema problem stops everything before any row is computed, and a single
/// malformed row fails the whole manifest.
pub fn audit_table(
    table: RawTable,
    schedule: &TariffSchedule,
    aliases: &ColumnAliases,
) -> Result<AuditReport, AuditError> {
    let normalized = normalize(table, aliases)?;
    let variant = normalized.variant();
    tracing::debug!(
        variant = variant.as_str(),
        rows = normalized.rows.len(),
        "schema detected"
    );

    let columns = normalized.columns;
    let inputs = normalized
        .rows
        .into_iter()
        .map(|row| parse_row(row, &columns))
        .collect::<Result<Vec<_>, _>>()?;

    let rows = reconcile(schedule, inputs)?;
    let summary = summarize(&rows)?;

    let report = AuditReport {
        headers: normalized.headers,
        variant,
        rows,
        summary,
    };
    tracing::debug!(
        rows = report.rows.len(),
        needs_review = report.needs_review_count(),
        duplicates = report.duplicate_count(),
        "manifest reconciled"
    );
    Ok(report)
}

/// Read a spreadsheet manifest and audit it.
pub fn audit_manifest(
    path: &Path,
    sheet: Option<&str>,
    schedule: &TariffSchedule,
    aliases: &ColumnAliases,
) -> Result<AuditReport, AuditError> {
    let table = read_manifest(path, sheet)?;
    audit_table(table, schedule, aliases)
}
