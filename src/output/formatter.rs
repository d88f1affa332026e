use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::Path;

use crate::engine::{AuditReport, SummaryRow};
use crate::table::SchemaVariant;
use crate::tariff::{Bracket, TariffSchedule, Zone, ZONE_COUNT};

/// How currency amounts are rendered for people.
///
/// Defaults to the Argentine convention the manifests come with:
/// `$1.234,50`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NumberFormat {
    pub currency_symbol: String,
    pub decimal_separator: char,
    pub thousands_separator: char,
    pub decimals: u32,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            decimal_separator: ',',
            thousands_separator: '.',
            decimals: 2,
        }
    }
}

impl NumberFormat {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.decimal_separator == self.thousands_separator {
            errors.push(format!(
                "output.number_format: decimal and thousands separators are both '{}'",
                self.decimal_separator
            ));
        }
        if self.decimal_separator.is_ascii_digit() || self.thousands_separator.is_ascii_digit() {
            errors.push("output.number_format: separators must not be digits".to_string());
        }
        if self.decimals > 10 {
            errors.push(format!(
                "output.number_format.decimals: {} is too many (at most 10)",
                self.decimals
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Format an amount, rounding half away from zero: `-$1.234,50`.
    pub fn format_amount(&self, value: Decimal) -> String {
        let rounded =
            value.round_dp_with_strategy(self.decimals, RoundingStrategy::MidpointAwayFromZero);
        let plain = format!("{:.prec$}", rounded.abs(), prec = self.decimals as usize);
        let (int_part, frac_part) = match plain.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (plain.as_str(), None),
        };

        let mut out = String::new();
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        out.push_str(&self.currency_symbol);
        out.push_str(&group_thousands(int_part, self.thousands_separator));
        if let Some(frac) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(frac);
        }
        out
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

const SUMMARY_HEADERS: [&str; 5] = ["Zona", "Negativas", "Positivas", "OK", "Repetidos"];

/// Format the per-zone summary as an aligned table.
/// First column left-aligned, amounts and counts right-aligned.
pub fn format_summary_table(
    rows: &[SummaryRow],
    format: &NumberFormat,
    use_colors: bool,
) -> String {
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                row.zone.to_string(),
                format.format_amount(row.total_negative),
                format.format_amount(row.total_positive),
                row.total_ok.to_string(),
                row.total_duplicates.to_string(),
            ]
        })
        .collect();

    let mut widths = SUMMARY_HEADERS.map(|h| h.chars().count());
    for line in &cells {
        for (w, cell) in widths.iter_mut().zip(line.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    let header = SUMMARY_HEADERS
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, widths[i], i == 0))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for (row, line) in rows.iter().zip(cells.iter()) {
        let padded: Vec<String> = line
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(cell, widths[i], i == 0))
            .collect();
        let text = if use_colors {
            colorize_summary(row, padded)
        } else {
            padded.join("  ")
        };
        lines.push(text);
    }

    lines.join("\n")
}

fn colorize_summary(row: &SummaryRow, padded: Vec<String>) -> String {
    let [zone, negative, positive, ok, duplicates]: [String; 5] = match padded.try_into() {
        Ok(cells) => cells,
        Err(cells) => return cells.join("  "),
    };
    let negative = if row.total_negative.is_zero() {
        negative.dimmed().to_string()
    } else {
        negative.red().to_string()
    };
    let positive = if row.total_positive.is_zero() {
        positive.dimmed().to_string()
    } else {
        positive.yellow().to_string()
    };
    let duplicates = if row.total_duplicates == 0 {
        duplicates.dimmed().to_string()
    } else {
        duplicates.magenta().to_string()
    };
    let zone = if row.is_total() {
        zone.bold().to_string()
    } else {
        zone.cyan().to_string()
    };
    format!("{}  {}  {}  {}  {}", zone, negative, positive, ok.green(), duplicates)
}

fn pad(text: &str, width: usize, left: bool) -> String {
    if left {
        format!("{:<width$}", text, width = width)
    } else {
        format!("{:>width$}", text, width = width)
    }
}

/// Format the price grid of a schedule: one line per bracket, one column per zone.
pub fn format_tariff_table(
    schedule: &TariffSchedule,
    format: &NumberFormat,
    use_colors: bool,
) -> String {
    let mut header = vec!["Rango".to_string()];
    header.extend((1..=ZONE_COUNT as i64).filter_map(|z| Zone(z).name()).map(str::to_string));

    let mut grid = vec![header];
    for (i, bracket) in schedule.brackets().iter().enumerate() {
        let mut line = vec![schedule.bracket_label(Bracket::Tier(i))];
        line.extend(bracket.prices.iter().map(|p| format.format_amount(*p)));
        grid.push(line);
    }
    let mut overage = vec![format!("{} (por kg)", schedule.bracket_label(Bracket::Overage))];
    overage.extend(schedule.overage_prices().iter().map(|p| format.format_amount(*p)));
    grid.push(overage);

    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            grid.iter()
                .filter_map(|line| line.get(c))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(grid.len() + 1);
    let title = format!("Tarifa: {}", schedule.name());
    lines.push(if use_colors {
        title.bold().to_string()
    } else {
        title
    });
    for (r, line) in grid.iter().enumerate() {
        let text = line
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                let padded = pad(cell, widths[c], c == 0);
                if use_colors && (r == 0 || c == 0) {
                    padded.bold().to_string()
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(text);
    }
    lines.join("\n")
}

/// Machine-readable outcome of one processed manifest.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub input: String,
    /// None when the artifact was not written
    pub artifact: Option<String>,
    pub variant: SchemaVariant,
    pub rows: usize,
    pub needs_review: usize,
    pub duplicates: usize,
    pub summary: &'a [SummaryRow],
    pub generated_at: DateTime<Utc>,
}

impl<'a> JsonReport<'a> {
    pub fn new(input: &Path, artifact: Option<&Path>, report: &'a AuditReport) -> Self {
        Self {
            input: input.display().to_string(),
            artifact: artifact.map(|p| p.display().to_string()),
            variant: report.variant,
            rows: report.rows.len(),
            needs_review: report.needs_review_count(),
            duplicates: report.duplicate_count(),
            summary: &report.summary,
            generated_at: Utc::now(),
        }
    }
}

/// Pretty-printed JSON array of reports, one per input file.
pub fn format_json(reports: &[JsonReport<'_>]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
