//! Header normalization and schema detection.
//!
//! Manifests come from different courier exports, so header spelling varies.
//! Headers are trimmed, mapped onto canonical names through an alias table,
//! and the dataset is classified once as either dimensional (package sizes)
//! or assessed (pre-computed volumetric grams).

use serde::Serialize;
use std::collections::BTreeMap;

use super::{RawRow, RawTable};
use crate::error::SchemaError;

pub const GRAMS: &str = "GramRea";
pub const ZONE: &str = "Zo";
pub const HEIGHT: &str = "Alto";
pub const WIDTH: &str = "Ancho";
pub const LENGTH: &str = "Largo";
pub const ASSESSED: &str = "Aforado";
pub const BILLED: &str = "Precio Unitario";
pub const IDENTIFIER: &str = "Guia";

pub const CANONICAL_COLUMNS: [&str; 8] = [
    GRAMS, ZONE, HEIGHT, WIDTH, LENGTH, ASSESSED, BILLED, IDENTIFIER,
];

const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("Gramos Reales", GRAMS),
    ("Peso Real", GRAMS),
    ("Zona", ZONE),
    ("Precio", BILLED),
    ("Guía", IDENTIFIER),
    ("Nro Guia", IDENTIFIER),
    ("GramAfo", ASSESSED),
    ("Peso Aforado", ASSESSED),
    ("Gramos Aforados", ASSESSED),
];

/// How volumetric weight is obtained for every row of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Height, width and length columns in centimeters
    Dimensional,
    /// A pre-computed assessed ("aforado") weight column in grams
    Assessed,
}

impl SchemaVariant {
    /// Canonical columns this variant needs, in the order they are checked.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            SchemaVariant::Dimensional => &[GRAMS, ZONE, HEIGHT, WIDTH, LENGTH, BILLED, IDENTIFIER],
            SchemaVariant::Assessed => &[GRAMS, ASSESSED, ZONE, BILLED, IDENTIFIER],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVariant::Dimensional => "dimensional",
            SchemaVariant::Assessed => "assessed",
        }
    }
}

/// Header alias table. Matching is on trimmed, case-insensitive text.
#[derive(Debug, Clone)]
pub struct ColumnAliases {
    entries: Vec<(String, &'static str)>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let entries = CANONICAL_COLUMNS
            .iter()
            .map(|c| (c.to_lowercase(), *c))
            .chain(BUILTIN_ALIASES.iter().map(|(alias, c)| (alias.to_lowercase(), *c)))
            .collect();
        Self { entries }
    }
}

impl ColumnAliases {
    /// Built-in aliases extended with configured `header -> canonical` pairs.
    /// Configured pairs take precedence. Every target must be a canonical
    /// column name; all bad targets are reported together.
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();
        let mut configured = Vec::new();

        for (alias, target) in extra {
            match CANONICAL_COLUMNS.iter().find(|c| **c == target.trim()) {
                Some(canonical) => configured.push((alias.trim().to_lowercase(), *canonical)),
                None => errors.push(format!(
                    "columns.aliases.{}: unknown column '{}' (expected one of: {})",
                    alias,
                    target,
                    CANONICAL_COLUMNS.join(", ")
                )),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut aliases = Self::default();
        configured.extend(aliases.entries);
        aliases.entries = configured;
        Ok(aliases)
    }

    fn resolve(&self, header: &str) -> Option<&'static str> {
        let key = header.to_lowercase();
        self.entries
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| *canonical)
    }
}

/// Positions of the canonical columns in a normalized header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub grams: usize,
    pub zone: usize,
    pub billed: usize,
    pub identifier: usize,
    pub measurements: MeasurementColumns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementColumns {
    Dimensional { height: usize, width: usize, length: usize },
    Assessed { assessed: usize },
}

impl ColumnMap {
    pub fn variant(&self) -> SchemaVariant {
        match self.measurements {
            MeasurementColumns::Dimensional { .. } => SchemaVariant::Dimensional,
            MeasurementColumns::Assessed { .. } => SchemaVariant::Assessed,
        }
    }
}

/// A manifest whose headers have been normalized and whose schema is known.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub headers: Vec<String>,
    pub columns: ColumnMap,
    pub rows: Vec<RawRow>,
}

impl NormalizedTable {
    pub fn variant(&self) -> SchemaVariant {
        self.columns.variant()
    }
}

/// Normalize headers, detect the schema variant and locate every required
/// column. Fails on the first missing column, before any row is looked at.
pub fn normalize(table: RawTable, aliases: &ColumnAliases) -> Result<NormalizedTable, SchemaError> {
    let headers = normalize_headers(&table.headers, aliases);
    let variant = detect_variant(&headers)?;
    let columns = resolve_columns(&headers, variant)?;

    Ok(NormalizedTable {
        headers,
        columns,
        rows: table.rows,
    })
}

/// Trim headers and rename known variants to their canonical names.
///
/// A header that already carries a canonical name is never displaced: an alias
/// mapping onto a name that is present (or was already produced by an earlier
/// alias) keeps its original text.
pub fn normalize_headers(headers: &[String], aliases: &ColumnAliases) -> Vec<String> {
    let trimmed: Vec<&str> = headers.iter().map(|h| h.trim()).collect();
    let mut taken: Vec<&'static str> = CANONICAL_COLUMNS
        .iter()
        .copied()
        .filter(|c| trimmed.contains(c))
        .collect();

    trimmed
        .iter()
        .map(|header| {
            if CANONICAL_COLUMNS.contains(header) {
                return header.to_string();
            }
            match aliases.resolve(header) {
                Some(canonical) if !taken.contains(&canonical) => {
                    taken.push(canonical);
                    canonical.to_string()
                }
                _ => header.to_string(),
            }
        })
        .collect()
}

/// Decide the schema variant from which canonical columns are present.
pub fn detect_variant(headers: &[String]) -> Result<SchemaVariant, SchemaError> {
    let has = |name: &str| headers.iter().any(|h| h == name);
    let has_dimensions = has(HEIGHT) || has(WIDTH) || has(LENGTH);

    match (has_dimensions, has(ASSESSED)) {
        (true, true) => Err(SchemaError::Ambiguous(ASSESSED)),
        (false, true) => Ok(SchemaVariant::Assessed),
        _ => Ok(SchemaVariant::Dimensional),
    }
}

fn resolve_columns(headers: &[String], variant: SchemaVariant) -> Result<ColumnMap, SchemaError> {
    for &required in variant.required_columns() {
        if !headers.iter().any(|h| h == required) {
            return Err(SchemaError::MissingColumn(required));
        }
    }

    // Presence was checked above, so every lookup below succeeds.
    let position = |name: &'static str| -> Result<usize, SchemaError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(SchemaError::MissingColumn(name))
    };

    let measurements = match variant {
        SchemaVariant::Dimensional => MeasurementColumns::Dimensional {
            height: position(HEIGHT)?,
            width: position(WIDTH)?,
            length: position(LENGTH)?,
        },
        SchemaVariant::Assessed => MeasurementColumns::Assessed {
            assessed: position(ASSESSED)?,
        },
    };

    Ok(ColumnMap {
        grams: position(GRAMS)?,
        zone: position(ZONE)?,
        billed: position(BILLED)?,
        identifier: position(IDENTIFIER)?,
        measurements,
    })
}
