use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a whole manifest. There is no row-level recovery: a
/// single bad row fails the batch so that summary totals always cover the
/// complete dataset.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("no manifest supplied: {0}")]
    MissingInput(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("row {line}, column '{field}': {reason} (value: '{value}')")]
    Computation {
        line: usize,
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("failed to read manifest: {0}")]
    Read(#[from] calamine::Error),

    #[error("failed to write {}: {reason}", path.display())]
    Output { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error(
        "ambiguous manifest: both dimension columns (Alto/Ancho/Largo) \
         and an assessed weight column ({0}) are present"
    )]
    Ambiguous(&'static str),
}

impl AuditError {
    pub(crate) fn output(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AuditError::Output {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
