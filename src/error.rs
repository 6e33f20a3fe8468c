//! Ошибки пайплайна, модулей обучения и хранения

use thiserror::Error;

use crate::types::Value;

/// Фатальные ошибки подготовки данных.
///
/// Отброшенная строка ошибкой не является: такие строки только учитываются
/// в [`crate::types::CleaningReport`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("required column '{column}' is missing")]
    Schema { column: String },

    #[error("row {row}: expected {expected} cells, got {actual}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("column '{column}', row {row}: {reason} (value: {value:?})")]
    FatalData {
        column: String,
        row: usize,
        value: Value,
        reason: String,
    },
}

impl PipelineError {
    pub fn fatal(column: &str, row: usize, value: &Value, reason: impl Into<String>) -> Self {
        PipelineError::FatalData {
            column: column.to_string(),
            row,
            value: value.clone(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("empty dataset")]
    EmptyDataset,

    #[error("model not trained")]
    NotFitted,

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{column}', row {row}: value {value:?} is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: Value,
    },

    #[error("invalid value {value} for parameter '{name}'")]
    InvalidParameter { name: String, value: f64 },

    #[error("unknown parameter '{name}' for {estimator}")]
    UnknownParameter { name: String, estimator: &'static str },

    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("cannot split {samples} samples into {folds} folds")]
    InvalidFolds { samples: usize, folds: usize },

    #[error("singular matrix")]
    SingularMatrix,

    #[error("training failed: {0}")]
    Fit(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("row {row}: expected {expected} cells, got {actual}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}
