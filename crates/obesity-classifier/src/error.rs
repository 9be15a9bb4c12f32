use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading data, fitting encoders, training or predicting.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid model artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Column '{0}' is not present in the data")]
    UnknownColumn(String),

    #[error("columns should not be empty")]
    EmptyColumns,

    #[error("Column '{0}' is the target column; register it with EncoderTarget::Target")]
    TargetAsFeature(String),

    #[error("An encoder is already registered for '{0}'")]
    DuplicateEncoder(String),

    #[error("categories list must be provided for Ordinal encoding")]
    MissingCategories,

    #[error("Invalid categories: {0}")]
    InvalidCategories(String),

    #[error("No target encoder registered")]
    MissingTargetEncoder,

    #[error("Target encoder must be Label or Ordinal, got {0}")]
    InvalidTargetEncoder(String),

    #[error("Encoder for '{0}' has not been fitted")]
    EncoderNotFitted(String),

    #[error("Cannot fit encoder for '{0}' on zero values")]
    EmptyFit(String),

    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Class index {0} is out of range for the target encoder")]
    UnknownClass(usize),

    #[error("Invalid number '{value}' in column '{column}' at row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Predictor must have these columns: {expected:?}, got {found:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Classifier expects {expected} features, got {found}")]
    FeatureWidth { expected: usize, found: usize },

    #[error("Labels length {labels} does not match number of rows {rows}")]
    LabelLength { labels: usize, rows: usize },

    #[error("Model has not been trained; call {0} first")]
    NotFitted(&'static str),

    #[error("Training data is empty")]
    EmptyTrainingData,

    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),

    #[error("Expected a {expected} artifact (version {expected_version}), got '{found}' (version {found_version})")]
    WrongArtifact {
        expected: &'static str,
        expected_version: u32,
        found: String,
        found_version: u32,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
