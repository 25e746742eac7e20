use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("Column '{column}' is not numeric")]
    NonNumericColumn { column: String },

    #[error("Required column '{0}' missing from input header")]
    MissingColumn(String),

    #[error("At least one measurement column must be requested")]
    EmptyColumnSelection,

    #[error("Unknown season '{0}' (expected spring, summer, fall or winter)")]
    UnknownSeason(String),

    #[error("Row has {found} values but the schema has {expected} columns")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
