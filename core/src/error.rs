use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Source read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Source is missing column '{name}'")]
    MissingColumn { name: String },

    #[error("Malformed field at line {line}, column '{column}': {value:?} ({reason})")]
    MalformedField {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Delimiter must be a single ASCII character, got {delimiter:?}")]
    InvalidDelimiter { delimiter: char },

    #[error("Invalid table name '{name}'")]
    InvalidTableName { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EtlResult<T> = Result<T, EtlError>;
