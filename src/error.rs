use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Invalid puzzle identifier or writer configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value does not fit in the bit width reserved for its field.
    #[error("value {value} does not fit in {bits}-bit field '{field}'")]
    EncodingOverflow {
        field: String,
        value: u64,
        bits: u32,
    },

    /// Malformed or missing database header.
    #[error("header error: {0}")]
    Header(String),

    /// Malformed solved-position input.
    #[error("input error: {0}")]
    Input(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;
