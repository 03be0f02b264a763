use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoneyError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("File is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("No transaction with ID {0}")]
    RecordNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, MoneyError>;
