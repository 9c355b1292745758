use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid rating {0}: ratings must be between 0 and 10")]
    InvalidRating(f64),

    #[error("Rating input is not a number: {0:?}")]
    UnparseableRating(String),

    #[error("Unknown game: {0}")]
    UnknownGame(String),

    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    #[error("Game {0} has no numeric rating and cannot be moved between tiers")]
    NotRated(String),

    #[error("No rated games to export")]
    NothingToExport,

    #[error("Invalid tier table: {0}")]
    InvalidTierTable(String),

    #[error("Missing column {0} in CSV header")]
    MissingColumn(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<config::ConfigError> for TrackerError {
    fn from(err: config::ConfigError) -> Self {
        TrackerError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
