use thiserror::Error;

use crate::validator::ValidationError;

#[derive(Error, Debug)]
pub enum PriceRadarError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid configuration value for {key}: {details}")]
    InvalidConfiguration { key: String, details: String },

    #[error("Generation request failed: {0}")]
    GenerationFailed(String),

    #[error("No structured data found in response")]
    NoStructuredData,

    #[error("Response is missing required key '{0}'")]
    MissingKey(&'static str),

    #[error("Schema validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, PriceRadarError>;
