use thiserror::Error;

pub type InsightResult<T> = Result<T, InsightError>;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported attribution model: {0}")]
    InvalidModel(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid customer journey: {0}")]
    InvalidJourney(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for InsightError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
