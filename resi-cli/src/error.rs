use resi_api::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] resi_api::ResiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Encoder command was not accepted: HTTP {0}")]
    CommandRejected(StatusCode),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
