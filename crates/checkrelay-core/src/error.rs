use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Invalid check run request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid check status: {0}")]
    InvalidStatus(String),

    #[error("Invalid check conclusion: {0}")]
    InvalidConclusion(String),

    #[error("Invalid build result: {0}")]
    InvalidBuildResult(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while reading or writing a persisted publish record
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Publish record I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Publish record serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
