use checkrelay_core::{CoreError, RecordError};
use checkrelay_github::GithubError;
use thiserror::Error;

/// Reasons a single publish attempt is abandoned
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{0}")]
    Transport(#[from] GithubError),

    #[error("{0}")]
    Record(#[from] RecordError),

    #[error("{0}")]
    InvalidRequest(#[from] CoreError),
}

pub type PublishResult<T> = Result<T, PublishError>;
