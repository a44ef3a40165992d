use thiserror::Error;
use crate::services::SourceError;

/// Errors surfaced by the recommendation pipeline
#[derive(Debug, Error)]
pub enum RecommendError {
    /// An access token was supplied but matches no known credential
    #[error("Invalid user: access token not recognized")]
    InvalidUser,

    /// A candidate source failed; propagated unmodified
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl RecommendError {
    /// Stable message key for clients
    pub fn key(&self) -> &'static str {
        match self {
            RecommendError::InvalidUser => "user.invalid.error",
            RecommendError::Source(_) => "server.internal.error",
        }
    }
}
