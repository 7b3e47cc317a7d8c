use core_logic::{ConfigError, NetworkError};
use thiserror::Error;

/// Errors surfaced by the SmashX claim engine.
///
/// Only [`SmashError::SessionInvalid`] and [`SmashError::Config`] (raised
/// while building the claim executor) are fatal. Profile and claim failures
/// are absorbed by the claim executor and turned into statistics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmashError {
    #[error("Invalid session: {reason}")]
    SessionInvalid { reason: String },

    #[error("Player profile fetch failed after {attempts} attempts: {source}")]
    ProfileFetchFailed {
        attempts: u32,
        #[source]
        source: NetworkError,
    },

    #[error("Claim submit failed: {source}")]
    ClaimSubmitFailed {
        #[source]
        source: NetworkError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SmashError {
    /// True for request timeouts, whichever stage they happened in.
    pub fn is_timeout(&self) -> bool {
        match self {
            SmashError::ProfileFetchFailed { source, .. }
            | SmashError::ClaimSubmitFailed { source } => source.is_timeout(),
            _ => false,
        }
    }
}
