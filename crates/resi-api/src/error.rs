use thiserror::Error;

/// Errors surfaced by the client.
///
/// Absence of an encoder in the status snapshot is *not* an error; lookups
/// return `Ok(None)` for unknown identifiers.
#[derive(Debug, Error)]
pub enum ResiError {
    /// The token endpoint rejected the credentials, or the token / user
    /// profile request failed outright.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A response decoded, but an expected field was absent or the body did
    /// not match the shape the client relies on.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Transport-level failure on an authenticated endpoint.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// An authenticated endpoint answered with a non-success status.
    #[error("{url} returned {status}")]
    Status { url: String, status: reqwest::StatusCode },
}

impl ResiError {
    /// Check if this error means the configured credentials are bad and the
    /// account needs to be reconfigured.
    pub fn requires_reconfiguration(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Check if this error is transient and the next external trigger (timer
    /// tick or user action) may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, ResiError>;
