use thiserror::Error;

/// Everything a sync attempt can surface to a caller. The display strings are
/// the short human-readable messages shown in the UI; callers match on the
/// variant, never on the text.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no internet connection")]
    NoConnectivity,

    #[error("the connection timed out")]
    Timeout,

    #[error("the remote data could not be found")]
    NotFound,

    #[error("the remote data could not be read: {0}")]
    MalformedResponse(String),

    #[error("sync failed: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::NoConnectivity
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

impl From<anyhow::Error> for SyncError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unknown(err.to_string())
    }
}
