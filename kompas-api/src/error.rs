use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Malformed backend response: {0}")]
    Malformed(String),

    /// Non-empty `error` field in an otherwise well-formed response body.
    #[error("{0}")]
    Backend(String),

    #[error("Response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Backend-signaled errors are surfaced verbatim and never retried;
    /// everything else is fair game for the caller's retry policy.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::Backend(_) | ApiError::InvalidUrl(_))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
