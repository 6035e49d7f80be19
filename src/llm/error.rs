use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream rate limit exceeded")]
    RateLimited,
    #[error("upstream rejected credentials ({0})")]
    Unauthorized(StatusCode),
    #[error("upstream rejected request: {0}")]
    BadRequest(String),
    #[error("upstream returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("error reading upstream response stream: {0}")]
    Stream(#[source] reqwest::Error),
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
    #[error("API key is required for {0}")]
    MissingApiKey(&'static str),
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),
}

impl LlmError {
    /// Classifies a non-success upstream status. `body` is kept for logs only.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized(status),
            StatusCode::BAD_REQUEST => LlmError::BadRequest(body),
            _ => LlmError::Upstream { status, body },
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            LlmError::from_status(status, err.to_string())
        } else {
            LlmError::Transport(err)
        }
    }
}
