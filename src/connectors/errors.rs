/// Errors that can occur while talking to the news provider
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// Provider unreachable, connection reset or timeout
    #[error("Provider unreachable: {0}")]
    Transport(String),
    /// Provider answered with a non-success status
    #[error("Provider error {status}: {body}")]
    Upstream { status: u16, body: String },
    /// Provider answered 2xx with a body that is not JSON
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    /// Internal error in connector
    #[error("Internal connector error: {0}")]
    Internal(String),
}

impl ConnectorError {
    /// Transport and status failures are reported to clients as fetch failures,
    /// everything else as unexpected errors.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Upstream { .. })
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            Self::Transport(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            Self::Internal(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
