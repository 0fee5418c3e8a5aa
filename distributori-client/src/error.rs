use thiserror::Error;

/// Everything that can go wrong in a client operation. None of these are
/// fatal: each is reported to the user and the rendered map stays as it was.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad input caught before any request was made.
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    NotFound(String),

    /// Error message reported by the server, shown verbatim.
    #[error("{0}")]
    Remote(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn usage(message: impl Into<String>) -> Self {
        ClientError::Usage(message.into())
    }

    /// Errors that were raised locally without touching the network.
    pub fn is_usage(&self) -> bool {
        matches!(self, ClientError::Usage(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
