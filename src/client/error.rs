use thiserror::Error;

/// Client-side failure. `Clone` because one in-flight read may be awaited by
/// several callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Non-success response; the message is the server's body text.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid server url: {0}")]
    Url(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
