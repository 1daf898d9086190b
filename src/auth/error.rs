use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication token is not valid")]
    InvalidToken,

    #[error("User uid \"{0}\" not found")]
    UserNotFound(String),

    #[error("User with uid \"{0}\" has no email")]
    MissingEmail(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Error contacting identity provider")]
    Transport(#[from] reqwest::Error),
}

impl AuthError {
    /// Whether the caller's credentials are at fault, as opposed to the provider.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::UserNotFound(_))
    }
}
