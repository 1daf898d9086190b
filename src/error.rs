use std::error::Error;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::{
    article::{ArticleId, ValidationError},
    auth::AuthError,
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Expected to have a JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Expected to have \"{0}\" in query")]
    MissingParameter(&'static str),

    #[error("Authentication token is not valid")]
    InvalidToken(#[source] AuthError),

    #[error("Expected to have authorization to {0}")]
    Unauthenticated(&'static str),

    #[error("Expected to be an administrator to {0}")]
    NotAdmin(&'static str),

    #[error("There is no article with id \"{0}\"")]
    Gone(ArticleId),

    #[error("Identity provider unavailable")]
    IdentityProvider(#[source] AuthError),

    #[error("Store operation failed")]
    Store(#[source] StoreError),
}

impl From<AuthError> for RestError {
    fn from(err: AuthError) -> Self {
        if err.is_rejection() {
            RestError::InvalidToken(err)
        } else {
            RestError::IdentityProvider(err)
        }
    }
}

impl From<StoreError> for RestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => RestError::Gone(id),
            StoreError::Rejected(validation) => RestError::Validation(validation),
            other => RestError::Store(other),
        }
    }
}

impl RestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            RestError::Validation(_) => StatusCode::BAD_REQUEST,
            RestError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            RestError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            RestError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            RestError::NotAdmin(_) => StatusCode::UNAUTHORIZED,
            RestError::Gone(_) => StatusCode::GONE,
            RestError::IdentityProvider(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}: {:?}", self, self.source());
        } else {
            warn!("{}", self);
        }

        let payload = Json(json!({"message": self.to_string()}));

        (status, payload).into_response()
    }
}
