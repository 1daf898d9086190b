use axum::extract::FromRequestParts;
use http::{header, request::Parts, HeaderMap};
use tracing::debug;

use crate::{
    api::AppState,
    article::UserRecord,
    auth::Identity,
    error::RestError,
};

pub const FIREBASE_TOKEN_HEADER: &str = "x-firebase-token";

/// The verified identity behind a request, if it carried a token.
///
/// A request without a token is anonymous; a request with a token the
/// provider rejects fails extraction with 401.
#[derive(Debug, Clone)]
pub struct Caller {
    pub identity: Option<Identity>,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers
        .get(FIREBASE_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        return Some(token.trim()).filter(|token| !token.is_empty());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl Caller {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn email(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.email.as_str())
    }

    /// Stored flags for the caller; anonymous callers get defaults without a lookup.
    pub async fn user(&self, state: &AppState) -> Result<UserRecord, RestError> {
        match self.email() {
            Some(email) => Ok(state.store.user(email).await?),
            None => Ok(UserRecord::default()),
        }
    }

    pub async fn is_admin(&self, state: &AppState) -> Result<bool, RestError> {
        Ok(self.user(state).await?.admin)
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(Caller::anonymous());
        };

        let identity = state.identity.verify(token).await?;
        debug!("request authenticated as {}", identity.email);
        Ok(Caller {
            identity: Some(identity),
        })
    }
}
