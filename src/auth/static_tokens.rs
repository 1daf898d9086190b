use std::collections::HashMap;

use async_trait::async_trait;

use crate::auth::{AuthError, Identity, IdentityProvider};

/// Fixed token table, for local development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, email: impl Into<String>) -> Self {
        let email = email.into();
        self.tokens.insert(
            token.into(),
            Identity {
                uid: email.clone(),
                email,
            },
        );
        self
    }

    /// Parse `token=email` pairs separated by commas.
    pub fn parse(entries: &str) -> Result<Self, AuthError> {
        entries
            .split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .try_fold(Self::new(), |provider, pair| {
                let (token, email) = pair
                    .split_once('=')
                    .ok_or_else(|| AuthError::Provider(format!("invalid token entry '{pair}'")))?;
                Ok(provider.with_token(token.trim(), email.trim()))
            })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenProvider {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens.get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}
