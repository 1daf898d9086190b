use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::{AuthError, Identity, IdentityProvider};

/// Tries each provider in order. A rejection moves on to the next provider;
/// any other failure is returned immediately.
pub struct ChainedIdentityProvider {
    providers: Vec<Arc<dyn IdentityProvider>>,
}

impl ChainedIdentityProvider {
    pub fn new(providers: Vec<Arc<dyn IdentityProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl IdentityProvider for ChainedIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut last = AuthError::InvalidToken;
        for provider in &self.providers {
            match provider.verify(token).await {
                Ok(identity) => return Ok(identity),
                Err(err) if err.is_rejection() => last = err,
                Err(err) => return Err(err),
            }
        }
        Err(last)
    }
}
