use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::auth::{AuthError, Identity, IdentityProvider};

/// Remembers successful verifications so repeat requests skip the provider.
///
/// Rejections are never cached.
pub struct CachedIdentityProvider {
    inner: Arc<dyn IdentityProvider>,
    verified: Cache<String, Identity>,
}

impl CachedIdentityProvider {
    pub fn new(inner: Arc<dyn IdentityProvider>, ttl: Duration, capacity: u64) -> Self {
        Self {
            inner,
            verified: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl IdentityProvider for CachedIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if let Some(identity) = self.verified.get(token).await {
            return Ok(identity);
        }

        let identity = self.inner.verify(token).await?;
        debug!("verified token for {}", identity.email);
        self.verified
            .insert(token.to_string(), identity.clone())
            .await;
        Ok(identity)
    }
}
