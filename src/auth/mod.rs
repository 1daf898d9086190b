//! Bearer token verification.
//!
//! Sign-in itself happens in the browser against the identity provider; the
//! server only turns the resulting ID token into a verified [`Identity`].

pub mod cache;
pub mod chain;
pub mod error;
pub mod firebase;
pub mod static_tokens;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use cache::CachedIdentityProvider;
pub use chain::ChainedIdentityProvider;
pub use error::AuthError;
pub use firebase::FirebaseIdentityProvider;
pub use static_tokens::StaticTokenProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
