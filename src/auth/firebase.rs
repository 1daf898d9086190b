use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::auth::{AuthError, Identity, IdentityProvider};

pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Verifies Firebase ID tokens through the Identity Toolkit `accounts:lookup` call.
pub struct FirebaseIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

impl FirebaseIdentityProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let url = format!("{}/v1/accounts:lookup", self.base_url);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "idToken": token }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                debug!("identity provider rejected token");
                return Err(AuthError::InvalidToken);
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(AuthError::Provider(format!("{status}: {body}")));
            }
        }

        let lookup: LookupResponse = response.json().await?;
        let user = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::UserNotFound(String::new()))?;
        let email = user
            .email
            .ok_or_else(|| AuthError::MissingEmail(user.local_id.clone()))?;

        Ok(Identity {
            uid: user.local_id,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_verify_returns_identity() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/accounts:lookup")
            .match_query(Matcher::UrlEncoded("key".into(), "api-key".into()))
            .match_body(Matcher::Json(json!({"idToken": "good"})))
            .with_status(200)
            .with_body(r#"{"users": [{"localId": "uid-1", "email": "a@example.com"}]}"#)
            .create_async()
            .await;

        let provider = FirebaseIdentityProvider::with_base_url(server.url(), "api-key");
        let identity = provider.verify("good").await.unwrap();

        assert_eq!(identity.uid, "uid-1");
        assert_eq!(identity.email, "a@example.com");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_verify_rejected_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/accounts:lookup")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": {"message": "INVALID_ID_TOKEN"}}"#)
            .create_async()
            .await;

        let provider = FirebaseIdentityProvider::with_base_url(server.url(), "api-key");
        let result = provider.verify("bad").await;

        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_verify_user_without_email() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/accounts:lookup")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"users": [{"localId": "uid-2"}]}"#)
            .create_async()
            .await;

        let provider = FirebaseIdentityProvider::with_base_url(server.url(), "api-key");
        let result = provider.verify("phone-only").await;

        assert!(matches!(result, Err(AuthError::MissingEmail(uid)) if uid == "uid-2"));
    }
}
