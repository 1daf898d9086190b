use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use smart_default::SmartDefault;
use thiserror::Error;
use tracing::info;

use crate::auth::firebase;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("No identity provider configured, set HINRU_FIREBASE_API_KEY or HINRU_STATIC_TOKENS")]
    NoIdentityProvider,
}

/// Server settings read from the environment (a `.env` file is honoured).
#[derive(Debug, Clone, SmartDefault)]
pub struct ServerConfig {
    /// Identity Toolkit API key used to verify Firebase ID tokens.
    pub firebase_api_key: Option<String>,

    #[default(firebase::DEFAULT_BASE_URL.to_string())]
    pub firebase_base_url: String,

    /// `token=email` pairs accepted without contacting the provider.
    pub static_tokens: Option<String>,

    /// Accept article submissions without a bearer token.
    pub anonymous_submissions: bool,

    /// JSON file used to seed the in-memory store.
    pub seed: Option<PathBuf>,

    #[default(300)]
    pub token_ttl_secs: u64,

    #[default(10_000)]
    pub token_cache_capacity: u64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(Self {
            firebase_api_key: var("HINRU_FIREBASE_API_KEY"),
            firebase_base_url: var("HINRU_FIREBASE_BASE_URL")
                .unwrap_or(defaults.firebase_base_url),
            static_tokens: var("HINRU_STATIC_TOKENS"),
            anonymous_submissions: parse(
                "HINRU_ANONYMOUS_SUBMISSIONS",
                defaults.anonymous_submissions,
            )?,
            seed: var("HINRU_SEED").map(PathBuf::from),
            token_ttl_secs: parse("HINRU_TOKEN_TTL_SECS", defaults.token_ttl_secs)?,
            token_cache_capacity: parse(
                "HINRU_TOKEN_CACHE_CAPACITY",
                defaults.token_cache_capacity,
            )?,
        })
    }

    pub fn has_identity_provider(&self) -> bool {
        self.firebase_api_key.is_some() || self.static_tokens.is_some()
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse<T: FromStr + std::fmt::Display>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.token_ttl_secs, 300);
        assert!(!config.anonymous_submissions);
        assert!(!config.has_identity_provider());
        assert_eq!(config.firebase_base_url, firebase::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        // unique key so parallel tests do not race on the environment
        std::env::set_var("HINRU_TEST_PARSE_GARBAGE", "soon");
        let result: Result<u64, _> = parse("HINRU_TEST_PARSE_GARBAGE", 1);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        std::env::remove_var("HINRU_TEST_PARSE_GARBAGE");
    }
}
