//! Client library with an optimistic query cache.
//!
//! Reads go through per-domain [`QueryCache`]s keyed by [`QueryKey`], so the
//! same headword seen by different sessions never shares an entry. Writes
//! patch the cache before the request resolves and roll back on failure, see
//! [`mutations`].

pub mod error;
pub mod lookup;
pub mod mutations;
pub mod query;
pub mod transport;

use std::sync::{Arc, PoisonError, RwLock};

use crate::article::Article;
pub use error::ClientError;
pub use lookup::group_by_word;
pub use query::{QueryCache, QueryKey};
pub use transport::{ArticlesApi, HttpArticlesApi};

/// Who the client is talking as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Token(String),
}

impl Session {
    pub fn token(token: impl Into<String>) -> Self {
        Session::Token(token.into())
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Token(token) => Some(token),
        }
    }
}

pub struct DictionaryClient {
    api: Arc<dyn ArticlesApi>,
    session: RwLock<Session>,
    groups: QueryCache<Vec<Article>>,
    lookups: QueryCache<Vec<Vec<Article>>>,
    admin: QueryCache<bool>,
}

impl DictionaryClient {
    pub fn new(api: Arc<dyn ArticlesApi>) -> Self {
        Self {
            api,
            session: RwLock::new(Session::Anonymous),
            groups: QueryCache::new(),
            lookups: QueryCache::new(),
            admin: QueryCache::new(),
        }
    }

    pub fn with_session(self, session: Session) -> Self {
        self.set_session(session);
        self
    }

    pub fn session(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Switch identity. Entries cached for other sessions stay where they are.
    pub fn set_session(&self, session: Session) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    pub fn groups(&self) -> &QueryCache<Vec<Article>> {
        &self.groups
    }

    pub fn lookups(&self) -> &QueryCache<Vec<Vec<Article>>> {
        &self.lookups
    }

    pub fn group_key(&self, word: &str) -> QueryKey {
        QueryKey::article_group(word, &self.session())
    }

    /// All articles under `word`. An empty word is answered locally.
    pub async fn article_group(&self, word: &str) -> Result<Vec<Article>, ClientError> {
        if word.is_empty() {
            return Ok(Vec::new());
        }

        let session = self.session();
        let key = QueryKey::article_group(word, &session);
        let api = Arc::clone(&self.api);
        let word = word.to_string();
        self.groups
            .fetch(&key, move || async move { api.get_articles(&session, &word).await })
            .await
    }

    /// Whether the current session is an admin. Anonymous sessions never are.
    pub async fn is_admin(&self) -> Result<bool, ClientError> {
        let session = self.session();
        if session.as_token().is_none() {
            return Ok(false);
        }

        let key = QueryKey::user_admin(&session);
        let api = Arc::clone(&self.api);
        self.admin
            .fetch(&key, move || async move { api.is_admin(&session).await })
            .await
    }

    /// Prefix search grouped by headword. An empty term issues no request.
    pub async fn lookup(&self, term: &str) -> Result<Vec<Vec<Article>>, ClientError> {
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let is_admin = self.is_admin().await?;
        let session = self.session();
        let key = QueryKey::lookup(term, is_admin);
        let api = Arc::clone(&self.api);
        let term = term.to_string();
        self.lookups
            .fetch(&key, move || async move {
                Ok(group_by_word(api.lookup_articles(&session, &term).await?))
            })
            .await
    }
}
