//! Document store for the `articles` and `users` collections.
//!
//! Handlers talk to [`ArticleStore`] only, one call per request. The store
//! owns per-document atomicity; concurrent writers to one article are
//! last-write-wins.

pub mod error;
pub mod memory;
pub mod seed;

use async_trait::async_trait;

use crate::article::{Article, ArticleId, NewArticle, PartialArticle, UserRecord};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use seed::Seed;

/// Maximum number of articles returned by a prefix lookup.
pub const LOOKUP_LIMIT: usize = 15;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a new document and return the id assigned to it.
    async fn insert(&self, article: NewArticle) -> Result<ArticleId, StoreError>;

    async fn get(&self, id: &ArticleId) -> Result<Option<Article>, StoreError>;

    /// Articles whose headword equals `word`, in id order.
    async fn find_by_word(&self, word: &str, include_drafts: bool)
        -> Result<Vec<Article>, StoreError>;

    /// Articles whose headword starts with `term`, ordered by headword.
    async fn find_by_prefix(
        &self,
        term: &str,
        include_drafts: bool,
        limit: usize,
    ) -> Result<Vec<Article>, StoreError>;

    /// Merge `patch` into the stored document, stamping `author`.
    ///
    /// The merged document is re-validated before it replaces the stored one.
    async fn update(
        &self,
        patch: &PartialArticle,
        author: Option<String>,
    ) -> Result<Article, StoreError>;

    async fn remove(&self, id: &ArticleId) -> Result<(), StoreError>;

    /// User flags, created with defaults on first lookup.
    async fn user(&self, email: &str) -> Result<UserRecord, StoreError>;

    async fn put_user(&self, email: &str, record: UserRecord) -> Result<(), StoreError>;
}
