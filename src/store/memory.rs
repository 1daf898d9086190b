use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::article::validation::validate_new_article;
use crate::article::{Article, ArticleId, NewArticle, PartialArticle, UserRecord};
use crate::store::{ArticleStore, StoreError};

/// In-process store. Documents live for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: RwLock<BTreeMap<ArticleId, NewArticle>>,
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.articles.read().await.is_empty()
    }

    /// Insert a document under a caller-chosen id, replacing any previous one.
    pub async fn insert_with_id(&self, id: ArticleId, article: NewArticle) {
        self.articles.write().await.insert(id, article);
    }
}

fn visible(article: &NewArticle, include_drafts: bool) -> bool {
    include_drafts || article.is_approved()
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn insert(&self, article: NewArticle) -> Result<ArticleId, StoreError> {
        let id = ArticleId::generate();
        debug!("inserting article {} for word {}", id, article.word);
        self.articles.write().await.insert(id.clone(), article);
        Ok(id)
    }

    async fn get(&self, id: &ArticleId) -> Result<Option<Article>, StoreError> {
        let articles = self.articles.read().await;
        Ok(articles.get(id).map(|entry| entry.clone().with_id(id.clone())))
    }

    async fn find_by_word(
        &self,
        word: &str,
        include_drafts: bool,
    ) -> Result<Vec<Article>, StoreError> {
        let articles = self.articles.read().await;
        Ok(articles
            .iter()
            .filter(|(_, entry)| entry.word == word && visible(entry, include_drafts))
            .map(|(id, entry)| entry.clone().with_id(id.clone()))
            .collect())
    }

    async fn find_by_prefix(
        &self,
        term: &str,
        include_drafts: bool,
        limit: usize,
    ) -> Result<Vec<Article>, StoreError> {
        let articles = self.articles.read().await;
        let mut matches: Vec<Article> = articles
            .iter()
            .filter(|(_, entry)| entry.word.starts_with(term) && visible(entry, include_drafts))
            .map(|(id, entry)| entry.clone().with_id(id.clone()))
            .collect();

        // ids are already ascending, a stable sort keeps them that way per headword
        matches.sort_by(|a, b| a.entry.word.cmp(&b.entry.word));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn update(
        &self,
        patch: &PartialArticle,
        author: Option<String>,
    ) -> Result<Article, StoreError> {
        let mut articles = self.articles.write().await;
        let stored = articles
            .get_mut(&patch.id)
            .ok_or_else(|| StoreError::NotFound(patch.id.clone()))?;

        let mut merged = stored.clone();
        patch.apply_to(&mut merged);
        merged.author = author;
        validate_new_article(&merged)?;

        *stored = merged.clone();
        debug!("updated article {}", patch.id);
        Ok(merged.with_id(patch.id.clone()))
    }

    async fn remove(&self, id: &ArticleId) -> Result<(), StoreError> {
        match self.articles.write().await.remove(id) {
            Some(_) => {
                debug!("removed article {}", id);
                Ok(())
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    async fn user(&self, email: &str) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        Ok(*users.entry(email.to_string()).or_insert_with(|| {
            debug!("creating default user record for {}", email);
            UserRecord::default()
        }))
    }

    async fn put_user(&self, email: &str, record: UserRecord) -> Result<(), StoreError> {
        self.users.write().await.insert(email.to_string(), record);
        Ok(())
    }
}
