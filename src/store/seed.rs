use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::article::validation::validate_new_article;
use crate::article::{ArticleId, NewArticle, UserRecord};
use crate::store::{ArticleStore, MemoryStore, StoreError};

/// Initial contents for a [`MemoryStore`].
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub articles: Vec<SeedArticle>,
    #[serde(default)]
    pub users: HashMap<String, UserRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SeedArticle {
    #[serde(default)]
    pub id: Option<ArticleId>,
    #[serde(flatten)]
    pub entry: NewArticle,
}

impl Seed {
    pub fn from_json(content: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(content)?)
    }

    pub async fn from_file(path: &Path) -> Result<Self, StoreError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    pub async fn load_into(self, store: &MemoryStore) -> Result<(), StoreError> {
        let articles = self.articles.len();
        for mut article in self.articles {
            article.entry.normalize();
            validate_new_article(&article.entry)?;
            match article.id {
                Some(id) => store.insert_with_id(id, article.entry).await,
                None => {
                    store.insert(article.entry).await?;
                }
            }
        }

        let users = self.users.len();
        for (email, record) in self.users {
            store.put_user(&email, record).await?;
        }

        info!("Seeded store with {} articles and {} users", articles, users);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_seed_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "articles": [
                    {{"id": "fixed", "word": "पानी", "part_of_speech": "noun", "approved": true}},
                    {{"word": "पानी", "part_of_speech": "adjective"}}
                ],
                "users": {{"admin@example.com": {{"admin": true}}}}
            }}"#
        )
        .unwrap();

        let store = MemoryStore::new();
        Seed::from_file(file.path())
            .await
            .unwrap()
            .load_into(&store)
            .await
            .unwrap();

        assert_eq!(store.len().await, 2);
        assert!(store.get(&ArticleId::new("fixed")).await.unwrap().is_some());
        assert!(store.user("admin@example.com").await.unwrap().admin);
    }

    #[tokio::test]
    async fn test_seed_rejects_invalid_article() {
        let seed = Seed::from_json(r#"{"articles": [{"word": "x", "part_of_speech": "noun"}]}"#)
            .unwrap();
        let result = seed.load_into(&MemoryStore::new()).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }
}
