//! Optimistic writes against the article group cache.
//!
//! Every mutation follows the same sequence on the group for its headword:
//! cancel any in-flight read, snapshot, patch, send; on failure restore the
//! snapshot exactly; on settle invalidate the group (and all lookups, which
//! may list the same articles).

use tracing::{debug, warn};

use crate::article::{Article, ArticleId, NewArticle, PartialArticle};
use crate::client::{ClientError, DictionaryClient, QueryKey};

impl DictionaryClient {
    /// Cancel reads for `key` and capture its current value.
    fn begin(&self, key: &QueryKey) -> Option<Vec<Article>> {
        self.groups.cancel(key);
        self.groups.get(key)
    }

    fn settle<T>(
        &self,
        key: &QueryKey,
        snapshot: Option<Vec<Article>>,
        result: &Result<T, ClientError>,
    ) {
        if let Err(err) = result {
            warn!("rolling back {:?}: {}", key, err);
            self.groups.restore(key, snapshot);
        }
        self.groups.invalidate(key);
        self.lookups.invalidate_all();
    }

    /// Add an article; it shows up in its group under a placeholder id until
    /// the server assigns the real one.
    pub async fn add_article(&self, mut article: NewArticle) -> Result<ArticleId, ClientError> {
        article.normalize();
        let session = self.session();
        let key = QueryKey::article_group(&article.word, &session);
        let snapshot = self.begin(&key);

        let placeholder = ArticleId::placeholder();
        let pending = article.clone().with_id(placeholder.clone());
        self.groups.update(&key, |group| {
            let mut group = group.unwrap_or_default();
            group.push(pending);
            Some(group)
        });

        let result = self.api.add_article(&session, &article).await;
        if let Ok(id) = &result {
            debug!("placeholder {} is now {}", placeholder, id);
            self.groups.update(&key, |group| {
                group.map(|mut group| {
                    if let Some(article) = group.iter_mut().find(|a| a.id == placeholder) {
                        article.id = id.clone();
                    }
                    group
                })
            });
        }

        self.settle(&key, snapshot, &result);
        result
    }

    /// Apply `patch` to the article with the same id in the `word` group.
    pub async fn update_article(
        &self,
        word: &str,
        patch: PartialArticle,
    ) -> Result<(), ClientError> {
        let session = self.session();
        let key = QueryKey::article_group(word, &session);
        let snapshot = self.begin(&key);

        if snapshot.is_some() {
            self.groups.update(&key, |group| {
                group.map(|mut group| {
                    if let Some(article) = group.iter_mut().find(|a| a.id == patch.id) {
                        article.apply(&patch);
                    }
                    group
                })
            });
        }

        let result = self.api.update_article(&session, &patch).await;
        self.settle(&key, snapshot, &result);
        result
    }

    pub async fn delete_article(&self, word: &str, id: &ArticleId) -> Result<(), ClientError> {
        let session = self.session();
        let key = QueryKey::article_group(word, &session);
        let snapshot = self.begin(&key);

        if snapshot.is_some() {
            self.groups.update(&key, |group| {
                group.map(|mut group| {
                    group.retain(|article| &article.id != id);
                    group
                })
            });
        }

        let result = self.api.remove_article(&session, id).await;
        self.settle(&key, snapshot, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::PartOfSpeech;
    use crate::client::{ArticlesApi, Session};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    /// Answers reads with `group` and fails every write when `fail` is set.
    struct FakeApi {
        group: Vec<Article>,
        fail: bool,
    }

    fn rejected() -> ClientError {
        ClientError::Api {
            status: 400,
            message: "Expected to have word of length 2 or more".into(),
        }
    }

    #[async_trait]
    impl ArticlesApi for FakeApi {
        async fn get_articles(&self, _: &Session, _: &str) -> Result<Vec<Article>, ClientError> {
            Ok(self.group.clone())
        }

        async fn lookup_articles(&self, _: &Session, _: &str) -> Result<Vec<Article>, ClientError> {
            Ok(self.group.clone())
        }

        async fn add_article(&self, _: &Session, _: &NewArticle) -> Result<ArticleId, ClientError> {
            if self.fail {
                return Err(rejected());
            }
            Ok(ArticleId::new("server-id"))
        }

        async fn update_article(&self, _: &Session, _: &PartialArticle) -> Result<(), ClientError> {
            if self.fail {
                return Err(rejected());
            }
            Ok(())
        }

        async fn remove_article(&self, _: &Session, _: &ArticleId) -> Result<(), ClientError> {
            if self.fail {
                return Err(rejected());
            }
            Ok(())
        }

        async fn is_admin(&self, _: &Session) -> Result<bool, ClientError> {
            Ok(false)
        }
    }

    fn article(id: &str) -> Article {
        NewArticle::new("घर", PartOfSpeech::Noun).with_id(ArticleId::new(id))
    }

    async fn seeded_client(fail: bool) -> DictionaryClient {
        let api = FakeApi {
            group: vec![article("a1")],
            fail,
        };
        let client = DictionaryClient::new(Arc::new(api)).with_session(Session::token("t"));
        client.article_group("घर").await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_add_replaces_placeholder_with_server_id() {
        let client = seeded_client(false).await;
        let id = client
            .add_article(NewArticle::new("घर", PartOfSpeech::Verb))
            .await
            .unwrap();

        assert_eq!(id, ArticleId::new("server-id"));
        let group = client.groups().get(&client.group_key("घर")).unwrap();
        let ids: Vec<&str> = group.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "server-id"]);
        assert!(client.groups().is_stale(&client.group_key("घर")));
    }

    #[tokio::test]
    async fn test_failed_add_restores_snapshot() {
        let client = seeded_client(true).await;
        let before = client.groups().get(&client.group_key("घर"));

        let err = client
            .add_article(NewArticle::new("घर", PartOfSpeech::Verb))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(client.groups().get(&client.group_key("घर")), before);
    }

    #[tokio::test]
    async fn test_update_patches_in_place() {
        let client = seeded_client(false).await;
        let mut patch = PartialArticle::new(ArticleId::new("a1"));
        patch.transliteration = Some("ghar".into());

        client.update_article("घर", patch).await.unwrap();

        let group = client.groups().get(&client.group_key("घर")).unwrap();
        assert_eq!(group[0].entry.transliteration, "ghar");
    }

    #[tokio::test]
    async fn test_failed_update_restores_snapshot() {
        let client = seeded_client(true).await;
        let before = client.groups().get(&client.group_key("घर"));
        let mut patch = PartialArticle::new(ArticleId::new("a1"));
        patch.transliteration = Some("ghar".into());

        assert!(client.update_article("घर", patch).await.is_err());
        assert_eq!(client.groups().get(&client.group_key("घर")), before);
    }

    #[tokio::test]
    async fn test_delete_and_rollback() {
        let client = seeded_client(false).await;
        client
            .delete_article("घर", &ArticleId::new("a1"))
            .await
            .unwrap();
        assert_eq!(client.groups().get(&client.group_key("घर")), Some(vec![]));

        let client = seeded_client(true).await;
        assert!(client
            .delete_article("घर", &ArticleId::new("a1"))
            .await
            .is_err());
        assert_eq!(
            client.groups().get(&client.group_key("घर")),
            Some(vec![article("a1")])
        );
    }

    #[tokio::test]
    async fn test_mutation_marks_lookups_stale() {
        let client = seeded_client(false).await;
        client.lookup("घ").await.unwrap();
        let key = QueryKey::lookup("घ", false);
        assert!(!client.lookups().is_stale(&key));

        client
            .delete_article("घर", &ArticleId::new("a1"))
            .await
            .unwrap();
        assert!(client.lookups().is_stale(&key));
    }
}
