use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::article::{Article, ArticleId, NewArticle, PartialArticle};
use crate::client::{ClientError, Session};

const TOKEN_HEADER: &str = "X-Firebase-Token";

/// Remote operations the client cache sits on top of.
#[async_trait]
pub trait ArticlesApi: Send + Sync {
    async fn get_articles(&self, session: &Session, word: &str)
        -> Result<Vec<Article>, ClientError>;

    async fn lookup_articles(&self, session: &Session, term: &str)
        -> Result<Vec<Article>, ClientError>;

    async fn add_article(
        &self,
        session: &Session,
        article: &NewArticle,
    ) -> Result<ArticleId, ClientError>;

    async fn update_article(
        &self,
        session: &Session,
        patch: &PartialArticle,
    ) -> Result<(), ClientError>;

    async fn remove_article(&self, session: &Session, id: &ArticleId) -> Result<(), ClientError>;

    async fn is_admin(&self, session: &Session) -> Result<bool, ClientError>;
}

/// [`ArticlesApi`] over the server's JSON endpoints.
pub struct HttpArticlesApi {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IsAdmin {
    is_admin: bool,
}

impl HttpArticlesApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Url(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(request: RequestBuilder, session: &Session) -> RequestBuilder {
        match session.as_token() {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder, session: &Session) -> Result<Response, ClientError> {
        let response = Self::authorize(request, session).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!("request failed with {}: {}", status, body);
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("message")?.as_str().map(str::to_string))
            .unwrap_or(body);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(
        request: RequestBuilder,
        session: &Session,
    ) -> Result<T, ClientError> {
        Ok(Self::send(request, session).await?.json().await?)
    }
}

#[async_trait]
impl ArticlesApi for HttpArticlesApi {
    async fn get_articles(
        &self,
        session: &Session,
        word: &str,
    ) -> Result<Vec<Article>, ClientError> {
        let request = self.http.get(self.url(&["api", "articles", "get", word]));
        Self::json(request, session).await
    }

    async fn lookup_articles(
        &self,
        session: &Session,
        term: &str,
    ) -> Result<Vec<Article>, ClientError> {
        let request = self
            .http
            .get(self.url(&["api", "articles", "query"]))
            .query(&[("term", term)]);
        Self::json(request, session).await
    }

    async fn add_article(
        &self,
        session: &Session,
        article: &NewArticle,
    ) -> Result<ArticleId, ClientError> {
        let request = self
            .http
            .post(self.url(&["api", "articles", "add", ""]))
            .json(article);
        Self::json(request, session).await
    }

    async fn update_article(
        &self,
        session: &Session,
        patch: &PartialArticle,
    ) -> Result<(), ClientError> {
        let request = self
            .http
            .post(self.url(&["api", "articles", "update", ""]))
            .json(patch);
        Self::send(request, session).await?;
        Ok(())
    }

    async fn remove_article(&self, session: &Session, id: &ArticleId) -> Result<(), ClientError> {
        let request = self
            .http
            .delete(self.url(&["api", "articles", "remove", id.as_str()]));
        Self::send(request, session).await?;
        Ok(())
    }

    async fn is_admin(&self, session: &Session) -> Result<bool, ClientError> {
        let request = self.http.get(self.url(&["api", "is-admin"]));
        let response: IsAdmin = Self::json(request, session).await?;
        Ok(response.is_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::PartOfSpeech;
    use mockito::Matcher;

    #[test]
    fn test_url_encodes_headword() {
        let api = HttpArticlesApi::new("http://localhost:3005/").unwrap();
        let url = api.url(&["api", "articles", "get", "घर"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:3005/api/articles/get/%E0%A4%98%E0%A4%B0"
        );
        assert!(api.url(&["api", "articles", "add", ""]).as_str().ends_with("/add/"));
    }

    #[tokio::test]
    async fn test_token_header_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/articles/add/")
            .match_header("x-firebase-token", "tok")
            .match_body(Matcher::PartialJsonString(r#"{"word": "घर"}"#.into()))
            .with_status(200)
            .with_body(r#""new-id""#)
            .create_async()
            .await;

        let api = HttpArticlesApi::new(&server.url()).unwrap();
        let id = api
            .add_article(
                &Session::token("tok"),
                &NewArticle::new("घर", PartOfSpeech::Noun),
            )
            .await
            .unwrap();

        assert_eq!(id, ArticleId::new("new-id"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_message_surfaces_verbatim() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/articles/remove/missing")
            .with_status(410)
            .with_body(r#"{"message": "There is no article with id \"missing\""}"#)
            .create_async()
            .await;

        let api = HttpArticlesApi::new(&server.url()).unwrap();
        let err = api
            .remove_article(&Session::token("tok"), &ArticleId::new("missing"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(410));
        assert_eq!(err.to_string(), "There is no article with id \"missing\"");
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/is-admin")
            .match_header("x-firebase-token", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"isAdmin": false}"#)
            .create_async()
            .await;

        let api = HttpArticlesApi::new(&server.url()).unwrap();
        assert!(!api.is_admin(&Session::Anonymous).await.unwrap());
        mock.assert_async().await;
    }
}
