//! HTTP JSON API.
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | GET | `/api/articles/get/{word}` | optional, admins also see drafts |
//! | GET | `/api/articles/query?term=` | optional, admins also see drafts |
//! | POST | `/api/articles/add/` | required unless anonymous submissions are on |
//! | POST | `/api/articles/update/` | required |
//! | DELETE | `/api/articles/remove/{id}` | admin |
//! | GET | `/api/is-admin` | optional |
//!
//! Tokens travel in `X-Firebase-Token` or `Authorization: Bearer`.

pub mod articles;
pub mod caller;
pub mod users;

use std::path::Path;
use std::sync::Arc;

use axum::{
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::json;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{auth::IdentityProvider, store::ArticleStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub anonymous_submissions: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn ArticleStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            anonymous_submissions: false,
        }
    }

    pub fn with_anonymous_submissions(mut self, enabled: bool) -> Self {
        self.anonymous_submissions = enabled;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/ping", get(ping))
        .route("/api/articles/get/{word}", get(articles::get_articles))
        .route("/api/articles/query", get(articles::query_articles))
        .route("/api/articles/add", post(articles::add_article))
        .route("/api/articles/add/", post(articles::add_article))
        .route("/api/articles/update", post(articles::update_article))
        .route("/api/articles/update/", post(articles::update_article))
        .route("/api/articles/remove/{id}", delete(articles::remove_article))
        .route("/api/is-admin", get(users::is_admin))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The API plus the built client application, with unknown paths falling
/// back to `index.html` so client-side routes resolve.
pub fn router_with_static(state: AppState, static_dir: &Path) -> Router {
    let index = ServeFile::new(static_dir.join("index.html"));
    router(state).fallback_service(ServeDir::new(static_dir).fallback(index))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn ping() -> &'static str {
    "pong"
}
