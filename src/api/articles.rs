use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{
    api::{caller::Caller, AppState},
    article::{
        validation::{validate_new_article, validate_partial_article, validate_term},
        ArticleId, NewArticle, PartialArticle, Status,
    },
    error::RestError,
    store::LOOKUP_LIMIT,
};

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub term: Option<String>,
}

/// All articles filed under one headword. Drafts are visible to admins only.
pub async fn get_articles(
    State(state): State<AppState>,
    Path(word): Path<String>,
    caller: Caller,
) -> Result<impl IntoResponse, RestError> {
    let word = word.trim();
    validate_term("word", word)?;

    let include_drafts = caller.is_admin(&state).await?;
    let articles = state.store.find_by_word(word, include_drafts).await?;
    Ok(Json(articles))
}

/// Prefix search over headwords.
pub async fn query_articles(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
    caller: Caller,
) -> Result<impl IntoResponse, RestError> {
    let term = params
        .term
        .filter(|term| !term.is_empty())
        .ok_or(RestError::MissingParameter("term"))?;
    let term = term.trim();
    validate_term("term", term)?;

    let include_drafts = caller.is_admin(&state).await?;
    let articles = state
        .store
        .find_by_prefix(term, include_drafts, LOOKUP_LIMIT)
        .await?;
    Ok(Json(articles))
}

pub async fn add_article(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<impl IntoResponse, RestError> {
    let mut article: NewArticle = serde_json::from_slice(&body)?;
    article.normalize();
    validate_new_article(&article)?;

    if caller.identity.is_none() && !state.anonymous_submissions {
        return Err(RestError::Unauthenticated("add an article"));
    }

    // author and approval are never taken from the payload
    article.author = caller.email().map(str::to_string);
    article.status = Status::Draft;
    if !caller.user(&state).await?.can_approve() {
        article.approved = None;
    }

    let id = state.store.insert(article).await?;
    info!(
        "Article {} added by {}",
        id,
        caller.email().unwrap_or("anonymous")
    );
    Ok(Json(id))
}

pub async fn update_article(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<impl IntoResponse, RestError> {
    let mut patch: PartialArticle = serde_json::from_slice(&body)?;
    patch.normalize();
    validate_partial_article(&patch)?;

    let Some(email) = caller.email() else {
        return Err(RestError::Unauthenticated("update an article"));
    };

    if patch.approved.is_some() && !caller.user(&state).await?.can_approve() {
        patch.approved = None;
    }

    state.store.update(&patch, Some(email.to_string())).await?;
    info!("Article {} updated by {}", patch.id, email);
    Ok(Json(Value::Null))
}

pub async fn remove_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<impl IntoResponse, RestError> {
    if !caller.is_admin(&state).await? {
        return Err(RestError::NotAdmin("remove an article"));
    }

    let id = ArticleId::new(id);
    state.store.remove(&id).await?;
    info!("Article {} removed by {}", id, caller.email().unwrap_or_default());
    Ok(Json(Value::Null))
}
