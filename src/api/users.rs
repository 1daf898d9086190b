use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    api::{caller::Caller, AppState},
    error::RestError,
};

pub async fn is_admin(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse, RestError> {
    let is_admin = caller.is_admin(&state).await?;
    Ok(Json(json!({ "isAdmin": is_admin })))
}
