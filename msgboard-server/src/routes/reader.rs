use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use msgboard_psql::model::Message;

use super::{ensure_table, IndexData};
use crate::{
    error::PageError,
    state::{AppState, INDEX_TEMPLATE},
};

pub async fn get_index(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    ensure_table(&*state.store).await?;

    let data = IndexData {
        container_id: &state.container_id,
        table: state.store.table().as_str(),
    };

    let page = state.handlebars.render(INDEX_TEMPLATE, &data)?;

    Ok(Html(page))
}

pub async fn get_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Message>>, PageError> {
    ensure_table(&*state.store).await?;

    let messages = state
        .store
        .list()
        .await
        .map_err(|err| PageError::Database(err.wrap_err("failed to list messages")))?;

    Ok(Json(messages))
}

pub async fn delete_message(
    path: Result<Path<String>, PathRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, PageError> {
    let Some(message_id) = path.ok().and_then(|Path(id)| parse_message_id(&id)) else {
        return Ok(StatusCode::NOT_FOUND);
    };

    ensure_table(&*state.store).await?;

    let deleted = state
        .store
        .delete(message_id)
        .await
        .map_err(|err| PageError::Database(err.wrap_err("failed to delete message")))?;

    debug!(message_id, deleted, "Deleted message");

    Ok(StatusCode::NO_CONTENT)
}

/// Only plain digit strings that fit an `i64` name a message, so signs,
/// whitespace, and overflowing ids don't match the route.
fn parse_message_id(id: &str) -> Option<i64> {
    if id.is_empty() || !id.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    id.parse().ok()
}

pub async fn delete_all(State(state): State<Arc<AppState>>) -> Result<StatusCode, PageError> {
    ensure_table(&*state.store).await?;

    let count = state
        .store
        .delete_all()
        .await
        .map_err(|err| PageError::Database(err.wrap_err("failed to delete all messages")))?;

    info!(count, "Deleted all messages");

    Ok(StatusCode::NO_CONTENT)
}
