use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::{
        header::{HeaderName, LOCATION},
        StatusCode,
    },
    response::Html,
    Form,
};
use serde::Deserialize;

use super::{ensure_table, IndexData};
use crate::{
    error::PageError,
    state::{AppState, INDEX_TEMPLATE},
};

#[derive(Deserialize)]
pub struct NewMessage {
    message: String,
}

pub async fn get_index(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    ensure_table(&*state.store).await?;

    let data = IndexData {
        container_id: &state.container_id,
        table: state.store.table().as_str(),
    };

    let page = state.handlebars.render(INDEX_TEMPLATE, &data)?;

    Ok(Html(page))
}

pub async fn post_message(
    State(state): State<Arc<AppState>>,
    form: Result<Form<NewMessage>, FormRejection>,
) -> Result<(StatusCode, [(HeaderName, &'static str); 1]), PageError> {
    ensure_table(&*state.store).await?;

    let Form(NewMessage { message }) = form.map_err(|_| PageError::MissingField)?;

    let message_id = state
        .store
        .insert(&message)
        .await
        .map_err(|err| PageError::Database(err.wrap_err("failed to insert message")))?;

    debug!(message_id, "Inserted message");

    Ok((StatusCode::FOUND, [(LOCATION, "/")]))
}
