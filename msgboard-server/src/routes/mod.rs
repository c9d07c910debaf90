use serde::Serialize;

use crate::{error::PageError, store::MessageStore};

pub mod health;
pub mod metrics;
pub mod reader;
pub mod writer;

#[derive(Serialize)]
struct IndexData<'s> {
    container_id: &'s str,
    table: &'s str,
}

/// Fails unless the message table is known to exist.
async fn ensure_table(store: &dyn MessageStore) -> Result<(), PageError> {
    match store.table_exists().await {
        Ok(true) => Ok(()),
        Ok(false) => Err(PageError::MissingTable {
            table: Box::from(store.table().as_str()),
        }),
        Err(err) => Err(PageError::Database(
            err.wrap_err("failed to check table presence"),
        )),
    }
}
