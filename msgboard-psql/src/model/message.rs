use serde::Serialize;
use sqlx::FromRow;

#[derive(Clone, Debug, Eq, PartialEq, FromRow, Serialize)]
pub struct Message {
    pub id: i64,
    pub content: String,
}
