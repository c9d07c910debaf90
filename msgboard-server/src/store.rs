use async_trait::async_trait;
use eyre::Result;
use msgboard_psql::{
    model::{Message, TableName},
    Database,
};

/// Access to the shared message table.
#[async_trait]
pub trait MessageStore: Send + Sync {
    fn table(&self) -> &TableName;

    /// Errors if the table state could not be determined.
    async fn table_exists(&self) -> Result<bool>;

    async fn list(&self) -> Result<Vec<Message>>;

    async fn insert(&self, content: &str) -> Result<i64>;

    /// Returns whether a message was deleted.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Returns the amount of deleted messages.
    async fn delete_all(&self) -> Result<u64>;
}

pub struct PsqlMessages {
    psql: Database,
    table: TableName,
}

impl PsqlMessages {
    pub fn new(psql: Database, table: TableName) -> Self {
        Self { psql, table }
    }

    pub async fn close(&self) {
        self.psql.close().await
    }
}

#[async_trait]
impl MessageStore for PsqlMessages {
    fn table(&self) -> &TableName {
        &self.table
    }

    async fn table_exists(&self) -> Result<bool> {
        self.psql.select_table_exists(&self.table).await
    }

    async fn list(&self) -> Result<Vec<Message>> {
        self.psql.select_messages(&self.table).await
    }

    async fn insert(&self, content: &str) -> Result<i64> {
        self.psql.insert_message(&self.table, content).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.psql.delete_message(&self.table, id).await
    }

    async fn delete_all(&self) -> Result<u64> {
        self.psql.delete_messages(&self.table).await
    }
}
