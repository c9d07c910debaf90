use eyre::{Result, WrapErr};

use crate::{
    database::Database,
    model::{Message, TableName},
};

impl Database {
    /// Newest messages first.
    pub async fn select_messages(&self, table: &TableName) -> Result<Vec<Message>> {
        let mut conn = self
            .acquire()
            .await
            .wrap_err("failed to acquire connection")?;

        let sql = format!(
            r#"
SELECT
  id::int8 AS id,
  content
FROM
  {}
ORDER BY
  id DESC"#,
            table.quoted()
        );

        let messages = sqlx::query_as::<_, Message>(&sql)
            .fetch_all(&mut *conn)
            .await
            .wrap_err("failed to fetch all")?;

        Ok(messages)
    }

    /// Returns the id assigned by the database.
    pub async fn insert_message(&self, table: &TableName, content: &str) -> Result<i64> {
        let mut conn = self
            .acquire()
            .await
            .wrap_err("failed to acquire connection")?;

        let sql = format!(
            r#"
INSERT INTO {} (content)
VALUES
  ($1) RETURNING id::int8"#,
            table.quoted()
        );

        let id = sqlx::query_scalar::<_, i64>(&sql)
            .bind(content)
            .fetch_one(&mut *conn)
            .await
            .wrap_err("failed to execute query")?;

        Ok(id)
    }

    /// Returns whether a message was deleted
    pub async fn delete_message(&self, table: &TableName, id: i64) -> Result<bool> {
        let mut conn = self
            .acquire()
            .await
            .wrap_err("failed to acquire connection")?;

        let sql = format!(
            r#"
DELETE FROM
  {}
WHERE
  id = $1"#,
            table.quoted()
        );

        let res = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *conn)
            .await
            .wrap_err("failed to execute query")?;

        Ok(res.rows_affected() > 0)
    }

    /// Returns the amount of deleted messages
    pub async fn delete_messages(&self, table: &TableName) -> Result<u64> {
        let mut conn = self
            .acquire()
            .await
            .wrap_err("failed to acquire connection")?;

        let sql = format!("DELETE FROM {}", table.quoted());

        let res = sqlx::query(&sql)
            .execute(&mut *conn)
            .await
            .wrap_err("failed to execute query")?;

        Ok(res.rows_affected())
    }
}
