use eyre::{Result, WrapErr};

use crate::{database::Database, model::TableName};

impl Database {
    /// Checks the schema catalog for the table in the `public` schema.
    ///
    /// An error means the state of the table could not be determined.
    pub async fn select_table_exists(&self, table: &TableName) -> Result<bool> {
        let mut conn = self
            .acquire()
            .await
            .wrap_err("failed to acquire connection")?;

        let query = sqlx::query_scalar::<_, bool>(
            r#"
SELECT 
  EXISTS (
    SELECT 
    FROM 
      information_schema.tables 
    WHERE 
      table_schema = 'public' 
      AND table_name = $1
  )"#,
        )
        .bind(table.as_str());

        let exists = query
            .fetch_one(&mut *conn)
            .await
            .wrap_err("failed to fetch one")?;

        Ok(exists)
    }
}
