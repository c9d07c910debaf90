use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    time::Duration,
};

use sqlx::{
    pool::PoolConnection,
    postgres::{PgConnectOptions, PgPoolOptions},
    Error as SqlxError, PgPool, Postgres,
};

/// Everything needed to reach the database.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: Box<str>,
    pub port: u16,
    pub user: Box<str>,
    pub password: Box<str>,
    pub name: Box<str>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Debug for DatabaseConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

#[derive(Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Creates a lazily connecting pool so the caller may start serving
    /// before the database is reachable.
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(options);

        debug!(
            host = &*config.host,
            port = config.port,
            database = &*config.name,
            max_connections = config.max_connections,
            "Created lazy connection pool"
        );

        Self::from_pool(pool)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a connection from the pool.
    ///
    /// The connection goes back to the pool once the returned guard is
    /// dropped, no matter how the statement using it ended.
    pub(crate) async fn acquire(&self) -> Result<PoolConnection<Postgres>, SqlxError> {
        self.pool.acquire().await
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await
    }
}
