use std::{env, path::PathBuf, time::Duration};

use eyre::{Report, Result};
use msgboard_psql::{model::TableName, DatabaseConfig};

const DEFAULT_CONTAINER_ID: &str = "Unknown";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT: u64 = 5;
const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ServiceKind {
    Reader,
    Writer,
}

impl ServiceKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Writer => "writer",
        }
    }

    fn port_var(self) -> &'static str {
        match self {
            Self::Reader => "READER_PORT",
            Self::Writer => "WRITER_PORT",
        }
    }
}

#[derive(Debug)]
pub struct ServerConfig {
    pub kind: ServiceKind,
    pub port: u16,
    pub database: DatabaseConfig,
    pub table: TableName,
    pub container_id: Box<str>,
    pub log_dir: PathBuf,
}

impl ServerConfig {
    /// Reads the configuration of the given service from the environment.
    ///
    /// Values of a `.env` file in the working directory are loaded first if
    /// such a file exists.
    pub fn from_env(kind: ServiceKind) -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(Report::new(err).wrap_err("failed to load .env file"));
            }
        }

        Self::from_vars(kind, |name| env::var(name).ok())
    }

    pub(crate) fn from_vars<F>(kind: ServiceKind, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let acquire_timeout: u64 =
            env_var_or(&var, "DATABASE_ACQUIRE_TIMEOUT", DEFAULT_ACQUIRE_TIMEOUT)?;

        Ok(Self {
            kind,
            port: env_var(&var, kind.port_var())?,
            database: DatabaseConfig {
                host: env_var(&var, "DATABASE_HOST")?,
                port: env_var(&var, "DATABASE_PORT")?,
                user: env_var(&var, "DATABASE_USER")?,
                password: env_var(&var, "DATABASE_PASSWORD")?,
                name: env_var(&var, "DATABASE_NAME")?,
                max_connections: env_var_or(
                    &var,
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                )?,
                acquire_timeout: Duration::from_secs(acquire_timeout),
            },
            table: env_var(&var, "DATABASE_TABLE_NAME")?,
            container_id: env_var_or(&var, "HOSTNAME", Box::from(DEFAULT_CONTAINER_ID))?,
            log_dir: env_var_or(&var, "LOG_DIR", PathBuf::from(DEFAULT_LOG_DIR))?,
        })
    }
}

trait EnvKind: Sized {
    const EXPECTED: &'static str;

    fn from_str(s: String) -> Result<Self, String>;
}

macro_rules! env_kind {
    ($($ty:ty: |$arg:ident| $impl:block,)*) => {
        $(
            impl EnvKind for $ty {
                const EXPECTED: &'static str = stringify!($ty);

                fn from_str($arg: String) -> Result<Self, String> {
                    $impl
                }
            }
        )*
    };
}

env_kind! {
    Box<str>: |s| { Ok(s.into_boxed_str()) },
    u16: |s| { s.parse().map_err(|_| s) },
    u32: |s| { s.parse().map_err(|_| s) },
    u64: |s| { s.parse().map_err(|_| s) },
    PathBuf: |s| { s.parse().map_err(|_| s) },
}

impl EnvKind for TableName {
    const EXPECTED: &'static str = "a non-empty name of at most 63 bytes without NUL";

    fn from_str(s: String) -> Result<Self, String> {
        TableName::new(&s).map_err(|_| s)
    }
}

fn env_var<T, F>(var: &F, name: &str) -> Result<T>
where
    T: EnvKind,
    F: Fn(&str) -> Option<String>,
{
    let value = var(name).ok_or_else(|| eyre!("missing env variable `{name}`"))?;

    parse_var(name, value)
}

fn env_var_or<T, F>(var: &F, name: &str, default: T) -> Result<T>
where
    T: EnvKind,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) => parse_var(name, value),
        None => Ok(default),
    }
}

fn parse_var<T: EnvKind>(name: &str, value: String) -> Result<T> {
    T::from_str(value).map_err(|value| {
        eyre!(
            "failed to parse env variable `{name}={value}`; expected {expected}",
            expected = T::EXPECTED
        )
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_NAME", "board"),
            ("DATABASE_USER", "board_user"),
            ("DATABASE_PASSWORD", "hunter2"),
            ("DATABASE_HOST", "postgres"),
            ("DATABASE_PORT", "5432"),
            ("DATABASE_TABLE_NAME", "messages"),
            ("READER_PORT", "5001"),
            ("WRITER_PORT", "5000"),
        ])
    }

    fn config(kind: ServiceKind, vars: &HashMap<&str, &str>) -> Result<ServerConfig> {
        ServerConfig::from_vars(kind, |name| vars.get(name).map(|value| value.to_string()))
    }

    #[test]
    fn reads_reader_and_writer_ports() -> Result<()> {
        let vars = vars();

        let reader = config(ServiceKind::Reader, &vars)?;
        assert_eq!(reader.port, 5001);
        assert_eq!(reader.table.as_str(), "messages");
        assert_eq!(&*reader.database.host, "postgres");
        assert_eq!(reader.database.port, 5432);

        let writer = config(ServiceKind::Writer, &vars)?;
        assert_eq!(writer.port, 5000);

        Ok(())
    }

    #[test]
    fn applies_defaults() -> Result<()> {
        let config = config(ServiceKind::Reader, &vars())?;

        assert_eq!(&*config.container_id, "Unknown");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.log_dir, PathBuf::from("./logs"));

        Ok(())
    }

    #[test]
    fn names_missing_variable() {
        let mut vars = vars();
        vars.remove("DATABASE_PASSWORD");

        let err = config(ServiceKind::Writer, &vars).unwrap_err();
        assert_eq!(err.to_string(), "missing env variable `DATABASE_PASSWORD`");
    }

    #[test]
    fn only_requires_own_port() -> Result<()> {
        let mut vars = vars();
        vars.remove("WRITER_PORT");

        config(ServiceKind::Reader, &vars)?;
        assert!(config(ServiceKind::Writer, &vars).is_err());

        Ok(())
    }

    #[test]
    fn rejects_unparsable_values() {
        let mut vars = vars();
        vars.insert("DATABASE_PORT", "postgres");

        let err = config(ServiceKind::Reader, &vars).unwrap_err();
        assert!(err.to_string().contains("DATABASE_PORT=postgres"));

        vars.insert("DATABASE_PORT", "5432");
        vars.insert("DATABASE_TABLE_NAME", "");
        assert!(config(ServiceKind::Reader, &vars).is_err());
    }

    #[test]
    fn debug_hides_password() -> Result<()> {
        let config = config(ServiceKind::Reader, &vars())?;

        assert!(!format!("{config:?}").contains("hunter2"));

        Ok(())
    }
}
