use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// PostgreSQL truncates identifiers longer than `NAMEDATALEN - 1` bytes.
const MAX_LEN: usize = 63;

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum InvalidTableName {
    #[error("table name must not be empty")]
    Empty,
    #[error("table name must not exceed {MAX_LEN} bytes, got {0}")]
    TooLong(usize),
    #[error("table name must not contain NUL bytes")]
    Nul,
}

/// Name of the message table.
///
/// Validated once on creation and quoted as a PostgreSQL identifier so
/// that it can be interpolated into statements as-is.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableName {
    raw: Box<str>,
    quoted: Box<str>,
}

impl TableName {
    pub fn new(name: &str) -> Result<Self, InvalidTableName> {
        if name.is_empty() {
            return Err(InvalidTableName::Empty);
        } else if name.len() > MAX_LEN {
            return Err(InvalidTableName::TooLong(name.len()));
        } else if name.contains('\0') {
            return Err(InvalidTableName::Nul);
        }

        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push('"');

        for c in name.chars() {
            if c == '"' {
                quoted.push('"');
            }

            quoted.push(c);
        }

        quoted.push('"');

        Ok(Self {
            raw: Box::from(name),
            quoted: quoted.into_boxed_str(),
        })
    }

    /// The name as it appears in the schema catalog.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The name as it must appear inside a statement.
    pub fn quoted(&self) -> &str {
        &self.quoted
    }
}

impl FromStr for TableName {
    type Err = InvalidTableName;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for TableName {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.raw)
    }
}
