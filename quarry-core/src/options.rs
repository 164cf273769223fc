use crate::{DialectKind, Error, Result};
use std::{collections::BTreeMap, str::FromStr};

pub const DEFAULT_CHARSET: &str = "utf8";
pub const DEFAULT_LOG_CAPACITY: usize = 1024;
pub const DEFAULT_PREPARED_CAPACITY: usize = 256;

/// Options accepted by [`Connection::open`](crate::Connection::open) next to the DSN.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Driver specific settings, unknown keys are ignored by drivers.
    pub flags: BTreeMap<String, String>,
    /// Prepended to every table name.
    pub table_prefix: String,
    pub charset: String,
    /// Overrides the driver default dialect.
    pub dialect: Option<DialectKind>,
    /// Maximum number of entries kept in the execution log, `None` for unbounded.
    pub log_capacity: Option<usize>,
    /// Maximum number of cached prepared statements, the oldest is released
    /// first. `None` for unbounded, at least one statement is always kept.
    pub prepared_capacity: Option<usize>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            flags: BTreeMap::new(),
            table_prefix: String::new(),
            charset: DEFAULT_CHARSET.into(),
            dialect: None,
            log_capacity: Some(DEFAULT_LOG_CAPACITY),
            prepared_capacity: Some(DEFAULT_PREPARED_CAPACITY),
        }
    }
}

impl ConnectOptions {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
    pub fn flag(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.flags.insert(name.into(), value.to_string());
        self
    }
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }
    pub fn dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = Some(dialect);
        self
    }
    /// Resolve the dialect by name, see [`DialectKind::from_str`].
    pub fn dialect_name(self, name: &str) -> Result<Self> {
        Ok(self.dialect(name.parse()?))
    }
    pub fn log_capacity(mut self, capacity: Option<usize>) -> Self {
        self.log_capacity = capacity;
        self
    }
    pub fn prepared_capacity(mut self, capacity: Option<usize>) -> Self {
        self.prepared_capacity = capacity;
        self
    }

    pub fn get_flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    /// Parse a flag, a value that does not parse is a configuration error.
    pub fn parse_flag<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_flag(name)
            .map(|v| {
                v.parse::<T>().map_err(|e| {
                    Error::Configuration(format!("Invalid value `{}` for flag `{}`: {}", v, name, e))
                })
            })
            .transpose()
    }
}

/// Components of a connection string, see [`generate_connection_string`](crate::generate_connection_string).
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Database name, or file path for SQLite.
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionParams {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
    pub fn credentials(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }
}
