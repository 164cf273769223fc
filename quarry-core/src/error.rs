use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required connection option is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The query is structurally invalid and cannot be turned into SQL.
    #[error("Cannot compile the query: {0}")]
    Compile(String),
    /// A bound parameter is missing, clashing or cannot be sent to the driver.
    #[error("Parameter error: {0}")]
    Parameter(String),
    /// The driver reported a failure, `message` is the native error text.
    #[error("{message}")]
    Driver {
        message: String,
        sql: Option<String>,
    },
    /// A fetched value cannot be converted into the requested type.
    #[error("Conversion error: {0}")]
    Conversion(String),
}

impl Error {
    pub fn driver(message: impl Into<String>) -> Self {
        Error::Driver {
            message: message.into(),
            sql: None,
        }
    }

    /// Attach the statement that failed, keeps the first one attached.
    pub fn with_sql(self, query: &str) -> Self {
        match self {
            Error::Driver { message, sql: None } => Error::Driver {
                message,
                sql: Some(query.to_owned()),
            },
            other => other,
        }
    }

    /// Name the failed step of a multi statement operation.
    pub fn in_step(self, step: usize, total: usize) -> Self {
        match self {
            Error::Driver { message, sql } => Error::Driver {
                message: format!("Step {} of {} failed: {}", step, total, message),
                sql,
            },
            other => other,
        }
    }

    pub fn is_driver(&self) -> bool {
        matches!(self, Error::Driver { .. })
    }
}

/// Result of schema operations that report failure instead of raising.
///
/// Truncate, alter-field and index maintenance let callers branch on success
/// to fall back on another strategy. The cause of a failure is preserved.
#[derive(Debug)]
#[must_use]
pub enum Outcome {
    Success,
    Failure(Error),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(e) => Some(e),
        }
    }
    pub fn into_result(self) -> Result<()> {
        match self {
            Outcome::Success => Ok(()),
            Outcome::Failure(e) => Err(e),
        }
    }
}

impl From<Result<()>> for Outcome {
    fn from(value: Result<()>) -> Self {
        match value {
            Ok(()) => Outcome::Success,
            Err(e) => Outcome::Failure(e),
        }
    }
}

impl From<Outcome> for bool {
    fn from(value: Outcome) -> Self {
        value.is_success()
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Failure(e) => write!(f, "failure: {}", e),
        }
    }
}
