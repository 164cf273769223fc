use mysql::Statement;
use quarry_core::Prepared;
use std::fmt::{self, Display};

/// Server side prepared statement, placeholders are rewritten into `?`.
///
/// MySQL positions are anonymous: a name used twice is bound twice.
pub struct MySqlPrepared {
    pub(crate) statement: Statement,
    sql: String,
    names: Vec<String>,
}

impl MySqlPrepared {
    pub(crate) fn new(statement: Statement, sql: String, names: Vec<String>) -> Self {
        Self {
            statement,
            sql,
            names,
        }
    }
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl Prepared for MySqlPrepared {
    fn parameter_names(&self) -> &[String] {
        &self.names
    }
}

impl Display for MySqlPrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
