use postgres::Statement;
use quarry_core::Prepared;
use std::fmt::{self, Display};

/// Server side prepared statement.
///
/// Named placeholders are rewritten into `$n` positions, a name repeated in
/// the query shares its position.
pub struct PostgresPrepared {
    pub(crate) statement: Statement,
    sql: String,
    names: Vec<String>,
}

impl PostgresPrepared {
    pub(crate) fn new(statement: Statement, sql: String, names: Vec<String>) -> Self {
        Self {
            statement,
            sql,
            names,
        }
    }
    /// Statement text as sent to the server.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl Prepared for PostgresPrepared {
    fn parameter_names(&self) -> &[String] {
        &self.names
    }
}

impl Display for PostgresPrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
