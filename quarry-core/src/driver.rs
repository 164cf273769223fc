use crate::{ConnectOptions, DialectKind, Params, Prepared, Result, Row};

/// A database engine client.
///
/// Drivers are synchronous: every call blocks until the engine answers.
/// Parameters are always named (`:name`), drivers whose engine only supports
/// positional parameters rewrite them while preparing.
pub trait Driver: Sized {
    type Prepared: Prepared;

    /// Human readable name, used in logs.
    const NAME: &'static str;
    /// Dialect used when the connection options do not specify one.
    const DIALECT: DialectKind;

    /// Open a connection to `dsn`.
    fn connect(dsn: &str, options: &ConnectOptions) -> Result<Self>;

    fn prepare(&mut self, sql: &str) -> Result<Self::Prepared>;

    /// Execute a statement returning rows.
    fn query(&mut self, prepared: &mut Self::Prepared, params: &Params) -> Result<Vec<Row>>;

    /// Execute a statement, returns the number of affected rows.
    fn execute(&mut self, prepared: &mut Self::Prepared, params: &Params) -> Result<u64>;

    /// Engine specific string literal quoting, `None` if unsupported.
    fn quote(&self, _value: &str) -> Option<String> {
        None
    }

    fn set_charset(&mut self, charset: &str) -> Result<()>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
    fn in_transaction(&self) -> bool;

    /// Identifier generated by the last insert, as text.
    fn last_insert_id(&mut self) -> Result<String>;
}
