mod as_value;
mod column_def;
mod connection;
mod driver;
mod error;
mod execution_log;
mod options;
mod params;
mod prepared;
mod query;
mod row;
mod table_info;
mod util;
mod value;
pub mod writer;

pub use as_value::*;
pub use column_def::*;
pub use connection::*;
pub use driver::*;
pub use error::*;
pub use execution_log::*;
pub use options::*;
pub use params::*;
pub use prepared::*;
pub use query::*;
pub use row::*;
pub use table_info::*;
pub use util::*;
pub use value::*;
pub use writer::{
    Dialect, DialectKind, GenericSqlWriter, MySqlSqlWriter, PostgresSqlWriter, SqlWriter,
    SqliteSqlWriter, generate_connection_string,
};
