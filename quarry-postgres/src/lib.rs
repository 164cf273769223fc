mod driver;
mod prepared;
mod value_holder;

pub use driver::*;
pub use prepared::*;
pub(crate) use value_holder::*;

use quarry_core::Error;

/// A session on a Postgres server.
pub type PostgresConnection = quarry_core::Connection<PostgresDriver>;

/// Native error text, the server message when there is one.
pub(crate) fn driver_error(error: postgres::Error) -> Error {
    match error.as_db_error() {
        Some(db) => Error::driver(format!("{}: {}", db.severity(), db.message())),
        None => Error::driver(error.to_string()),
    }
}
