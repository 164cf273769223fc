mod driver;
mod prepared;
mod value_wrap;

pub use driver::*;
pub use prepared::*;
pub(crate) use value_wrap::*;

use quarry_core::Error;

/// A session on a MySQL or MariaDB server.
pub type MySqlConnection = quarry_core::Connection<MySqlDriver>;

pub(crate) fn driver_error(error: mysql::Error) -> Error {
    Error::driver(error.to_string())
}
