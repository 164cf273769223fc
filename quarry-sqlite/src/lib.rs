mod cbox;
mod driver;
mod extract;
mod prepared;

pub(crate) use cbox::*;
pub use driver::*;
pub use prepared::*;

use libsqlite3_sys::{sqlite3, sqlite3_errmsg};
use quarry_core::Error;
use std::ffi::{CStr, c_char};

/// A session on a SQLite database.
pub type SqliteConnection = quarry_core::Connection<SqliteDriver>;

pub(crate) fn error_message_from_ptr(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return "Unknown error (could not extract the error message)".into();
    }
    // SAFETY: SQLite error messages are nul terminated
    unsafe { CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned()
}

/// Latest error reported on `db`.
pub(crate) fn last_error(db: *mut sqlite3) -> Error {
    // SAFETY: sqlite3_errmsg accepts any connection handle, null included
    Error::driver(error_message_from_ptr(unsafe { sqlite3_errmsg(db) }))
}
