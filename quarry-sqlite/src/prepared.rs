use crate::{CBox, last_error};
use libsqlite3_sys::*;
use quarry_core::{Error, Params, Prepared, Result, Value, truncate_long};
use rust_decimal::prelude::ToPrimitive;
use std::{
    ffi::{CStr, c_int},
    fmt::{self, Display},
    os::raw::{c_char, c_void},
};

/// A compiled SQLite statement with its named parameters.
pub struct SqlitePrepared {
    pub(crate) statement: CBox<*mut sqlite3_stmt>,
    sql: String,
    names: Vec<String>,
}

impl SqlitePrepared {
    pub(crate) fn new(statement: CBox<*mut sqlite3_stmt>, sql: &str) -> Self {
        let names = unsafe {
            let count = sqlite3_bind_parameter_count(*statement);
            (1..=count)
                .map(|i| {
                    let name = sqlite3_bind_parameter_name(*statement, i);
                    if name.is_null() {
                        String::new()
                    } else {
                        let name = CStr::from_ptr(name).to_string_lossy();
                        name.trim_start_matches([':', '@', '$']).to_string()
                    }
                })
                .collect()
        };
        Self {
            statement,
            sql: sql.into(),
            names,
        }
    }

    /// Reset the statement and bind every parameter it expects.
    pub(crate) fn bind(&mut self, params: &Params) -> Result<()> {
        unsafe {
            sqlite3_reset(*self.statement);
            sqlite3_clear_bindings(*self.statement);
        }
        for (i, name) in self.names.iter().enumerate() {
            let value = params.get(name).ok_or_else(|| {
                Error::Parameter(format!(
                    "Parameter `{}` is not bound, query:\n{}",
                    name,
                    truncate_long!(self.sql)
                ))
            })?;
            self.bind_index(value, (i + 1) as c_int)?;
        }
        Ok(())
    }

    fn bind_text(&self, index: c_int, value: &str) -> c_int {
        unsafe {
            sqlite3_bind_text(
                *self.statement,
                index,
                value.as_ptr() as *const c_char,
                value.len() as c_int,
                SQLITE_TRANSIENT(),
            )
        }
    }

    fn bind_index(&self, value: &Value, index: c_int) -> Result<()> {
        let statement = *self.statement;
        let out_of_range = || {
            Error::Parameter(format!(
                "Cannot bind {} into a SQLite integer because it's out of bounds",
                value
            ))
        };
        let rc = unsafe {
            match value {
                v if v.is_null() => sqlite3_bind_null(statement, index),
                Value::Boolean(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int32(Some(v)) => sqlite3_bind_int(statement, index, *v),
                Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, *v),
                Value::UInt8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::UInt16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::UInt32(Some(v)) => sqlite3_bind_int64(statement, index, *v as sqlite3_int64),
                Value::UInt64(Some(v)) => {
                    let v = sqlite3_int64::try_from(*v).map_err(|_| out_of_range())?;
                    sqlite3_bind_int64(statement, index, v)
                }
                Value::Float32(Some(v)) => sqlite3_bind_double(statement, index, *v as f64),
                Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, *v),
                Value::Decimal(Some(v)) => sqlite3_bind_double(
                    statement,
                    index,
                    v.to_f64().ok_or_else(|| {
                        Error::Parameter(format!("Cannot convert the Decimal value `{}` to f64", v))
                    })?,
                ),
                Value::Varchar(Some(v)) => self.bind_text(index, v),
                Value::Blob(Some(v)) => sqlite3_bind_blob(
                    statement,
                    index,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                Value::Date(..)
                | Value::Time(..)
                | Value::Timestamp(..)
                | Value::TimestampWithTimezone(..)
                | Value::Uuid(..) => self.bind_text(index, &value.to_string()),
                _ => {
                    let error =
                        Error::Parameter(format!("Cannot use a {:?} as a query parameter", value));
                    log::error!("{}", error);
                    return Err(error);
                }
            }
        };
        if rc != SQLITE_OK {
            let error = last_error(unsafe { sqlite3_db_handle(statement) });
            log::error!(
                "Cannot bind parameter {} to query:\n{}\n{}",
                index,
                truncate_long!(self.sql),
                error
            );
            return Err(error);
        }
        Ok(())
    }
}

impl Prepared for SqlitePrepared {
    fn parameter_names(&self) -> &[String] {
        &self.names
    }
}

impl Display for SqlitePrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
