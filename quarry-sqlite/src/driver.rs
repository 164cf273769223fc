use crate::{
    CBox, SqlitePrepared, error_message_from_ptr,
    extract::{extract_name, extract_value},
    last_error,
};
use libsqlite3_sys::*;
use quarry_core::{
    ConnectOptions, DialectKind, Driver, Error, Params, Result, Row, truncate_long,
};
use std::{
    ffi::{CStr, CString, c_char, c_int},
    ptr,
    sync::Arc,
};

/// Milliseconds a statement waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: i32 = 5000;

/// SQLite driver over the bundled library.
///
/// The DSN is `sqlite://{path}`, a path with a query string (for example
/// `sqlite://data.db?mode=ro`) is opened as an SQLite URI filename.
/// Transactions start with `BEGIN IMMEDIATE` so that concurrent writers
/// serialize on the busy timeout instead of failing on lock upgrade.
pub struct SqliteDriver {
    pub(crate) connection: CBox<*mut sqlite3>,
}

impl SqliteDriver {
    pub const PREFIX: &'static str = "sqlite://";

    /// Execute one or more statements without parameters.
    pub(crate) fn exec(&mut self, sql: &str) -> Result<()> {
        let query = CString::new(sql)
            .map_err(|e| Error::driver(format!("Invalid query text: {}", e)))?;
        unsafe {
            let mut message: *mut c_char = ptr::null_mut();
            let rc = sqlite3_exec(
                *self.connection,
                query.as_ptr(),
                None,
                ptr::null_mut(),
                &mut message,
            );
            if rc != SQLITE_OK {
                let error = Error::driver(error_message_from_ptr(message));
                sqlite3_free(message as *mut _);
                return Err(error);
            }
        }
        Ok(())
    }

    fn step_all(&mut self, prepared: &mut SqlitePrepared, mut row: impl FnMut()) -> Result<()> {
        let statement = *prepared.statement;
        let result = loop {
            match unsafe { sqlite3_step(statement) } {
                SQLITE_ROW => row(),
                SQLITE_DONE => break Ok(()),
                _ => break Err(last_error(*self.connection)),
            }
        };
        // Releases the read or write lock held by the statement
        unsafe {
            sqlite3_reset(statement);
        }
        result
    }

    fn filename(dsn: &str) -> Result<(String, c_int)> {
        let Some(path) = dsn.strip_prefix(Self::PREFIX) else {
            return Err(Error::Configuration(format!(
                "Expected sqlite connection url to start with `{}`",
                Self::PREFIX
            )));
        };
        let flags = SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE;
        if path.is_empty() || path == ":memory:" {
            return Ok((":memory:".into(), flags));
        }
        if path.starts_with("file:") {
            return Ok((path.into(), flags | SQLITE_OPEN_URI));
        }
        if path.contains('?') {
            return Ok((format!("file:{}", path), flags | SQLITE_OPEN_URI));
        }
        let path = urlencoding::decode(path)
            .map_err(|e| Error::Configuration(format!("Invalid sqlite path `{}`: {}", path, e)))?;
        Ok((path.into_owned(), flags))
    }
}

impl Driver for SqliteDriver {
    type Prepared = SqlitePrepared;

    const NAME: &'static str = "sqlite";
    const DIALECT: DialectKind = DialectKind::Sqlite;

    fn connect(dsn: &str, options: &ConnectOptions) -> Result<Self> {
        let (filename, flags) = Self::filename(dsn)?;
        let busy_timeout = options
            .parse_flag::<i32>("busy_timeout")?
            .unwrap_or(DEFAULT_BUSY_TIMEOUT);
        let filename = CString::new(filename)
            .map_err(|e| Error::Configuration(format!("Invalid sqlite path: {}", e)))?;
        let mut connection: CBox<*mut sqlite3> = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        let rc = unsafe { sqlite3_open_v2(filename.as_ptr(), &mut *connection, flags, ptr::null()) };
        if rc != SQLITE_OK {
            let error = if connection.is_null() {
                Error::driver("Cannot allocate the sqlite connection")
            } else {
                last_error(*connection)
            };
            log::error!("Cannot open `{}`: {}", dsn, error);
            return Err(error);
        }
        unsafe {
            sqlite3_busy_timeout(*connection, busy_timeout);
        }
        Ok(Self { connection })
    }

    fn prepare(&mut self, sql: &str) -> Result<SqlitePrepared> {
        let query = CString::new(sql)
            .map_err(|e| Error::driver(format!("Could not create a CString from the query: {}", e)))?;
        let mut statement: CBox<*mut sqlite3_stmt> = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_finalize(p);
        });
        let mut tail = ptr::null();
        let rc = unsafe {
            sqlite3_prepare_v2(
                *self.connection,
                query.as_ptr(),
                -1,
                &mut *statement,
                &mut tail,
            )
        };
        if rc != SQLITE_OK {
            return Err(last_error(*self.connection));
        }
        if statement.is_null() {
            return Err(Error::driver(format!(
                "The query does not contain any statement:\n{}",
                truncate_long!(sql)
            )));
        }
        if !tail.is_null() {
            let remaining = unsafe { CStr::from_ptr(tail) }.to_bytes();
            if !remaining.iter().all(u8::is_ascii_whitespace) {
                return Err(Error::driver(
                    "Cannot prepare more than one statement at a time",
                ));
            }
        }
        Ok(SqlitePrepared::new(statement, sql))
    }

    fn query(&mut self, prepared: &mut SqlitePrepared, params: &Params) -> Result<Vec<Row>> {
        prepared.bind(params)?;
        let statement = *prepared.statement;
        let count = unsafe { sqlite3_column_count(statement) };
        let labels = (0..count)
            .map(|i| extract_name(statement, i))
            .collect::<Result<Arc<[_]>>>()?;
        let mut rows = Vec::new();
        let mut failure = None;
        self.step_all(prepared, || {
            if failure.is_some() {
                return;
            }
            match (0..count)
                .map(|i| extract_value(statement, i))
                .collect::<Result<Vec<_>>>()
            {
                Ok(values) => rows.push(Row::new(labels.clone(), values)),
                Err(e) => failure = Some(e),
            }
        })?;
        match failure {
            Some(e) => Err(e),
            None => Ok(rows),
        }
    }

    fn execute(&mut self, prepared: &mut SqlitePrepared, params: &Params) -> Result<u64> {
        prepared.bind(params)?;
        let before = unsafe { sqlite3_total_changes(*self.connection) };
        self.step_all(prepared, || {})?;
        let after = unsafe { sqlite3_total_changes(*self.connection) };
        Ok((after - before).max(0) as u64)
    }

    fn quote(&self, value: &str) -> Option<String> {
        let value = CString::new(value).ok()?;
        unsafe {
            let quoted = sqlite3_mprintf(c"%Q".as_ptr(), value.as_ptr());
            if quoted.is_null() {
                return None;
            }
            let result = CStr::from_ptr(quoted).to_string_lossy().into_owned();
            sqlite3_free(quoted as *mut _);
            Some(result)
        }
    }

    /// Only effective before the database file is first written.
    fn set_charset(&mut self, charset: &str) -> Result<()> {
        let encoding = match charset.to_ascii_lowercase().replace('-', "").as_str() {
            "utf8" | "utf8mb4" => "UTF-8",
            "utf16" => "UTF-16",
            "utf16le" => "UTF-16le",
            "utf16be" => "UTF-16be",
            _ => {
                return Err(Error::driver(format!(
                    "Unsupported character set `{}`",
                    charset
                )));
            }
        };
        self.exec(&format!("PRAGMA encoding = '{}';", encoding))
    }

    fn begin(&mut self) -> Result<()> {
        self.exec("BEGIN IMMEDIATE;")
    }

    fn commit(&mut self) -> Result<()> {
        self.exec("COMMIT;")
    }

    fn rollback(&mut self) -> Result<()> {
        self.exec("ROLLBACK;")
    }

    fn in_transaction(&self) -> bool {
        unsafe { sqlite3_get_autocommit(*self.connection) == 0 }
    }

    fn last_insert_id(&mut self) -> Result<String> {
        Ok(unsafe { sqlite3_last_insert_rowid(*self.connection) }.to_string())
    }
}
