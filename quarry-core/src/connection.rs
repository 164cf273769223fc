use crate::{
    ColumnDef, Compiled, ConnectOptions, CreateTable, Dialect, Driver, Error, ExecutionLog,
    IndexDef, LogEntry, Name, Outcome, Params, Query, QueryKind, QueryResult, Result, Row,
    TableInfo, UpsertOutcome, expand_arrays_with, truncate_long,
};
use std::{
    borrow::Cow,
    collections::{HashMap, VecDeque, hash_map::Entry},
    sync::Arc,
    time::Instant,
};

fn failed(error: Error, sql: &str) -> Error {
    let error = error.with_sql(sql);
    log::error!("{}\nQuery: {}", error, truncate_long!(sql));
    error
}

fn unexpected(query: &Query, expected: &str) -> Error {
    Error::Compile(format!("{:?} does not produce {}", query.kind(), expected))
}

/// A database session: one driver handle bound to one dialect.
///
/// Queries are compiled once (the SQL is memoized on the [`Query`]) and the
/// prepared statements are cached per connection by SQL text, the same query
/// can be executed any number of times with different parameters. The cache
/// holds up to [`ConnectOptions::prepared_capacity`] statements.
pub struct Connection<D: Driver> {
    // Declared first, statements are released before the driver handle
    prepared: HashMap<Arc<str>, D::Prepared>,
    prepared_order: VecDeque<Arc<str>>,
    prepared_capacity: Option<usize>,
    driver: D,
    dialect: Dialect,
    charset: String,
    log: ExecutionLog,
}

impl<D: Driver> Connection<D> {
    /// Connect to `dsn` and apply the character set.
    ///
    /// The dialect is `options.dialect`, else the `dialect` flag resolved by
    /// name, else the driver default. Failing to set the character set is
    /// logged and ignored.
    pub fn open(dsn: &str, options: ConnectOptions) -> Result<Self> {
        let kind = match options.dialect {
            Some(kind) => kind,
            None => match options.get_flag("dialect") {
                Some(name) => name.parse()?,
                None => D::DIALECT,
            },
        };
        let driver = D::connect(dsn, &options)?;
        let dialect = Dialect::new(kind).with_table_prefix(options.table_prefix.as_str());
        log::debug!("Connected to {} using the {} dialect", D::NAME, kind);
        Ok(Self::with_driver(driver, dialect, &options))
    }

    /// Wrap an already connected driver.
    pub fn with_driver(mut driver: D, dialect: Dialect, options: &ConnectOptions) -> Self {
        if !options.charset.is_empty() {
            if let Err(e) = driver.set_charset(&options.charset) {
                log::warn!(
                    "Could not set the character set `{}` on {}, continuing: {}",
                    options.charset,
                    D::NAME,
                    e
                );
            }
        }
        Self {
            prepared: HashMap::new(),
            prepared_order: VecDeque::new(),
            prepared_capacity: options.prepared_capacity,
            driver,
            dialect,
            charset: options.charset.clone(),
            log: ExecutionLog::new(options.log_capacity),
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }
    pub fn charset(&self) -> &str {
        &self.charset
    }
    pub fn driver(&self) -> &D {
        &self.driver
    }
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Number of cached prepared statements.
    pub fn prepared_count(&self) -> usize {
        self.prepared.len()
    }
    pub fn clear_prepared(&mut self) {
        self.prepared.clear();
        self.prepared_order.clear();
    }

    /// Release the oldest statements until there is room for a new one.
    fn make_room(&mut self) {
        let Some(capacity) = self.prepared_capacity else {
            return;
        };
        while self.prepared.len() >= capacity.max(1) {
            let Some(oldest) = self.prepared_order.pop_front() else {
                break;
            };
            self.prepared.remove(&oldest);
        }
    }

    /// Compile (at most once) and execute `query`.
    ///
    /// Driver failures of truncate, alter field and index maintenance are
    /// returned as [`Outcome::Failure`], every other failure is an error.
    pub fn execute(&mut self, query: &Query, params: &Params) -> Result<QueryResult> {
        let compiled = query.compile(&self.dialect)?;
        if compiled.is_empty() {
            return Ok(QueryResult::Affected(0));
        }
        let statements = compiled.statements();
        let kind = query.kind();
        let result = match kind {
            QueryKind::Select(..) | QueryKind::Raw { returns_rows: true, .. } => {
                let (last, rest) = statements
                    .split_last()
                    .ok_or_else(|| unexpected(query, "a statement"))?;
                for sql in rest {
                    self.run_execute(sql, params)?;
                }
                QueryResult::Rows(self.run_query(last, params)?)
            }
            QueryKind::Upsert(..) => {
                let [update, insert] = statements else {
                    return Err(unexpected(query, "an update and an insert"));
                };
                self.run_execute(update, params)?;
                let inserted = self.run_execute(insert, params)?;
                QueryResult::Upserted(if inserted > 0 {
                    UpsertOutcome::Inserted
                } else {
                    UpsertOutcome::Updated
                })
            }
            QueryKind::TableExists { .. }
            | QueryKind::FieldExists { .. }
            | QueryKind::IndexExists { .. } => {
                let [probe] = statements else {
                    return Err(unexpected(query, "a single probe"));
                };
                QueryResult::Exists(!self.run_query(probe, params)?.is_empty())
            }
            QueryKind::TableInfo { table } => {
                let [columns, indices] = statements else {
                    return Err(unexpected(query, "two catalog probes"));
                };
                let columns = self.run_query(columns, params)?;
                let indices = self.run_query(indices, params)?;
                let index_prefix = self.dialect.context().index_name(table, "");
                QueryResult::TableInfo(TableInfo::from_catalog(&index_prefix, &columns, &indices)?)
            }
            _ if kind.is_soft_schema_operation() => {
                QueryResult::Schema(self.run_schema(&compiled, params)?)
            }
            _ => {
                let mut affected = 0;
                for sql in statements {
                    affected += self.run_execute(sql, params)?;
                }
                QueryResult::Affected(affected)
            }
        };
        if kind.changes_schema() {
            self.clear_prepared();
        }
        Ok(result)
    }

    /// Run schema statements reporting driver failures as outcome.
    ///
    /// Multiple statements are wrapped in a transaction when the dialect has
    /// transactional DDL and no transaction is active, otherwise the failure
    /// names the step that failed.
    fn run_schema(&mut self, compiled: &Compiled, params: &Params) -> Result<Outcome> {
        let statements = compiled.statements();
        let total = statements.len();
        let wrap = total > 1 && self.dialect.transactional_ddl() && !self.driver.in_transaction();
        if wrap {
            if let Err(e) = self.driver.begin() {
                log::warn!("Cannot begin the schema change transaction: {}", e);
                return Ok(Outcome::Failure(e));
            }
        }
        for (i, sql) in statements.iter().enumerate() {
            let Err(e) = self.run_execute(sql, params) else {
                continue;
            };
            if wrap {
                if let Err(e) = self.driver.rollback() {
                    log::error!("Cannot rollback the schema change: {}", e);
                }
            }
            if !e.is_driver() {
                return Err(e);
            }
            let e = if wrap || total == 1 {
                e
            } else {
                e.in_step(i + 1, total)
            };
            log::warn!("Schema change failed: {}", e);
            return Ok(Outcome::Failure(e));
        }
        if wrap {
            if let Err(e) = self.driver.commit() {
                log::warn!("Cannot commit the schema change: {}", e);
                if let Err(e) = self.driver.rollback() {
                    log::error!("Cannot rollback the schema change: {}", e);
                }
                return Ok(Outcome::Failure(e));
            }
        }
        Ok(Outcome::Success)
    }

    fn run_query(&mut self, sql: &Arc<str>, params: &Params) -> Result<Vec<Row>> {
        self.run(sql, params, |driver, prepared, params| {
            driver.query(prepared, params)
        })
    }

    fn run_execute(&mut self, sql: &Arc<str>, params: &Params) -> Result<u64> {
        self.run(sql, params, |driver, prepared, params| {
            driver.execute(prepared, params)
        })
    }

    fn run<T>(
        &mut self,
        sql: &Arc<str>,
        params: &Params,
        f: impl FnOnce(&mut D, &mut D::Prepared, &Params) -> Result<T>,
    ) -> Result<T> {
        let dialect = &self.dialect;
        let expanded = expand_arrays_with(sql, params, |out, element| {
            dialect.write_empty_list(out, element)
        })?;
        let (sql, params): (Arc<str>, Cow<'_, Params>) = match expanded {
            Some((sql, params)) => (sql.into(), Cow::Owned(params)),
            None => (sql.clone(), Cow::Borrowed(params)),
        };
        let start = Instant::now();
        if !self.prepared.contains_key(&sql) {
            self.make_room();
        }
        let prepared = match self.prepared.entry(sql.clone()) {
            Entry::Occupied(v) => v.into_mut(),
            Entry::Vacant(v) => {
                let prepared = self.driver.prepare(&sql).map_err(|e| failed(e, &sql))?;
                self.prepared_order.push_back(sql.clone());
                v.insert(prepared)
            }
        };
        let result = f(&mut self.driver, prepared, &*params).map_err(|e| failed(e, &sql))?;
        let duration = start.elapsed();
        log::debug!("{} executed in {:?}: {}", D::NAME, duration, truncate_long!(sql));
        self.log.push(LogEntry {
            sql,
            params: params.into_owned(),
            duration,
        });
        Ok(result)
    }

    pub fn fetch(&mut self, query: &Query, params: &Params) -> Result<Vec<Row>> {
        self.execute(query, params)?
            .into_rows()
            .ok_or_else(|| unexpected(query, "rows"))
    }

    pub fn upsert(&mut self, query: &Query, params: &Params) -> Result<UpsertOutcome> {
        self.execute(query, params)?
            .upserted()
            .ok_or_else(|| unexpected(query, "an upsert outcome"))
    }

    fn exists(&mut self, query: Query) -> Result<bool> {
        self.execute(&query, &Params::new())?
            .exists()
            .ok_or_else(|| unexpected(&query, "an existence flag"))
    }

    fn schema(&mut self, query: Query) -> Result<Outcome> {
        self.execute(&query, &Params::new())?
            .into_outcome()
            .ok_or_else(|| unexpected(&query, "an outcome"))
    }

    pub fn table_exists(&mut self, table: impl Into<Name>) -> Result<bool> {
        self.exists(Query::table_exists(table))
    }

    pub fn field_exists(&mut self, table: impl Into<Name>, field: impl Into<Name>) -> Result<bool> {
        self.exists(Query::field_exists(table, field))
    }

    /// `index` is the name local to the table.
    pub fn index_exists(&mut self, table: impl Into<Name>, index: impl Into<Name>) -> Result<bool> {
        self.exists(Query::index_exists(table, index))
    }

    pub fn add_index(&mut self, table: impl Into<Name>, index: IndexDef) -> Result<Outcome> {
        self.schema(Query::add_index(table, index))
    }

    pub fn drop_index(&mut self, table: impl Into<Name>, index: impl Into<Name>) -> Result<Outcome> {
        self.schema(Query::drop_index(table, index))
    }

    /// Remove every row, sequences are reset where the engine supports it.
    pub fn truncate(&mut self, table: impl Into<Name>) -> Result<Outcome> {
        self.schema(Query::truncate(table))
    }

    /// Redefine the field `column.name`, keeping its data.
    pub fn alter_field(&mut self, table: impl Into<Name>, column: ColumnDef) -> Result<Outcome> {
        self.schema(Query::alter_field(table, column))
    }

    pub fn table_info(&mut self, table: impl Into<Name>) -> Result<TableInfo> {
        let query = Query::table_info(table);
        self.execute(&query, &Params::new())?
            .into_table_info()
            .ok_or_else(|| unexpected(&query, "a table description"))
    }

    pub fn create_table(&mut self, table: CreateTable) -> Result<()> {
        self.execute(&table.into(), &Params::new()).map(|_| ())
    }

    pub fn drop_table(&mut self, table: impl Into<Name>, if_exists: bool) -> Result<()> {
        self.execute(&Query::drop_table(table, if_exists), &Params::new())
            .map(|_| ())
    }

    /// Quote `value` as a string literal.
    ///
    /// Drivers without native quoting fall back to wrapping the value in single
    /// quotes and doubling the inner ones, which is not safe for untrusted input
    /// on engines treating the backslash as an escape character.
    pub fn quote(&self, value: &str) -> String {
        self.driver
            .quote(value)
            .unwrap_or_else(|| format!("'{}'", value.replace('\'', "''")))
    }

    pub fn begin(&mut self) -> Outcome {
        self.transaction_step("begin", D::begin)
    }
    pub fn commit(&mut self) -> Outcome {
        self.transaction_step("commit", D::commit)
    }
    pub fn rollback(&mut self) -> Outcome {
        self.transaction_step("rollback", D::rollback)
    }
    pub fn in_transaction(&self) -> bool {
        self.driver.in_transaction()
    }

    fn transaction_step(&mut self, action: &str, f: fn(&mut D) -> Result<()>) -> Outcome {
        let result = f(&mut self.driver);
        if let Err(e) = &result {
            log::error!("Cannot {} the transaction on {}: {}", action, D::NAME, e);
        }
        result.into()
    }

    /// Run `f` inside a transaction, committed if it succeeds and rolled back otherwise.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.begin().into_result()?;
        match f(self) {
            Ok(v) => {
                self.commit().into_result()?;
                Ok(v)
            }
            Err(e) => {
                let _ = self.rollback();
                Err(e)
            }
        }
    }

    pub fn last_insert_id(&mut self) -> Result<String> {
        self.driver.last_insert_id()
    }

    /// Copy of the execution log, oldest first.
    pub fn fetch_log(&self) -> Vec<LogEntry> {
        self.log.entries().iter().cloned().collect()
    }
    pub fn clear_log(&mut self) {
        self.log.clear();
    }
    pub fn take_log(&mut self) -> Vec<LogEntry> {
        self.log.take()
    }
    pub fn execution_log(&self) -> &ExecutionLog {
        &self.log
    }
}
