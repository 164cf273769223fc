#[cfg(test)]
mod tests {
    use quarry_core::{
        ColumnDef, ColumnType, Condition, ConnectOptions, Connection, Dialect, DialectKind,
        Driver, Error, IndexDef, Params, Prepared, Query, QueryResult, Result, Row, Select,
        Upsert, UpsertOutcome, Value, params, placeholders,
    };
    use std::{cell::RefCell, fmt, rc::Rc, sync::Arc};

    /// Observable state shared between a test and its driver.
    #[derive(Default)]
    struct Script {
        prepared: Vec<String>,
        executed: Vec<(String, Vec<(String, Value)>)>,
        /// Statements containing this text fail.
        fail_on: Option<&'static str>,
        /// Affected rows reported by statements starting with `INSERT`.
        inserted: u64,
        rows: Vec<Row>,
        charset_fails: bool,
        transaction: bool,
        events: Vec<&'static str>,
    }

    struct MockPrepared {
        sql: String,
        names: Vec<String>,
    }

    impl fmt::Display for MockPrepared {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.sql)
        }
    }

    impl Prepared for MockPrepared {
        fn parameter_names(&self) -> &[String] {
            &self.names
        }
    }

    struct MockDriver {
        script: Rc<RefCell<Script>>,
    }

    impl MockDriver {
        fn record(&mut self, prepared: &MockPrepared, params: &Params) -> Result<()> {
            let mut script = self.script.borrow_mut();
            if let Some(fail) = script.fail_on {
                if prepared.sql.contains(fail) {
                    return Err(Error::driver(format!("mock failure near `{}`", fail)));
                }
            }
            let bound: Vec<(String, Value)> = prepared
                .names
                .iter()
                .map(|name| {
                    params
                        .get(name)
                        .cloned()
                        .map(|v| (name.clone(), v))
                        .ok_or_else(|| Error::Parameter(format!("`{}` is not bound", name)))
                })
                .collect::<Result<_>>()?;
            script.executed.push((prepared.sql.clone(), bound));
            Ok(())
        }
    }

    impl Driver for MockDriver {
        type Prepared = MockPrepared;
        const NAME: &'static str = "mock";
        const DIALECT: DialectKind = DialectKind::Sqlite;

        fn connect(dsn: &str, _options: &ConnectOptions) -> Result<Self> {
            if !dsn.starts_with("mock://") {
                return Err(Error::Configuration(format!("Unsupported dsn `{}`", dsn)));
            }
            Ok(Self {
                script: Default::default(),
            })
        }

        fn prepare(&mut self, sql: &str) -> Result<Self::Prepared> {
            self.script.borrow_mut().prepared.push(sql.into());
            Ok(MockPrepared {
                sql: sql.into(),
                names: placeholders(sql)
                    .into_iter()
                    .map(|v| v.name.to_string())
                    .collect(),
            })
        }

        fn query(&mut self, prepared: &mut Self::Prepared, params: &Params) -> Result<Vec<Row>> {
            self.record(prepared, params)?;
            Ok(self.script.borrow().rows.clone())
        }

        fn execute(&mut self, prepared: &mut Self::Prepared, params: &Params) -> Result<u64> {
            self.record(prepared, params)?;
            Ok(if prepared.sql.starts_with("INSERT") {
                self.script.borrow().inserted
            } else {
                1
            })
        }

        fn set_charset(&mut self, _charset: &str) -> Result<()> {
            if self.script.borrow().charset_fails {
                return Err(Error::driver("unknown character set"));
            }
            Ok(())
        }

        fn begin(&mut self) -> Result<()> {
            let mut script = self.script.borrow_mut();
            script.transaction = true;
            script.events.push("begin");
            Ok(())
        }

        fn commit(&mut self) -> Result<()> {
            let mut script = self.script.borrow_mut();
            script.transaction = false;
            script.events.push("commit");
            Ok(())
        }

        fn rollback(&mut self) -> Result<()> {
            let mut script = self.script.borrow_mut();
            script.transaction = false;
            script.events.push("rollback");
            Ok(())
        }

        fn in_transaction(&self) -> bool {
            self.script.borrow().transaction
        }

        fn last_insert_id(&mut self) -> Result<String> {
            Ok("42".into())
        }
    }

    fn connect(kind: DialectKind, options: ConnectOptions) -> (Connection<MockDriver>, Rc<RefCell<Script>>) {
        let script = Rc::new(RefCell::new(Script::default()));
        let driver = MockDriver {
            script: script.clone(),
        };
        let dialect = Dialect::new(kind).with_table_prefix(options.table_prefix.as_str());
        (Connection::with_driver(driver, dialect, &options), script)
    }

    #[test]
    fn open_resolves_the_dialect() {
        let connection = Connection::<MockDriver>::open("mock://db", ConnectOptions::new()).unwrap();
        assert_eq!(connection.dialect().kind(), DialectKind::Sqlite);
        assert_eq!(connection.charset(), "utf8");
        let connection = Connection::<MockDriver>::open(
            "mock://db",
            ConnectOptions::new().flag("dialect", "PostgreSQL"),
        )
        .unwrap();
        assert_eq!(connection.dialect().kind(), DialectKind::Postgres);
        let connection = Connection::<MockDriver>::open(
            "mock://db",
            ConnectOptions::new()
                .flag("dialect", "postgres")
                .dialect(DialectKind::MySql)
                .table_prefix("app_"),
        )
        .unwrap();
        assert_eq!(connection.dialect().kind(), DialectKind::MySql);
        assert_eq!(connection.dialect().table_prefix(), "app_");
        assert!(matches!(
            Connection::<MockDriver>::open("mock://db", ConnectOptions::new().flag("dialect", "db2")),
            Err(Error::Configuration(..))
        ));
        assert!(matches!(
            Connection::<MockDriver>::open("other://db", ConnectOptions::new()),
            Err(Error::Configuration(..))
        ));
    }

    #[test]
    fn charset_failure_is_not_fatal() {
        let script = Rc::new(RefCell::new(Script {
            charset_fails: true,
            ..Default::default()
        }));
        let driver = MockDriver {
            script: script.clone(),
        };
        let mut connection = Connection::with_driver(
            driver,
            DialectKind::Sqlite.into(),
            &ConnectOptions::new().charset("klingon"),
        );
        assert_eq!(connection.charset(), "klingon");
        assert!(connection.table_exists("t").is_ok());
    }

    #[test]
    fn compiled_once_prepared_once() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        let query = Query::new(Select::new("users").filter(Condition::eq("id")));
        for id in 0..3 {
            connection.fetch(&query, &params! { "id" => id }).unwrap();
        }
        assert!(query.is_compiled());
        let script = script.borrow();
        assert_eq!(script.prepared.len(), 1);
        assert_eq!(script.executed.len(), 3);
        assert_eq!(
            script.executed[2].1,
            [("id".to_string(), Value::Int32(Some(2)))]
        );
        assert_eq!(connection.prepared_count(), 1);
    }

    #[test]
    fn identical_sql_shares_the_prepared_statement() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        let first = Query::new(Select::new("users"));
        let second = Query::new(Select::new("users"));
        connection.fetch(&first, &Params::new()).unwrap();
        connection.fetch(&second, &Params::new()).unwrap();
        assert_eq!(script.borrow().prepared.len(), 1);
    }

    #[test]
    fn schema_changes_clear_the_prepared_cache() {
        let (mut connection, _script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        connection
            .fetch(&Query::new(Select::new("users")), &Params::new())
            .unwrap();
        assert_eq!(connection.prepared_count(), 1);
        connection
            .create_table(
                quarry_core::CreateTable::new("t").column(ColumnDef::new("a", ColumnType::Int32)),
            )
            .unwrap();
        assert_eq!(connection.prepared_count(), 0);
    }

    #[test]
    fn raw_statements_clear_the_prepared_cache() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        let select = Query::new(Select::new("users"));
        connection.fetch(&select, &Params::new()).unwrap();
        connection
            .fetch(&Query::raw_select("SELECT 1"), &Params::new())
            .unwrap();
        assert_eq!(connection.prepared_count(), 2);
        connection
            .execute(
                &Query::raw("ALTER TABLE users ADD COLUMN note TEXT"),
                &Params::new(),
            )
            .unwrap();
        assert_eq!(connection.prepared_count(), 0);
        connection.fetch(&select, &Params::new()).unwrap();
        assert_eq!(script.borrow().prepared.len(), 4);
    }

    #[test]
    fn prepared_cache_is_bounded() {
        let (mut connection, script) = connect(
            DialectKind::Sqlite,
            ConnectOptions::new().prepared_capacity(Some(2)),
        );
        let query = Query::new(Select::new("users").filter(Condition::is_in("id", "ids")));
        for len in 1..=50i64 {
            connection
                .fetch(&query, &params! { "ids" => (0..len).collect::<Vec<_>>() })
                .unwrap();
            assert!(connection.prepared_count() <= 2);
        }
        assert_eq!(connection.prepared_count(), 2);
        assert_eq!(script.borrow().prepared.len(), 50);

        // The most recent statements are still cached
        connection
            .fetch(&query, &params! { "ids" => (0..49i64).collect::<Vec<_>>() })
            .unwrap();
        assert_eq!(script.borrow().prepared.len(), 50);
        connection
            .fetch(&query, &params! { "ids" => vec![1i64] })
            .unwrap();
        assert_eq!(script.borrow().prepared.len(), 51);
        assert_eq!(connection.prepared_count(), 2);

        let (mut connection, _script) = connect(
            DialectKind::Sqlite,
            ConnectOptions::new().prepared_capacity(None),
        );
        for table in ["a", "b", "c", "d"] {
            connection
                .fetch(&Query::new(Select::new(table)), &Params::new())
                .unwrap();
        }
        assert_eq!(connection.prepared_count(), 4);
    }

    #[test]
    fn empty_raw_is_a_no_op() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        let result = connection.execute(&Query::raw(" \n "), &Params::new()).unwrap();
        assert!(matches!(result, QueryResult::Affected(0)));
        assert!(script.borrow().prepared.is_empty());
    }

    #[test]
    fn upsert_reports_insert_or_update() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        let query = Query::new(Upsert::new("users", ["id"], ["name"]));
        let params = params! { "id" => 1, "name" => "a" };
        script.borrow_mut().inserted = 1;
        assert_eq!(connection.upsert(&query, &params).unwrap(), UpsertOutcome::Inserted);
        script.borrow_mut().inserted = 0;
        assert_eq!(connection.upsert(&query, &params).unwrap(), UpsertOutcome::Updated);
        assert_eq!(UpsertOutcome::Inserted.code(), 1);
        assert_eq!(UpsertOutcome::Updated.code(), 2);
        let script = script.borrow();
        assert_eq!(script.executed.len(), 4);
        assert!(script.executed[0].0.starts_with("UPDATE"));
        assert!(script.executed[1].0.starts_with("INSERT"));
        assert_eq!(
            script.executed[1].1.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            ["id", "name", "id"]
        );
    }

    #[test]
    fn arrays_are_expanded_before_preparing() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        let query = Query::new(Select::new("users").filter(Condition::is_in("id", "ids")));
        connection
            .fetch(&query, &params! { "ids" => vec![1i64, 2] })
            .unwrap();
        connection
            .fetch(&query, &params! { "ids" => vec![3i64, 4, 5] })
            .unwrap();
        let script = script.borrow();
        assert_eq!(script.prepared.len(), 2);
        assert!(script.prepared[0].contains("IN (:ids0, :ids1)"));
        assert!(script.prepared[1].contains("IN (:ids0, :ids1, :ids2)"));
        assert_eq!(script.executed[1].1[2], ("ids2".to_string(), Value::Int64(Some(5))));
    }

    #[test]
    fn existence_probes() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        assert!(!connection.table_exists("users").unwrap());
        let labels: Arc<[String]> = vec!["1".to_string()].into();
        script.borrow_mut().rows = vec![Row::new(labels, vec![Value::Int64(Some(1))])];
        assert!(connection.field_exists("users", "email").unwrap());
        assert!(connection.index_exists("users", "by_email").unwrap());
    }

    #[test]
    fn driver_errors_carry_the_statement() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        script.borrow_mut().fail_on = Some("users");
        let error = connection
            .fetch(&Query::new(Select::new("users")), &Params::new())
            .unwrap_err();
        match error {
            Error::Driver { message, sql } => {
                assert!(message.contains("mock failure"));
                assert_eq!(sql.as_deref(), Some("SELECT *\nFROM \"users\";"));
            }
            other => panic!("Unexpected error {:?}", other),
        }
        assert!(connection.fetch_log().is_empty());
    }

    #[test]
    fn missing_parameters_are_errors() {
        let (mut connection, _script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        let query = Query::new(Select::new("users").filter(Condition::eq("id")));
        assert!(matches!(
            connection.fetch(&query, &Params::new()),
            Err(Error::Parameter(..))
        ));
    }

    #[test]
    fn soft_failures_are_outcomes() {
        let (mut connection, script) = connect(DialectKind::MySql, ConnectOptions::new());
        script.borrow_mut().fail_on = Some("INDEX");
        let outcome = connection
            .add_index("users", IndexDef::new("by_email", ["email"]))
            .unwrap();
        assert!(!outcome.is_success());
        assert!(outcome.cause().is_some_and(Error::is_driver));
        assert!(!connection.drop_index("users", "by_email").unwrap().is_success());
        assert!(connection.truncate("users").unwrap().is_success());
        script.borrow_mut().fail_on = None;
        assert!(connection.add_index("users", IndexDef::new("by_email", ["email"])).unwrap().is_success());
    }

    #[test]
    fn emulated_alter_field_is_transactional() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        script.borrow_mut().fail_on = Some("DROP COLUMN");
        let outcome = connection
            .alter_field("users", ColumnDef::new("score", ColumnType::Int64))
            .unwrap();
        assert!(!outcome.is_success());
        let script = script.borrow();
        assert_eq!(script.events, ["begin", "rollback"]);
        assert_eq!(script.executed.len(), 2);
    }

    #[test]
    fn emulated_alter_field_names_the_failed_step() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        connection.begin().into_result().unwrap();
        script.borrow_mut().fail_on = Some("RENAME COLUMN");
        let outcome = connection
            .alter_field("users", ColumnDef::new("score", ColumnType::Int64))
            .unwrap();
        let cause = outcome.cause().map(ToString::to_string).unwrap_or_default();
        assert!(cause.starts_with("Step 4 of 4 failed:"), "{}", cause);
        assert_eq!(script.borrow().events, ["begin"]);
        assert!(connection.in_transaction());
    }

    #[test]
    fn alter_field_success() {
        let (mut connection, script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        let outcome = connection
            .alter_field("users", ColumnDef::new("score", ColumnType::Int64))
            .unwrap();
        assert!(outcome.is_success());
        let script = script.borrow();
        assert_eq!(script.events, ["begin", "commit"]);
        assert_eq!(script.executed.len(), 4);
    }

    #[test]
    fn table_info_uses_the_index_namespace() {
        let (mut connection, script) = connect(
            DialectKind::Sqlite,
            ConnectOptions::new().table_prefix("app_"),
        );
        let labels: Arc<[String]> = [
            "name", "type", "default", "allow_null", "pk", "index_name", "is_unique",
            "is_primary", "column_name", "seqno",
        ]
        .iter()
        .map(|v| v.to_string())
        .collect();
        script.borrow_mut().rows = vec![Row::new(
            labels,
            vec![
                "email".into(),
                "TEXT".into(),
                Value::Null,
                true.into(),
                0i64.into(),
                "app_users_by_email".into(),
                true.into(),
                false.into(),
                "email".into(),
                0i64.into(),
            ],
        )];
        let info = connection.table_info("users").unwrap();
        assert_eq!(info.columns.len(), 1);
        assert!(info.indices.contains_key("by_email"));
        assert_eq!(info.unique, [vec!["email".to_string()]]);
        assert!(script.borrow().executed[0].0.contains("pragma_table_info('app_users')"));
    }

    #[test]
    fn transactions() {
        let (mut connection, script) = connect(DialectKind::Postgres, ConnectOptions::new());
        let result: Result<()> = connection.transaction(|connection| {
            assert!(connection.in_transaction());
            Err(Error::driver("boom"))
        });
        assert!(result.is_err());
        let value = connection.transaction(|connection| connection.last_insert_id());
        assert_eq!(value.unwrap(), "42");
        assert_eq!(script.borrow().events, ["begin", "rollback", "begin", "commit"]);
        assert!(!connection.in_transaction());
    }

    #[test]
    fn quote_falls_back_to_doubling() {
        let (connection, _script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        assert_eq!(connection.quote("it's"), "'it''s'");
    }

    #[test]
    fn bounded_execution_log() {
        let (mut connection, _script) = connect(
            DialectKind::Sqlite,
            ConnectOptions::new().log_capacity(Some(2)),
        );
        for table in ["a", "b", "c"] {
            connection
                .fetch(&Query::new(Select::new(table)), &Params::new())
                .unwrap();
        }
        let log = connection.fetch_log();
        assert_eq!(log.len(), 2);
        assert!(log[0].sql.contains("\"b\""));
        assert!(log[1].sql.contains("\"c\""));
        assert_eq!(connection.take_log().len(), 2);
        assert!(connection.execution_log().is_empty());

        let (mut connection, _script) = connect(
            DialectKind::Sqlite,
            ConnectOptions::new().log_capacity(Some(0)),
        );
        connection
            .fetch(&Query::new(Select::new("a")), &Params::new())
            .unwrap();
        assert!(connection.fetch_log().is_empty());
    }

    #[test]
    fn log_keeps_the_parameters() {
        let (mut connection, _script) = connect(DialectKind::Sqlite, ConnectOptions::new());
        let query = Query::new(Select::new("users").filter(Condition::eq("id")));
        connection.fetch(&query, &params! { "id" => 7 }).unwrap();
        let log = connection.fetch_log();
        assert_eq!(log[0].params.get("id"), Some(&Value::Int32(Some(7))));
        connection.clear_log();
        assert!(connection.fetch_log().is_empty());
    }
}
