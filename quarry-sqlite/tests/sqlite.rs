#[cfg(test)]
mod tests {
    use quarry_core::{
        ColumnDef, ColumnType, ConnectOptions, CreateTable, Params, Query, Select, Upsert,
        params,
    };
    use quarry_sqlite::SqliteConnection;
    use quarry_tests::{execute_tests, init_logs};
    use std::thread;

    #[test]
    fn sqlite() {
        init_logs();
        let directory = tempfile::tempdir().expect("Failed to create a temporary directory");
        let path = directory.path().join("tests.sqlite");
        let connection = SqliteConnection::open(
            &format!("sqlite://{}", path.display()),
            ConnectOptions::new(),
        )
        .expect("Could not open the database");
        assert!(path.exists(), "Database file should be created");
        execute_tests(connection);
    }

    #[test]
    fn memory() {
        init_logs();
        execute_tests(
            SqliteConnection::open("sqlite://:memory:", ConnectOptions::new())
                .expect("Could not open an in memory database"),
        );
    }

    #[test]
    fn concurrent_upserts() {
        init_logs();
        const THREADS: usize = 8;
        let directory = tempfile::tempdir().expect("Failed to create a temporary directory");
        let dsn = format!("sqlite://{}", directory.path().join("upserts.sqlite").display());
        let mut connection =
            SqliteConnection::open(&dsn, ConnectOptions::new()).expect("Could not open");
        connection
            .create_table(
                CreateTable::new("counters")
                    .column(ColumnDef::new("name", ColumnType::Varchar(32)).not_null())
                    .column(ColumnDef::new("owner", ColumnType::Int64))
                    .primary_key(["name"]),
            )
            .expect("Failed to create the counters table");

        let handles = (0..THREADS)
            .map(|owner| {
                let dsn = dsn.clone();
                thread::spawn(move || {
                    let mut connection = SqliteConnection::open(&dsn, ConnectOptions::new())
                        .expect("Could not open");
                    let query = Query::new(Upsert::new("counters", ["name"], ["owner"]));
                    connection
                        .transaction(|connection| {
                            connection.upsert(
                                &query,
                                &params! { "name" => "shared", "owner" => owner as i64 },
                            )
                        })
                        .expect("Failed to upsert concurrently")
                })
            })
            .collect::<Vec<_>>();
        let outcomes = handles
            .into_iter()
            .map(|h| h.join().expect("Upsert thread panicked"))
            .collect::<Vec<_>>();
        assert_eq!(
            outcomes.iter().filter(|v| v.code() == 1).count(),
            1,
            "Exactly one thread inserts: {:?}",
            outcomes
        );

        let rows = connection
            .fetch(&Query::new(Select::new("counters")), &Params::new())
            .expect("Failed to read the counters");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_as::<String>("name").expect("name"), "shared");
    }

    #[test]
    fn busy_timeout_flag() {
        init_logs();
        assert!(
            SqliteConnection::open(
                "sqlite://:memory:",
                ConnectOptions::new().flag("busy_timeout", "soon"),
            )
            .is_err(),
            "A busy timeout must be a number"
        );
        SqliteConnection::open(
            "sqlite://:memory:",
            ConnectOptions::new().flag("busy_timeout", 100),
        )
        .expect("Could not open with a custom busy timeout");
    }
}
