use crate::{ids, select_all};
use quarry::{
    ColumnDef, ColumnType, CompareOp, Condition, Connection, CreateTable, Delete, Driver,
    InsertOrUpdate, Order, Params, Query, Select, params,
};

const TABLE: &str = "quarry_simple";

pub fn simple<D: Driver>(connection: &mut Connection<D>) {
    connection
        .drop_table(TABLE, true)
        .expect("Failed to drop the quarry_simple table");
    assert!(!connection.table_exists(TABLE).expect("Table probe failed"));
    connection
        .create_table(
            CreateTable::new(TABLE)
                .column(ColumnDef::new("id", ColumnType::Serial))
                .column(ColumnDef::new("name", ColumnType::Varchar(64)).not_null())
                .column(ColumnDef::new("score", ColumnType::Int32))
                .primary_key(["id"]),
        )
        .expect("Failed to create the quarry_simple table");
    assert!(connection.table_exists(TABLE).expect("Table probe failed"));
    assert!(connection.field_exists(TABLE, "score").expect("Field probe failed"));
    assert!(!connection.field_exists(TABLE, "missing").expect("Field probe failed"));

    // Compiled once, executed three times
    let insert = Query::new(InsertOrUpdate::insert(TABLE, ["name", "score"]));
    for (name, score) in [("alpha", 10), ("beta", 20), ("zeta", 30)] {
        let affected = connection
            .execute(&insert, &params! { "name" => name, "score" => score })
            .expect("Failed to insert a row")
            .affected();
        assert_eq!(affected, Some(1));
    }
    assert!(insert.is_compiled());
    assert_eq!(
        connection.last_insert_id().expect("Failed to read the last id"),
        "3"
    );

    let rows = select_all(connection, TABLE);
    assert_eq!(ids(&rows), [1, 2, 3]);
    assert_eq!(rows[1].get_as::<String>("name").expect("name"), "beta");
    assert_eq!(rows[2].get_as::<i32>("score").expect("score"), 30);

    let at_least = Query::new(
        Select::new(TABLE)
            .fields(["id", "name"])
            .filter(Condition::compare("score", CompareOp::GreaterEqual, "min"))
            .order_by("score", Order::Desc),
    );
    let rows = connection
        .fetch(&at_least, &params! { "min" => 20 })
        .expect("Failed to filter by score");
    assert_eq!(ids(&rows), [3, 2]);
    assert_eq!(rows[0].labels(), ["id", "name"]);

    let update = Query::new(InsertOrUpdate::update(
        TABLE,
        ["score"],
        Condition::eq("name"),
    ));
    let affected = connection
        .execute(&update, &params! { "score" => 25, "name" => "beta" })
        .expect("Failed to update")
        .affected();
    assert_eq!(affected, Some(1));
    let rows = connection
        .fetch(&at_least, &params! { "min" => 21 })
        .expect("Failed to filter by score");
    assert_eq!(ids(&rows), [3, 2]);

    let like = Query::new(Select::new(TABLE).filter(Condition::like("name", "pattern")));
    let rows = connection
        .fetch(&like, &params! { "pattern" => "%eta" })
        .expect("Failed to filter with LIKE");
    let mut found = ids(&rows);
    found.sort();
    assert_eq!(found, [2, 3]);

    let delete = Query::new(Delete {
        table: TABLE.into(),
        condition: Some(Condition::eq("id")),
    });
    let affected = connection
        .execute(&delete, &params! { "id" => 1 })
        .expect("Failed to delete")
        .affected();
    assert_eq!(affected, Some(1));
    assert_eq!(ids(&select_all(connection, TABLE)), [2, 3]);

    connection
        .execute(&insert, &params! { "name" => "nothing", "score" => None::<i32> })
        .expect("Failed to insert a null score");
    let rows = connection
        .fetch(
            &Query::new(Select::new(TABLE).filter(Condition::IsNull("score".into()))),
            &Params::new(),
        )
        .expect("Failed to filter null scores");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_as::<Option<i32>>("score").expect("score"), None);
    assert_eq!(rows[0].get_as::<String>("name").expect("name"), "nothing");

    // Quoted literals survive the round trip
    let tricky = "it's a \"quoted\" value";
    let quoted = connection.quote(tricky);
    let rows = connection
        .fetch(
            &Query::raw_select(format!("SELECT {} AS v", quoted)),
            &Params::new(),
        )
        .expect("Failed to select a quoted literal");
    assert_eq!(rows[0].get_as::<String>("v").expect("v"), tricky);

    // Statements prepared before a raw schema change are not reused
    assert_eq!(select_all(connection, TABLE)[0].len(), 3);
    connection
        .execute(
            &Query::raw(format!("ALTER TABLE {} ADD COLUMN note VARCHAR(20)", TABLE)),
            &Params::new(),
        )
        .expect("Failed to add a column with raw SQL");
    let rows = select_all(connection, TABLE);
    assert_eq!(rows[0].labels(), ["id", "name", "score", "note"]);
    assert_eq!(rows[0].get_as::<Option<String>>("note").expect("note"), None);

    connection
        .drop_table(TABLE, false)
        .expect("Failed to drop the quarry_simple table");
    assert!(!connection.table_exists(TABLE).expect("Table probe failed"));
}
