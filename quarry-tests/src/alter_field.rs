use crate::{ids, select_all};
use quarry::{
    ColumnDef, ColumnType, Connection, CreateTable, Driver, InsertOrUpdate, Outcome, Query,
    params,
};

const TABLE: &str = "quarry_alter_field";

pub fn alter_field<D: Driver>(connection: &mut Connection<D>) {
    connection
        .drop_table(TABLE, true)
        .expect("Failed to drop the quarry_alter_field table");
    connection
        .create_table(
            CreateTable::new(TABLE)
                .column(ColumnDef::new("id", ColumnType::Int32).not_null())
                .column(ColumnDef::new("score", ColumnType::Int32))
                .primary_key(["id"]),
        )
        .expect("Failed to create the quarry_alter_field table");
    let insert = Query::new(InsertOrUpdate::insert(TABLE, ["id", "score"]));
    for (id, score) in [(1, 7), (2, 11)] {
        connection
            .execute(&insert, &params! { "id" => id, "score" => score })
            .expect("Failed to insert");
    }
    assert!(
        connection
            .table_info(TABLE)
            .expect("Failed to describe the table")
            .column("score")
            .expect("score")
            .allow_null
    );

    let outcome = connection
        .alter_field(
            TABLE,
            ColumnDef::new("score", ColumnType::Int64)
                .not_null()
                .default_value(0i64),
        )
        .expect("Failed to alter score");
    assert!(outcome.is_success(), "{:?}", outcome);

    let rows = select_all(connection, TABLE);
    assert_eq!(ids(&rows), [1, 2]);
    assert_eq!(rows[0].get_as::<i64>("score").expect("score"), 7);
    assert_eq!(rows[1].get_as::<i64>("score").expect("score"), 11);
    let info = connection
        .table_info(TABLE)
        .expect("Failed to describe the table");
    assert_eq!(
        info.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        ["id", "score"]
    );
    assert!(!info.column("score").expect("score").allow_null);
    assert_eq!(info.primary_key, ["id"]);

    // Statements prepared before the change are discarded
    connection
        .execute(&insert, &params! { "id" => 3, "score" => 13 })
        .expect("Failed to insert after the change");
    assert_eq!(ids(&select_all(connection, TABLE)), [1, 2, 3]);

    let outcome = connection
        .alter_field(TABLE, ColumnDef::new("missing", ColumnType::Int32))
        .expect("Altering a missing field is not an error");
    assert!(matches!(outcome, Outcome::Failure(..)));
    assert!(!connection.in_transaction());

    connection
        .drop_table(TABLE, false)
        .expect("Failed to drop the quarry_alter_field table");
}
