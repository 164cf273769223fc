use crate::{ids, select_all};
use quarry::{
    ColumnDef, ColumnType, Connection, CreateTable, Driver, Query, Upsert, UpsertOutcome, params,
};

const TABLE: &str = "quarry_upsert";

pub fn upsert<D: Driver>(connection: &mut Connection<D>) {
    connection
        .drop_table(TABLE, true)
        .expect("Failed to drop the quarry_upsert table");
    connection
        .create_table(
            CreateTable::new(TABLE)
                .column(ColumnDef::new("id", ColumnType::Int64).not_null())
                .column(ColumnDef::new("name", ColumnType::Varchar(64)))
                .column(ColumnDef::new("hits", ColumnType::Int32).not_null().default_value(0))
                .primary_key(["id"]),
        )
        .expect("Failed to create the quarry_upsert table");

    let query = Query::new(Upsert::new(TABLE, ["id"], ["name", "hits"]));
    let outcome = connection
        .upsert(&query, &params! { "id" => 1i64, "name" => "first", "hits" => 1 })
        .expect("Failed to upsert a new row");
    assert_eq!(outcome, UpsertOutcome::Inserted);
    assert_eq!(outcome.code(), 1);

    let outcome = connection
        .upsert(&query, &params! { "id" => 1i64, "name" => "renamed", "hits" => 2 })
        .expect("Failed to upsert an existing row");
    assert_eq!(outcome, UpsertOutcome::Updated);
    assert_eq!(outcome.code(), 2);

    let outcome = connection
        .upsert(&query, &params! { "id" => 2i64, "name" => "second", "hits" => 1 })
        .expect("Failed to upsert a new row");
    assert_eq!(outcome, UpsertOutcome::Inserted);

    let rows = select_all(connection, TABLE);
    assert_eq!(ids(&rows), [1, 2]);
    assert_eq!(rows[0].get_as::<String>("name").expect("name"), "renamed");
    assert_eq!(rows[0].get_as::<i32>("hits").expect("hits"), 2);
    assert_eq!(rows[1].get_as::<String>("name").expect("name"), "second");

    connection
        .drop_table(TABLE, false)
        .expect("Failed to drop the quarry_upsert table");
}
