use crate::select_all;
use quarry::{
    ColumnDef, ColumnType, Connection, CreateTable, Driver, IndexDef, InsertOrUpdate, Outcome,
    Query, params,
};

const TABLE: &str = "quarry_indices";

pub fn indices<D: Driver>(connection: &mut Connection<D>) {
    connection
        .drop_table(TABLE, true)
        .expect("Failed to drop the quarry_indices table");
    connection
        .create_table(
            CreateTable::new(TABLE)
                .column(ColumnDef::new("id", ColumnType::Serial))
                .column(ColumnDef::new("email", ColumnType::Varchar(128)).not_null())
                .primary_key(["id"]),
        )
        .expect("Failed to create the quarry_indices table");

    assert!(!connection.index_exists(TABLE, "by_email").expect("Index probe failed"));
    let outcome = connection
        .add_index(TABLE, IndexDef::new("by_email", ["email"]).unique())
        .expect("Failed to add the index");
    assert!(outcome.is_success(), "{:?}", outcome);
    assert!(connection.index_exists(TABLE, "by_email").expect("Index probe failed"));

    // Creating it twice is reported, not raised
    let outcome = connection
        .add_index(TABLE, IndexDef::new("by_email", ["email"]).unique())
        .expect("A duplicate index is not an error");
    assert!(matches!(outcome, Outcome::Failure(..)));

    let insert = Query::new(InsertOrUpdate::insert(TABLE, ["email"]));
    connection
        .execute(&insert, &params! { "email" => "one@example.com" })
        .expect("Failed to insert");
    crate::silent_logs! {
        assert!(
            connection
                .execute(&insert, &params! { "email" => "one@example.com" })
                .is_err(),
            "The unique index should reject the duplicate"
        );
    }
    connection
        .execute(&insert, &params! { "email" => "two@example.com" })
        .expect("Failed to insert");

    let outcome = connection
        .drop_index(TABLE, "by_email")
        .expect("Failed to drop the index");
    assert!(outcome.is_success(), "{:?}", outcome);
    assert!(!connection.index_exists(TABLE, "by_email").expect("Index probe failed"));
    let outcome = connection
        .drop_index(TABLE, "by_email")
        .expect("A missing index is not an error");
    assert!(outcome.cause().is_some());

    let outcome = connection.truncate(TABLE).expect("Failed to truncate");
    assert!(outcome.is_success(), "{:?}", outcome);
    assert!(select_all(connection, TABLE).is_empty());

    connection
        .drop_table(TABLE, false)
        .expect("Failed to drop the quarry_indices table");
}
