use crate::{ids, select_all};
use quarry::{
    ColumnDef, ColumnType, Connection, CreateTable, Driver, Error, InsertOrUpdate, Query, params,
};

const TABLE: &str = "quarry_transactions";

pub fn transactions<D: Driver>(connection: &mut Connection<D>) {
    connection
        .drop_table(TABLE, true)
        .expect("Failed to drop the quarry_transactions table");
    connection
        .create_table(
            CreateTable::new(TABLE)
                .column(ColumnDef::new("id", ColumnType::Int32).not_null())
                .primary_key(["id"]),
        )
        .expect("Failed to create the quarry_transactions table");
    let insert = Query::new(InsertOrUpdate::insert(TABLE, ["id"]));

    assert!(!connection.in_transaction());
    assert!(connection.begin().is_success());
    assert!(connection.in_transaction());
    connection
        .execute(&insert, &params! { "id" => 1 })
        .expect("Failed to insert");
    assert!(connection.rollback().is_success());
    assert!(!connection.in_transaction());
    assert!(select_all(connection, TABLE).is_empty());

    assert!(connection.begin().is_success());
    connection
        .execute(&insert, &params! { "id" => 2 })
        .expect("Failed to insert");
    assert!(connection.commit().is_success());
    assert_eq!(ids(&select_all(connection, TABLE)), [2]);

    let result = connection.transaction(|connection| {
        connection.execute(&insert, &params! { "id" => 3 })?;
        Err::<(), _>(Error::Parameter("abandon".into()))
    });
    assert!(result.is_err());
    assert!(!connection.in_transaction());
    assert_eq!(ids(&select_all(connection, TABLE)), [2]);

    let inserted = connection
        .transaction(|connection| {
            connection.execute(&insert, &params! { "id" => 3 })?;
            connection.execute(&insert, &params! { "id" => 4 })?;
            Ok(2)
        })
        .expect("Failed to run the transaction");
    assert_eq!(inserted, 2);
    assert_eq!(ids(&select_all(connection, TABLE)), [2, 3, 4]);

    connection
        .drop_table(TABLE, false)
        .expect("Failed to drop the quarry_transactions table");
}
