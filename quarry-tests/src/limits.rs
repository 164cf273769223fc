use crate::ids;
use quarry::{
    ColumnDef, ColumnType, Connection, CreateTable, Driver, InsertOrUpdate, Order, Params, Query,
    Select, params,
};

const TABLE: &str = "quarry_limits";

pub fn limits<D: Driver>(connection: &mut Connection<D>) {
    connection
        .drop_table(TABLE, true)
        .expect("Failed to drop the quarry_limits table");
    connection
        .create_table(
            CreateTable::new(TABLE)
                .column(ColumnDef::new("id", ColumnType::Int32).not_null())
                .primary_key(["id"]),
        )
        .expect("Failed to create the quarry_limits table");
    let insert = Query::new(InsertOrUpdate::insert(TABLE, ["id"]));
    for id in 1..=5 {
        connection
            .execute(&insert, &params! { "id" => id })
            .expect("Failed to insert");
    }
    let select = || Select::new(TABLE).order_by("id", Order::Asc);
    let mut fetch = |select: Select| {
        connection
            .fetch(&Query::new(select), &Params::new())
            .expect("Failed to select a page")
    };

    assert_eq!(ids(&fetch(select().limit(2).offset(1))), [2, 3]);
    assert_eq!(ids(&fetch(select().offset(3))), [4, 5]);
    assert_eq!(ids(&fetch(select().limit(2))), [1, 2]);
    // Zero means no limit
    assert_eq!(ids(&fetch(select().limit(0))), [1, 2, 3, 4, 5]);

    connection
        .drop_table(TABLE, false)
        .expect("Failed to drop the quarry_limits table");
}
