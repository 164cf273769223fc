use crate::ids;
use quarry::{
    ColumnDef, ColumnType, Condition, Connection, CreateTable, Driver, InsertOrUpdate, Order,
    Query, Select, params,
};

const TABLE: &str = "quarry_arrays";

pub fn arrays<D: Driver>(connection: &mut Connection<D>) {
    connection
        .drop_table(TABLE, true)
        .expect("Failed to drop the quarry_arrays table");
    connection
        .create_table(
            CreateTable::new(TABLE)
                .column(ColumnDef::new("id", ColumnType::Int64).not_null())
                .primary_key(["id"]),
        )
        .expect("Failed to create the quarry_arrays table");
    let insert = Query::new(InsertOrUpdate::insert(TABLE, ["id"]));
    for id in 1..=5i64 {
        connection
            .execute(&insert, &params! { "id" => id })
            .expect("Failed to insert");
    }

    let within = Query::new(
        Select::new(TABLE)
            .filter(Condition::is_in("id", "ids"))
            .order_by("id", Order::Asc),
    );
    let rows = connection
        .fetch(&within, &params! { "ids" => vec![2i64, 4] })
        .expect("Failed to select within a list");
    assert_eq!(ids(&rows), [2, 4]);

    let rows = connection
        .fetch(&within, &params! { "ids" => vec![4i64, 1, 3] })
        .expect("Failed to select within a list");
    assert_eq!(ids(&rows), [1, 3, 4]);

    let rows = connection
        .fetch(&within, &params! { "ids" => Vec::<i64>::new() })
        .expect("Failed to select within an empty list");
    assert!(rows.is_empty());

    let outside = Query::new(
        Select::new(TABLE)
            .filter(Condition::is_in("id", "ids").not())
            .order_by("id", Order::Asc),
    );
    let rows = connection
        .fetch(&outside, &params! { "ids" => vec![2i64, 4] })
        .expect("Failed to select outside a list");
    assert_eq!(ids(&rows), [1, 3, 5]);

    let rows = connection
        .fetch(&outside, &params! { "ids" => Vec::<i64>::new() })
        .expect("Failed to select outside an empty list");
    assert_eq!(ids(&rows), [1, 2, 3, 4, 5]);

    let either = Query::new(
        Select::new(TABLE)
            .filter(Condition::is_in("id", "ids").or(Condition::eq("id")))
            .order_by("id", Order::Asc),
    );
    let rows = connection
        .fetch(&either, &params! { "ids" => vec![2i64, 4], "id" => 5i64 })
        .expect("Failed to mix a list and a scalar");
    assert_eq!(ids(&rows), [2, 4, 5]);

    connection
        .drop_table(TABLE, false)
        .expect("Failed to drop the quarry_arrays table");
}
