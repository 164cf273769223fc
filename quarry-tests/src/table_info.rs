use quarry::{ColumnDef, ColumnType, Connection, CreateTable, Driver, IndexDef};

const TABLE: &str = "quarry_info";

pub fn table_info<D: Driver>(connection: &mut Connection<D>) {
    connection
        .drop_table(TABLE, true)
        .expect("Failed to drop the quarry_info table");
    connection
        .create_table(
            CreateTable::new(TABLE)
                .column(ColumnDef::new("id", ColumnType::Serial))
                .column(ColumnDef::new("name", ColumnType::Varchar(64)))
                .column(
                    ColumnDef::new("code", ColumnType::Varchar(16))
                        .not_null()
                        .default_value("x"),
                )
                .primary_key(["id"]),
        )
        .expect("Failed to create the quarry_info table");
    connection
        .add_index(TABLE, IndexDef::new("by_code", ["code"]).unique())
        .expect("Failed to add by_code")
        .into_result()
        .expect("by_code was not created");
    connection
        .add_index(TABLE, IndexDef::new("by_name_code", ["name", "code"]))
        .expect("Failed to add by_name_code")
        .into_result()
        .expect("by_name_code was not created");

    let info = connection
        .table_info(TABLE)
        .expect("Failed to describe quarry_info");
    assert_eq!(info.primary_key, ["id"]);
    let columns = info
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(columns, ["id", "name", "code"]);
    assert!(info.column("name").expect("name").allow_null);
    let code = info.column("code").expect("code");
    assert!(!code.allow_null);
    assert!(
        code.default.as_deref().is_some_and(|v| v.contains('x')),
        "Unexpected default {:?}",
        code.default
    );

    assert_eq!(info.indices.len(), 2, "{:?}", info.indices);
    let by_code = &info.indices["by_code"];
    assert!(by_code.unique);
    assert_eq!(by_code.fields, ["code"]);
    let by_name_code = &info.indices["by_name_code"];
    assert!(!by_name_code.unique);
    assert_eq!(by_name_code.fields, ["name", "code"]);
    assert_eq!(info.unique, [vec!["code".to_string()]]);

    let missing = connection
        .table_info("quarry_missing")
        .expect("Describing a missing table is not an error");
    assert!(missing.columns.is_empty());
    assert!(missing.indices.is_empty());

    connection
        .drop_table(TABLE, false)
        .expect("Failed to drop the quarry_info table");
}
