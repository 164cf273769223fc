use crate::{
    ColumnDef, ColumnType, ConnectionParams, CreateTable, Error, Result, SqlWriter,
    writer::{Context, Fragment},
};
use std::fmt::Write;

#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter;

impl SqliteSqlWriter {
    /// A single serial primary key is declared inline as the rowid alias.
    fn is_rowid_alias(column: &ColumnDef, table: &CreateTable) -> bool {
        column.column_type.is_serial()
            && table.primary_key.len() == 1
            && table.primary_key[0] == column.name
    }
}

impl SqlWriter for SqliteSqlWriter {
    fn transactional_ddl(&self) -> bool {
        true
    }

    fn connection_scheme(&self) -> Option<&'static str> {
        Some("sqlite")
    }

    fn write_connection_string(&self, params: &ConnectionParams) -> Result<String> {
        if params.database.is_empty() {
            return Err(Error::Configuration(
                "The database path is required to build a SQLite connection string".into(),
            ));
        }
        if params.database == ":memory:" {
            return Ok("sqlite://:memory:".into());
        }
        // The driver percent-decodes plain paths
        let path = params
            .database
            .split('/')
            .map(urlencoding::encode)
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!("sqlite://{}", path))
    }

    fn write_column_type(&self, context: &Context, out: &mut String, value: &ColumnType) {
        match value {
            ColumnType::Int8
            | ColumnType::Int16
            | ColumnType::Int32
            | ColumnType::Int64
            | ColumnType::UInt8
            | ColumnType::UInt16
            | ColumnType::UInt32
            | ColumnType::UInt64
            | ColumnType::Serial
            | ColumnType::BigSerial => out.push_str("INTEGER"),
            ColumnType::Float32 | ColumnType::Float64 => out.push_str("REAL"),
            ColumnType::Uuid => out.push_str("TEXT"),
            ColumnType::TimestampWithTimezone => out.push_str("TIMESTAMPTZ"),
            _ => crate::GenericSqlWriter.write_column_type(context, out, value),
        }
    }

    fn write_create_table_column_fragment(
        &self,
        context: &Context,
        out: &mut String,
        column: &ColumnDef,
        table: &CreateTable,
    ) {
        if Self::is_rowid_alias(column, table) {
            self.write_identifier_quoted(context, out, &column.name);
            out.push_str(" INTEGER PRIMARY KEY AUTOINCREMENT");
        } else {
            self.write_column_definition(context, out, column);
        }
    }

    fn write_create_table_primary_key(&self, context: &Context, out: &mut String, table: &CreateTable) {
        if table
            .columns
            .iter()
            .any(|column| Self::is_rowid_alias(column, table))
        {
            return;
        }
        let context = context.switch_fragment(Fragment::SqlCreateTablePrimaryKey);
        if table.primary_key.is_empty() {
            return;
        }
        out.push_str(",\nPRIMARY KEY (");
        crate::separated_by(
            out,
            &table.primary_key,
            |out, v| self.write_identifier_quoted(&context, out, v),
            ", ",
        );
        out.push(')');
    }

    fn write_limit_offset(&self, _context: &Context, out: &mut String, limit: i64, offset: i64) {
        if limit > 0 {
            let _ = write!(out, "\nLIMIT {}", limit);
        } else if offset > 0 {
            out.push_str("\nLIMIT -1");
        }
        if offset > 0 {
            let _ = write!(out, "\nOFFSET {}", offset);
        }
    }

    fn write_truncate(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str("DELETE FROM ");
        self.write_table_ref(context, out, table);
        out.push(';');
    }

    fn write_table_exists(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ");
        self.write_value_string(context, out, &context.table_name(table));
        out.push(';');
    }

    fn write_field_exists(&self, context: &Context, out: &mut String, table: &str, field: &str) {
        out.push_str("SELECT 1 FROM pragma_table_info(");
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str(") WHERE name = ");
        self.write_value_string(context, out, field);
        out.push(';');
    }

    fn write_index_exists(&self, context: &Context, out: &mut String, table: &str, index: &str) {
        out.push_str("SELECT 1 FROM sqlite_master WHERE type = 'index' AND tbl_name = ");
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str(" AND name = ");
        self.write_value_string(context, out, &context.index_name(table, index));
        out.push(';');
    }

    fn write_table_info_columns(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str("SELECT name, type, dflt_value AS \"default\", \"notnull\" = 0 AS allow_null, pk\n");
        out.push_str("FROM pragma_table_info(");
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str(")\nORDER BY cid;");
    }

    fn write_table_info_indices(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str(
            "SELECT il.name AS index_name, il.\"unique\" AS is_unique, il.origin = 'pk' AS is_primary, \
             ii.name AS column_name, ii.seqno AS seqno\n\
             FROM pragma_index_list(",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str(
            ") AS il, pragma_index_info(il.name) AS ii\n\
             ORDER BY il.name, ii.seqno;",
        );
    }
}
