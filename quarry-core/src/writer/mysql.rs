use crate::{
    ColumnDef, ColumnType, SqlWriter, Value,
    writer::{Context, Fragment},
};
use std::fmt::Write;

#[derive(Default, Debug, Clone, Copy)]
pub struct MySqlSqlWriter;

impl SqlWriter for MySqlSqlWriter {
    fn connection_scheme(&self) -> Option<&'static str> {
        Some("mysql")
    }

    fn write_identifier_quoted(&self, context: &Context, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(context, out, value, '`', "``");
        out.push('`');
    }

    fn write_empty_list(&self, _context: &Context, out: &mut String, _element: &Value) {
        out.push_str("(SELECT NULL FROM DUAL WHERE 1 = 0)");
    }

    /// Backslash is an escape character in MySQL string literals.
    fn write_value_string(&self, _context: &Context, out: &mut String, value: &str) {
        out.push('\'');
        for c in value.chars() {
            match c {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                _ => out.push(c),
            }
        }
        out.push('\'');
    }

    fn write_column_type(&self, context: &Context, out: &mut String, value: &ColumnType) {
        match value {
            ColumnType::Int8 => out.push_str("TINYINT"),
            ColumnType::Int16 => out.push_str("SMALLINT"),
            ColumnType::Int32 => out.push_str("INT"),
            ColumnType::Int64 => out.push_str("BIGINT"),
            ColumnType::UInt8 => out.push_str("TINYINT UNSIGNED"),
            ColumnType::UInt16 => out.push_str("SMALLINT UNSIGNED"),
            ColumnType::UInt32 => out.push_str("INT UNSIGNED"),
            ColumnType::UInt64 => out.push_str("BIGINT UNSIGNED"),
            ColumnType::Serial => out.push_str("INT AUTO_INCREMENT"),
            ColumnType::BigSerial => out.push_str("BIGINT AUTO_INCREMENT"),
            ColumnType::Float32 => out.push_str("FLOAT"),
            ColumnType::Float64 => out.push_str("DOUBLE"),
            ColumnType::Varchar(0) => out.push_str("VARCHAR(255)"),
            ColumnType::Timestamp | ColumnType::TimestampWithTimezone => {
                out.push_str("DATETIME(6)")
            }
            ColumnType::Time => out.push_str("TIME(6)"),
            ColumnType::Uuid => out.push_str("CHAR(36)"),
            _ => crate::GenericSqlWriter.write_column_type(context, out, value),
        }
    }

    /// A `WHERE` clause needs a source table.
    fn write_upsert_select_source(&self, _context: &Context, out: &mut String) {
        out.push_str("\nFROM DUAL");
    }

    fn write_limit_offset(&self, _context: &Context, out: &mut String, limit: i64, offset: i64) {
        if offset > 0 {
            if limit > 0 {
                let _ = write!(out, "\nLIMIT {}, {}", offset, limit);
            } else {
                let _ = write!(out, "\nLIMIT {}, {}", offset, u64::MAX);
            }
        } else if limit > 0 {
            let _ = write!(out, "\nLIMIT {}", limit);
        }
    }

    fn write_drop_index(&self, context: &Context, out: &mut String, table: &str, index: &str) {
        out.push_str("DROP INDEX ");
        self.write_index_ref(context, out, table, index);
        out.push_str(" ON ");
        self.write_table_ref(context, out, table);
        out.push(';');
    }

    fn write_table_exists(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str(
            "SELECT 1 FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push(';');
    }

    fn write_field_exists(&self, context: &Context, out: &mut String, table: &str, field: &str) {
        out.push_str(
            "SELECT 1 FROM information_schema.columns WHERE table_schema = DATABASE() AND table_name = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str(" AND column_name = ");
        self.write_value_string(context, out, field);
        out.push(';');
    }

    fn write_index_exists(&self, context: &Context, out: &mut String, table: &str, index: &str) {
        out.push_str(
            "SELECT 1 FROM information_schema.statistics WHERE table_schema = DATABASE() AND table_name = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str(" AND index_name = ");
        self.write_value_string(context, out, &context.index_name(table, index));
        out.push(';');
    }

    fn write_alter_field(&self, context: &Context, table: &str, column: &ColumnDef) -> Vec<String> {
        let context = context.switch_fragment(Fragment::SqlAlterColumn);
        let mut out = String::with_capacity(128);
        out.push_str("ALTER TABLE ");
        self.write_table_ref(&context, &mut out, table);
        out.push_str(" MODIFY COLUMN ");
        self.write_column_definition(&context, &mut out, column);
        out.push(';');
        vec![out]
    }

    fn write_table_info_columns(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str(
            "SELECT column_name AS name, column_type AS type, column_default AS `default`, \
             is_nullable = 'YES' AS allow_null, NULL AS pk\n\
             FROM information_schema.columns\n\
             WHERE table_schema = DATABASE() AND table_name = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str("\nORDER BY ordinal_position;");
    }

    fn write_table_info_indices(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str(
            "SELECT index_name AS index_name, non_unique = 0 AS is_unique, index_name = 'PRIMARY' AS is_primary, \
             column_name AS column_name, seq_in_index AS seqno\n\
             FROM information_schema.statistics\n\
             WHERE table_schema = DATABASE() AND table_name = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str("\nORDER BY index_name, seq_in_index;");
    }
}
