use crate::{
    ColumnDef, ColumnType, SqlWriter, Value,
    writer::{Context, Fragment},
};
use std::fmt::Write;

#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresSqlWriter;

impl SqlWriter for PostgresSqlWriter {
    fn transactional_ddl(&self) -> bool {
        true
    }

    fn connection_scheme(&self) -> Option<&'static str> {
        Some("postgres")
    }

    fn write_column_type(&self, context: &Context, out: &mut String, value: &ColumnType) {
        match value {
            // Sequences are only created together with the column
            ColumnType::Serial if context.fragment == Fragment::SqlAlterColumn => {
                out.push_str("INTEGER")
            }
            ColumnType::BigSerial if context.fragment == Fragment::SqlAlterColumn => {
                out.push_str("BIGINT")
            }
            ColumnType::Decimal(precision, scale) => {
                out.push_str("NUMERIC");
                if (precision, scale) != (&0, &0) {
                    let _ = write!(out, "({},{})", precision, scale);
                }
            }
            ColumnType::Blob => out.push_str("BYTEA"),
            _ => crate::GenericSqlWriter.write_column_type(context, out, value),
        }
    }

    /// A bare `NULL` in a subquery is resolved as text.
    fn write_empty_list(&self, context: &Context, out: &mut String, element: &Value) {
        let Some(column_type) = ColumnType::for_value(element) else {
            return crate::GenericSqlWriter.write_empty_list(context, out, element);
        };
        out.push_str("(SELECT CAST(NULL AS ");
        self.write_column_type(context, out, &column_type);
        out.push_str(") WHERE 1 = 0)");
    }

    fn write_value_blob(&self, _context: &Context, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    fn write_like_op(&self, _context: &Context, out: &mut String) {
        out.push_str("ILIKE");
    }

    fn write_truncate(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str("TRUNCATE TABLE ");
        self.write_table_ref(context, out, table);
        out.push_str(" RESTART IDENTITY;");
    }

    fn write_table_exists(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str(
            "SELECT 1 FROM information_schema.tables WHERE table_schema = current_schema() AND table_name = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push(';');
    }

    fn write_field_exists(&self, context: &Context, out: &mut String, table: &str, field: &str) {
        out.push_str(
            "SELECT 1 FROM information_schema.columns WHERE table_schema = current_schema() AND table_name = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str(" AND column_name = ");
        self.write_value_string(context, out, field);
        out.push(';');
    }

    fn write_index_exists(&self, context: &Context, out: &mut String, table: &str, index: &str) {
        out.push_str(
            "SELECT 1 FROM pg_indexes WHERE schemaname = current_schema() AND tablename = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str(" AND indexname = ");
        self.write_value_string(context, out, &context.index_name(table, index));
        out.push(';');
    }

    /// Native redefinition in a single statement.
    fn write_alter_field(&self, context: &Context, table: &str, column: &ColumnDef) -> Vec<String> {
        let context = context.switch_fragment(Fragment::SqlAlterColumn);
        let mut out = String::with_capacity(256);
        out.push_str("ALTER TABLE ");
        self.write_table_ref(&context, &mut out, table);
        let mut column_type = String::with_capacity(16);
        self.write_column_type(&context, &mut column_type, &column.column_type);
        out.push_str("\nALTER COLUMN ");
        self.write_identifier_quoted(&context, &mut out, &column.name);
        let _ = write!(out, " TYPE {} USING ", column_type);
        self.write_identifier_quoted(&context, &mut out, &column.name);
        let _ = write!(out, "::{},\nALTER COLUMN ", column_type);
        self.write_identifier_quoted(&context, &mut out, &column.name);
        out.push_str(if column.nullable {
            " DROP NOT NULL"
        } else {
            " SET NOT NULL"
        });
        out.push_str(",\nALTER COLUMN ");
        self.write_identifier_quoted(&context, &mut out, &column.name);
        match &column.default {
            Some(default) => {
                out.push_str(" SET DEFAULT ");
                self.write_value(&context, &mut out, default);
            }
            None => out.push_str(" DROP DEFAULT"),
        }
        out.push(';');
        vec![out]
    }

    fn write_table_info_columns(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str(
            "SELECT column_name::text AS name, data_type::text AS type, column_default::text AS \"default\", \
             is_nullable = 'YES' AS allow_null, NULL::int4 AS pk\n\
             FROM information_schema.columns\n\
             WHERE table_schema = current_schema() AND table_name = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str("\nORDER BY ordinal_position;");
    }

    fn write_table_info_indices(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str(
            "SELECT i.relname::text AS index_name, ix.indisunique AS is_unique, ix.indisprimary AS is_primary, \
             a.attname::text AS column_name, k.seqno::int4 AS seqno\n\
             FROM pg_class t\n\
             JOIN pg_namespace n ON n.oid = t.relnamespace\n\
             JOIN pg_index ix ON ix.indrelid = t.oid\n\
             JOIN pg_class i ON i.oid = ix.indexrelid\n\
             CROSS JOIN LATERAL unnest(ix.indkey::int2[]) WITH ORDINALITY AS k(attnum, seqno)\n\
             JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum\n\
             WHERE n.nspname = current_schema() AND t.relname = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str("\nORDER BY i.relname, k.seqno;");
    }
}
