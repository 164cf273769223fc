use crate::{
    ColumnDef, ColumnType, CompareOp, Condition, ConnectionParams, CreateTable, Error, IndexDef,
    InsertOrUpdate, Order, QueryKind, Result, Select, Upsert, Value, possibly_parenthesized,
    separated_by, unix_millis,
    writer::{Context, Fragment},
};
use std::fmt::Write;
use url::Url;

fn ensure_table(table: &str) -> Result<()> {
    if table.trim().is_empty() {
        return Err(Error::Compile("The table name is empty".into()));
    }
    Ok(())
}

fn ensure_not_empty<T>(values: &[T], what: &str, table: &str) -> Result<()> {
    if values.is_empty() {
        return Err(Error::Compile(format!(
            "The {} list is empty for table `{}`",
            what, table
        )));
    }
    Ok(())
}

/// Each name is written once in the insert column list.
fn ensure_distinct_columns(upsert: &Upsert) -> Result<()> {
    let columns = upsert.keys.iter().chain(&upsert.fields);
    for (i, name) in columns.clone().enumerate() {
        if columns.clone().take(i).any(|v| v == name) {
            return Err(Error::Compile(format!(
                "The column `{}` is repeated in the upsert of table `{}`",
                name, upsert.table
            )));
        }
    }
    Ok(())
}

fn single(f: impl FnOnce(&mut String)) -> Vec<String> {
    let mut out = String::with_capacity(128);
    f(&mut out);
    vec![out]
}

/// Dialect printer converting query objects into concrete SQL strings.
///
/// The default methods implement the base rules (close to standard SQL),
/// engine writers override only what differs.
pub trait SqlWriter: Send + Sync {
    /// Engine executes `CREATE`/`ALTER`/`DROP` inside transactions.
    fn transactional_ddl(&self) -> bool {
        false
    }

    /// Url scheme used by [`SqlWriter::write_connection_string`].
    fn connection_scheme(&self) -> Option<&'static str> {
        None
    }

    fn write_connection_string(&self, params: &ConnectionParams) -> Result<String> {
        let Some(scheme) = self.connection_scheme() else {
            return Err(Error::Configuration(
                "The generic dialect has no connection string".into(),
            ));
        };
        if params.database.is_empty() {
            return Err(Error::Configuration(
                "The database name is required to build a connection string".into(),
            ));
        }
        let host = params.host.as_deref().unwrap_or("localhost");
        let mut url = Url::parse(&format!("{}://{}", scheme, host))
            .map_err(|e| Error::Configuration(format!("Invalid host `{}`: {}", host, e)))?;
        if let Some(username) = &params.username {
            url.set_username(username)
                .and_then(|_| url.set_password(params.password.as_deref()))
                .map_err(|_| {
                    Error::Configuration(format!("Cannot set the credentials for host `{}`", host))
                })?;
        }
        if let Some(port) = params.port {
            url.set_port(Some(port)).map_err(|_| {
                Error::Configuration(format!("Cannot set the port for host `{}`", host))
            })?;
        }
        url.set_path(&params.database);
        Ok(url.into())
    }

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    /// Prefixed and quoted table name.
    fn write_table_ref(&self, context: &Context, out: &mut String, table: &str) {
        self.write_identifier_quoted(context, out, &context.table_name(table));
    }

    /// Quoted `{prefix}{table}_{index}` identifier.
    fn write_index_ref(&self, context: &Context, out: &mut String, table: &str, index: &str) {
        self.write_identifier_quoted(context, out, &context.index_name(table, index));
    }

    fn write_placeholder(&self, _context: &Context, out: &mut String, name: &str) {
        out.push(':');
        out.push_str(name);
    }

    fn write_column_type(&self, _context: &Context, out: &mut String, value: &ColumnType) {
        match value {
            ColumnType::Boolean => out.push_str("BOOLEAN"),
            ColumnType::Int8 | ColumnType::Int16 | ColumnType::UInt8 => out.push_str("SMALLINT"),
            ColumnType::Int32 | ColumnType::UInt16 => out.push_str("INTEGER"),
            ColumnType::Int64 | ColumnType::UInt32 => out.push_str("BIGINT"),
            ColumnType::UInt64 => out.push_str("NUMERIC(20)"),
            ColumnType::Serial => out.push_str("SERIAL"),
            ColumnType::BigSerial => out.push_str("BIGSERIAL"),
            ColumnType::Float32 => out.push_str("REAL"),
            ColumnType::Float64 => out.push_str("DOUBLE PRECISION"),
            ColumnType::Decimal(precision, scale) => {
                out.push_str("DECIMAL");
                if (precision, scale) != (&0, &0) {
                    let _ = write!(out, "({},{})", precision, scale);
                }
            }
            ColumnType::Char(len) => {
                let _ = write!(out, "CHAR({})", len.max(&1));
            }
            ColumnType::Varchar(len) => {
                out.push_str("VARCHAR");
                if *len > 0 {
                    let _ = write!(out, "({})", len);
                }
            }
            ColumnType::Text => out.push_str("TEXT"),
            ColumnType::Blob => out.push_str("BLOB"),
            ColumnType::Date => out.push_str("DATE"),
            ColumnType::Time => out.push_str("TIME"),
            ColumnType::Timestamp => out.push_str("TIMESTAMP"),
            ColumnType::TimestampWithTimezone => out.push_str("TIMESTAMP WITH TIME ZONE"),
            ColumnType::Uuid => out.push_str("UUID"),
            ColumnType::Custom(v) => out.push_str(v),
        }
    }

    /// Render a literal, used for column defaults.
    fn write_value(&self, context: &Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Varchar(Some(v)) => self.write_value_string(context, out, v),
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v),
            Value::Float32(Some(v)) if !v.is_finite() => {
                self.write_value_string(context, out, &v.to_string())
            }
            Value::Float64(Some(v)) if !v.is_finite() => {
                self.write_value_string(context, out, &v.to_string())
            }
            Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..)
            | Value::Uuid(..) => self.write_value_string(context, out, &value.to_string()),
            Value::List(..) => {
                log::error!("A list cannot be written as a literal: {}", value);
                self.write_value_none(context, out);
            }
            _ => {
                let _ = write!(out, "{}", value);
            }
        }
    }

    fn write_value_none(&self, _context: &Context, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, _context: &Context, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    /// Single quoted string literal, inner quotes doubled.
    fn write_value_string(&self, context: &Context, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(context, out, value, '\'', "''");
        out.push('\'');
    }

    /// Hexadecimal blob literal.
    fn write_value_blob(&self, _context: &Context, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    fn write_compare_op(&self, _context: &Context, out: &mut String, op: CompareOp) {
        out.push_str(match op {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "<>",
            CompareOp::Less => "<",
            CompareOp::LessEqual => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterEqual => ">=",
        });
    }

    /// Set without rows replacing an empty list parameter, `element` is the
    /// type of the list items.
    fn write_empty_list(&self, _context: &Context, out: &mut String, _element: &Value) {
        out.push_str("(SELECT NULL WHERE 1 = 0)");
    }

    /// Case insensitive pattern matching operator.
    fn write_like_op(&self, _context: &Context, out: &mut String) {
        out.push_str("LIKE");
    }

    fn write_condition(&self, context: &Context, out: &mut String, condition: &Condition) {
        match condition {
            Condition::Compare(field, op, param) => {
                self.write_identifier_quoted(context, out, field);
                out.push(' ');
                self.write_compare_op(context, out, *op);
                out.push(' ');
                self.write_placeholder(context, out, param);
            }
            Condition::In(field, param) => {
                self.write_identifier_quoted(context, out, field);
                out.push_str(" IN ");
                self.write_placeholder(context, out, param);
            }
            Condition::Like(field, param) => {
                self.write_identifier_quoted(context, out, field);
                out.push(' ');
                self.write_like_op(context, out);
                out.push(' ');
                self.write_placeholder(context, out, param);
            }
            Condition::IsNull(field) => {
                self.write_identifier_quoted(context, out, field);
                out.push_str(" IS NULL");
            }
            Condition::IsNotNull(field) => {
                self.write_identifier_quoted(context, out, field);
                out.push_str(" IS NOT NULL");
            }
            Condition::And(v) | Condition::Or(v) => {
                let (separator, empty) = if matches!(condition, Condition::And(..)) {
                    (" AND ", "1 = 1")
                } else {
                    (" OR ", "1 = 0")
                };
                if v.is_empty() {
                    out.push_str(empty);
                    return;
                }
                separated_by(
                    out,
                    v,
                    |out, v| {
                        let nested = matches!(v, Condition::And(v) | Condition::Or(v) if v.len() > 1);
                        possibly_parenthesized!(out, nested, self.write_condition(context, out, v));
                    },
                    separator,
                );
            }
            Condition::Not(v) => {
                out.push_str("NOT (");
                self.write_condition(context, out, v);
                out.push(')');
            }
            Condition::Raw(v) => out.push_str(v),
        }
    }

    /// Conjunction of `field = :field` over `fields`.
    fn write_key_condition(&self, context: &Context, out: &mut String, fields: &[crate::Name]) {
        separated_by(
            out,
            fields,
            |out, v| {
                self.write_identifier_quoted(context, out, v);
                out.push_str(" = ");
                self.write_placeholder(context, out, v);
            },
            " AND ",
        );
    }

    /// Non positive values suppress the corresponding clause.
    fn write_limit_offset(&self, _context: &Context, out: &mut String, limit: i64, offset: i64) {
        if limit > 0 {
            let _ = write!(out, "\nLIMIT {}", limit);
        }
        if offset > 0 {
            let _ = write!(out, "\nOFFSET {}", offset);
        }
    }

    fn write_select(&self, context: &Context, out: &mut String, value: &Select) {
        let context = context.switch_fragment(Fragment::SqlSelect);
        out.push_str("SELECT ");
        if value.fields.is_empty() {
            out.push('*');
        } else {
            separated_by(
                out,
                &value.fields,
                |out, v| self.write_identifier_quoted(&context, out, v),
                ", ",
            );
        }
        out.push_str("\nFROM ");
        self.write_table_ref(&context, out, &value.table);
        if let Some(condition) = &value.condition {
            out.push_str("\nWHERE ");
            self.write_condition(
                &context.switch_fragment(Fragment::SqlSelectWhere),
                out,
                condition,
            );
        }
        if !value.order_by.is_empty() {
            let context = context.switch_fragment(Fragment::SqlSelectOrderBy);
            out.push_str("\nORDER BY ");
            separated_by(
                out,
                &value.order_by,
                |out, (field, order)| {
                    self.write_identifier_quoted(&context, out, field);
                    out.push_str(match order {
                        Order::Asc => " ASC",
                        Order::Desc => " DESC",
                    });
                },
                ", ",
            );
        }
        self.write_limit_offset(&context, out, value.limit, value.offset);
        out.push(';');
    }

    fn write_insert(&self, context: &Context, out: &mut String, value: &InsertOrUpdate) {
        let context = context.switch_fragment(Fragment::SqlInsertInto);
        out.push_str("INSERT INTO ");
        self.write_table_ref(&context, out, &value.table);
        out.push_str(" (");
        separated_by(
            out,
            &value.fields,
            |out, v| self.write_identifier_quoted(&context, out, v),
            ", ",
        );
        out.push_str(")\nVALUES (");
        separated_by(
            out,
            &value.fields,
            |out, v| self.write_placeholder(&context, out, v),
            ", ",
        );
        out.push_str(");");
    }

    fn write_delete(
        &self,
        context: &Context,
        out: &mut String,
        table: &str,
        condition: Option<&Condition>,
    ) {
        let context = context.switch_fragment(Fragment::SqlDeleteFrom);
        out.push_str("DELETE FROM ");
        self.write_table_ref(&context, out, table);
        if let Some(condition) = condition {
            out.push_str("\nWHERE ");
            self.write_condition(&context, out, condition);
        }
        out.push(';');
    }

    /// Source clause of the guarded insert, some engines need a dummy table.
    fn write_upsert_select_source(&self, _context: &Context, _out: &mut String) {}

    /// `INSERT INTO t (keys, fields) SELECT :keys, :fields WHERE NOT EXISTS (SELECT 1 FROM t WHERE keys)`
    fn write_upsert_insert(&self, context: &Context, out: &mut String, value: &Upsert) {
        let context = context.switch_fragment(Fragment::SqlUpsertInsert);
        let columns = value.keys.iter().chain(value.fields.iter());
        out.push_str("INSERT INTO ");
        self.write_table_ref(&context, out, &value.table);
        out.push_str(" (");
        separated_by(
            out,
            columns.clone(),
            |out, v| self.write_identifier_quoted(&context, out, v),
            ", ",
        );
        out.push_str(")\nSELECT ");
        separated_by(
            out,
            columns,
            |out, v| self.write_placeholder(&context, out, v),
            ", ",
        );
        self.write_upsert_select_source(&context, out);
        out.push_str("\nWHERE NOT EXISTS (SELECT 1 FROM ");
        self.write_table_ref(&context, out, &value.table);
        out.push_str(" WHERE ");
        self.write_key_condition(&context, out, &value.keys);
        out.push_str(");");
    }

    fn write_truncate(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str("TRUNCATE TABLE ");
        self.write_table_ref(context, out, table);
        out.push(';');
    }

    fn write_table_exists(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str("SELECT 1 FROM information_schema.tables WHERE table_name = ");
        self.write_value_string(context, out, &context.table_name(table));
        out.push(';');
    }

    fn write_field_exists(&self, context: &Context, out: &mut String, table: &str, field: &str) {
        out.push_str("SELECT 1 FROM information_schema.columns WHERE table_name = ");
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str(" AND column_name = ");
        self.write_value_string(context, out, field);
        out.push(';');
    }

    fn write_index_exists(&self, context: &Context, out: &mut String, table: &str, index: &str) {
        out.push_str("SELECT 1 FROM information_schema.statistics WHERE table_name = ");
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str(" AND index_name = ");
        self.write_value_string(context, out, &context.index_name(table, index));
        out.push(';');
    }

    fn write_create_index(&self, context: &Context, out: &mut String, table: &str, index: &IndexDef) {
        let context = context.switch_fragment(Fragment::SqlCreateIndex);
        out.push_str("CREATE ");
        if index.unique {
            out.push_str("UNIQUE ");
        }
        out.push_str("INDEX ");
        self.write_index_ref(&context, out, table, &index.name);
        out.push_str(" ON ");
        self.write_table_ref(&context, out, table);
        out.push_str(" (");
        separated_by(
            out,
            &index.fields,
            |out, v| self.write_identifier_quoted(&context, out, v),
            ", ",
        );
        out.push_str(");");
    }

    fn write_drop_index(&self, context: &Context, out: &mut String, table: &str, index: &str) {
        out.push_str("DROP INDEX ");
        self.write_index_ref(context, out, table, index);
        out.push(';');
    }

    /// `"name" TYPE [NOT NULL] [DEFAULT value]`
    fn write_column_definition(&self, context: &Context, out: &mut String, column: &ColumnDef) {
        self.write_identifier_quoted(context, out, &column.name);
        out.push(' ');
        self.write_column_type(context, out, &column.column_type);
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            out.push_str(" DEFAULT ");
            self.write_value(context, out, default);
        }
    }

    fn write_create_table_column_fragment(
        &self,
        context: &Context,
        out: &mut String,
        column: &ColumnDef,
        _table: &CreateTable,
    ) {
        self.write_column_definition(context, out, column);
    }

    fn write_create_table_primary_key(&self, context: &Context, out: &mut String, table: &CreateTable) {
        if table.primary_key.is_empty() {
            return;
        }
        let context = context.switch_fragment(Fragment::SqlCreateTablePrimaryKey);
        out.push_str(",\nPRIMARY KEY (");
        separated_by(
            out,
            &table.primary_key,
            |out, v| self.write_identifier_quoted(&context, out, v),
            ", ",
        );
        out.push(')');
    }

    fn write_create_table(&self, context: &Context, out: &mut String, table: &CreateTable) {
        let context = context.switch_fragment(Fragment::SqlCreateTable);
        out.push_str("CREATE TABLE ");
        if table.if_not_exists {
            out.push_str("IF NOT EXISTS ");
        }
        self.write_table_ref(&context, out, &table.table);
        out.push_str(" (\n");
        separated_by(
            out,
            &table.columns,
            |out, v| self.write_create_table_column_fragment(&context, out, v, table),
            ",\n",
        );
        self.write_create_table_primary_key(&context, out, table);
        out.push_str(");");
    }

    fn write_drop_table(&self, context: &Context, out: &mut String, table: &str, if_exists: bool) {
        out.push_str("DROP TABLE ");
        if if_exists {
            out.push_str("IF EXISTS ");
        }
        self.write_table_ref(context, out, table);
        out.push(';');
    }

    fn write_add_field(&self, context: &Context, out: &mut String, table: &str, column: &ColumnDef) {
        let context = context.switch_fragment(Fragment::SqlAlterTable);
        out.push_str("ALTER TABLE ");
        self.write_table_ref(&context, out, table);
        out.push_str(" ADD COLUMN ");
        self.write_column_definition(&context, out, column);
        out.push(';');
    }

    fn write_drop_field(&self, context: &Context, out: &mut String, table: &str, field: &str) {
        out.push_str("ALTER TABLE ");
        self.write_table_ref(context, out, table);
        out.push_str(" DROP COLUMN ");
        self.write_identifier_quoted(context, out, field);
        out.push(';');
    }

    /// Name of the column holding the data while a field is redefined.
    fn temporary_field_name(&self, field: &str) -> String {
        format!("{}_tmp{}", field, unix_millis())
    }

    /// Redefine a field by copying it through a temporary column: add the
    /// temporary column, copy, drop the original, rename.
    fn write_alter_field(&self, context: &Context, table: &str, column: &ColumnDef) -> Vec<String> {
        let context = context.switch_fragment(Fragment::SqlAlterTable);
        let temporary = ColumnDef {
            name: self.temporary_field_name(&column.name).into(),
            ..column.clone()
        };
        let mut add = String::with_capacity(128);
        self.write_add_field(&context, &mut add, table, &temporary);
        let mut copy = String::with_capacity(128);
        copy.push_str("UPDATE ");
        self.write_table_ref(&context, &mut copy, table);
        copy.push_str(" SET ");
        self.write_identifier_quoted(&context, &mut copy, &temporary.name);
        copy.push_str(" = ");
        self.write_identifier_quoted(&context, &mut copy, &column.name);
        copy.push(';');
        let mut drop = String::with_capacity(128);
        self.write_drop_field(&context, &mut drop, table, &column.name);
        let mut rename = String::with_capacity(128);
        rename.push_str("ALTER TABLE ");
        self.write_table_ref(&context, &mut rename, table);
        rename.push_str(" RENAME COLUMN ");
        self.write_identifier_quoted(&context, &mut rename, &temporary.name);
        rename.push_str(" TO ");
        self.write_identifier_quoted(&context, &mut rename, &column.name);
        rename.push(';');
        vec![add, copy, drop, rename]
    }

    /// Columns probe, labels: `name, type, default, allow_null, pk`.
    fn write_table_info_columns(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str("SELECT column_name AS name, data_type AS type, column_default AS ");
        self.write_identifier_quoted(context, out, "default");
        out.push_str(", is_nullable = 'YES' AS allow_null, NULL AS pk\n");
        out.push_str("FROM information_schema.columns\nWHERE table_name = ");
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str("\nORDER BY ordinal_position;");
    }

    /// Index members probe, labels: `index_name, is_unique, is_primary, column_name, seqno`.
    fn write_table_info_indices(&self, context: &Context, out: &mut String, table: &str) {
        out.push_str(
            "SELECT index_name, non_unique = 0 AS is_unique, index_name = 'PRIMARY' AS is_primary, \
             column_name, seq_in_index AS seqno\n\
             FROM information_schema.statistics\nWHERE table_name = ",
        );
        self.write_value_string(context, out, &context.table_name(table));
        out.push_str("\nORDER BY index_name, seq_in_index;");
    }

    /// Produce the statements for `query`, executed in order.
    fn write_query(&self, context: &Context, query: &QueryKind) -> Result<Vec<String>> {
        let context = &context.switch_fragment(Fragment::None);
        Ok(match query {
            QueryKind::Select(v) => {
                ensure_table(&v.table)?;
                single(|out| self.write_select(context, out, v))
            }
            QueryKind::InsertOrUpdate(v) => {
                ensure_table(&v.table)?;
                ensure_not_empty(&v.fields, "field", &v.table)?;
                match &v.condition {
                    None => single(|out| self.write_insert(context, out, v)),
                    Some(condition) => single(|out| {
                        let where_context = context.switch_fragment(Fragment::SqlUpdateWhere);
                        self.write_update(context, out, &v.table, &v.fields, &|out| {
                            self.write_condition(&where_context, out, condition)
                        })
                    }),
                }
            }
            QueryKind::Delete(v) => {
                ensure_table(&v.table)?;
                single(|out| self.write_delete(context, out, &v.table, v.condition.as_ref()))
            }
            QueryKind::Upsert(v) => {
                ensure_table(&v.table)?;
                ensure_not_empty(&v.keys, "key", &v.table)?;
                ensure_not_empty(&v.fields, "field", &v.table)?;
                ensure_distinct_columns(v)?;
                let mut update = String::with_capacity(128);
                let where_context = context.switch_fragment(Fragment::SqlUpdateWhere);
                self.write_update(context, &mut update, &v.table, &v.fields, &|out| {
                    self.write_key_condition(&where_context, out, &v.keys)
                });
                let mut insert = String::with_capacity(192);
                self.write_upsert_insert(context, &mut insert, v);
                vec![update, insert]
            }
            QueryKind::Truncate { table } => {
                ensure_table(table)?;
                single(|out| self.write_truncate(context, out, table))
            }
            QueryKind::TableExists { table } => {
                ensure_table(table)?;
                let context = context.switch_fragment(Fragment::SqlCatalog);
                single(|out| self.write_table_exists(&context, out, table))
            }
            QueryKind::FieldExists { table, field } => {
                ensure_table(table)?;
                let context = context.switch_fragment(Fragment::SqlCatalog);
                single(|out| self.write_field_exists(&context, out, table, field))
            }
            QueryKind::IndexExists { table, index } => {
                ensure_table(table)?;
                let context = context.switch_fragment(Fragment::SqlCatalog);
                single(|out| self.write_index_exists(&context, out, table, index))
            }
            QueryKind::AddIndex { table, index } => {
                ensure_table(table)?;
                ensure_not_empty(&index.fields, "index field", table)?;
                single(|out| self.write_create_index(context, out, table, index))
            }
            QueryKind::DropIndex { table, index } => {
                ensure_table(table)?;
                single(|out| self.write_drop_index(context, out, table, index))
            }
            QueryKind::AlterField { table, column } => {
                ensure_table(table)?;
                if column.name.is_empty() {
                    return Err(Error::Compile(format!(
                        "The field to alter on table `{}` has no name",
                        table
                    )));
                }
                self.write_alter_field(context, table, column)
            }
            QueryKind::TableInfo { table } => {
                ensure_table(table)?;
                let context = context.switch_fragment(Fragment::SqlCatalog);
                let mut columns = String::with_capacity(256);
                self.write_table_info_columns(&context, &mut columns, table);
                let mut indices = String::with_capacity(512);
                self.write_table_info_indices(&context, &mut indices, table);
                vec![columns, indices]
            }
            QueryKind::CreateTable(v) => {
                ensure_table(&v.table)?;
                ensure_not_empty(&v.columns, "column", &v.table)?;
                single(|out| self.write_create_table(context, out, v))
            }
            QueryKind::DropTable { table, if_exists } => {
                ensure_table(table)?;
                single(|out| self.write_drop_table(context, out, table, *if_exists))
            }
            QueryKind::AddField { table, column } => {
                ensure_table(table)?;
                single(|out| self.write_add_field(context, out, table, column))
            }
            QueryKind::DropField { table, field } => {
                ensure_table(table)?;
                single(|out| self.write_drop_field(context, out, table, field))
            }
            QueryKind::Raw { sql, .. } => {
                if sql.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![sql.to_string()]
                }
            }
        })
    }

    /// `UPDATE t SET field = :field, ... WHERE <condition>`
    fn write_update(
        &self,
        context: &Context,
        out: &mut String,
        table: &str,
        fields: &[crate::Name],
        condition: &dyn Fn(&mut String),
    ) {
        let context = context.switch_fragment(Fragment::SqlUpdate);
        out.push_str("UPDATE ");
        self.write_table_ref(&context, out, table);
        out.push_str("\nSET ");
        separated_by(
            out,
            fields,
            |out, v| {
                self.write_identifier_quoted(&context, out, v);
                out.push_str(" = ");
                self.write_placeholder(&context, out, v);
            },
            ", ",
        );
        out.push_str("\nWHERE ");
        condition(out);
        out.push(';');
    }
}

/// Base rules only, closest to standard SQL.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl SqlWriter for GenericSqlWriter {}
