use crate::{Error, Result, Row, Value};
use std::collections::BTreeMap;

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Type as reported by the engine.
    pub column_type: String,
    /// Default expression as reported by the engine.
    pub default: Option<String>,
    pub allow_null: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub fields: Vec<String>,
    pub unique: bool,
}

/// Engine independent description of a table.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    /// In declaration order.
    pub columns: Vec<ColumnInfo>,
    pub primary_key: Vec<String>,
    /// Secondary indices by name, without the `{prefix}{table}_` namespace.
    pub indices: BTreeMap<String, IndexInfo>,
    /// Field sets of the unique secondary indices.
    pub unique: Vec<Vec<String>>,
}

fn text(row: &Row, label: &str) -> Option<String> {
    row.get(label)
        .and_then(Value::to_text)
        .map(|v| v.into_owned())
}

fn required(row: &Row, label: &str) -> Result<String> {
    text(row, label).ok_or_else(|| {
        Error::Conversion(format!("The catalog row has no value for `{}`", label))
    })
}

fn flag(row: &Row, label: &str) -> Option<bool> {
    row.get(label).and_then(Value::as_bool)
}

fn ordinal(row: &Row, label: &str) -> i64 {
    row.get(label)
        .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|v| v.parse().ok())))
        .unwrap_or(0)
}

#[derive(Default)]
struct IndexRows {
    unique: bool,
    primary: bool,
    members: Vec<(i64, String)>,
}

impl TableInfo {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|v| v.name == name)
    }

    /// Fold the rows of the two catalog probes.
    ///
    /// `columns` rows are labeled `name, type, default, allow_null, pk` and
    /// `indices` rows `index_name, is_unique, is_primary, column_name, seqno`.
    /// `index_prefix` (usually `{prefix}{table}_`) is stripped from index names.
    pub fn from_catalog(index_prefix: &str, columns: &[Row], indices: &[Row]) -> Result<TableInfo> {
        let mut result = TableInfo::default();
        let mut primary_key = Vec::new();
        for row in columns {
            let name = required(row, "name")?;
            let pk = ordinal(row, "pk");
            if pk > 0 {
                primary_key.push((pk, name.clone()));
            }
            result.columns.push(ColumnInfo {
                column_type: text(row, "type").unwrap_or_default(),
                default: text(row, "default"),
                allow_null: flag(row, "allow_null").unwrap_or(true),
                name,
            });
        }
        primary_key.sort_by_key(|(ordinal, _)| *ordinal);
        result.primary_key = primary_key.into_iter().map(|(_, name)| name).collect();

        let mut order = Vec::new();
        let mut groups: BTreeMap<String, IndexRows> = BTreeMap::new();
        for row in indices {
            let name = required(row, "index_name")?;
            let group = groups.entry(name.clone()).or_insert_with(|| {
                order.push(name);
                IndexRows::default()
            });
            group.unique |= flag(row, "is_unique").unwrap_or(false);
            group.primary |= flag(row, "is_primary").unwrap_or(false);
            group
                .members
                .push((ordinal(row, "seqno"), required(row, "column_name")?));
        }
        for name in order {
            let Some(mut group) = groups.remove(&name) else {
                continue;
            };
            group.members.sort_by_key(|(seqno, _)| *seqno);
            let fields: Vec<String> = group.members.into_iter().map(|(_, v)| v).collect();
            if group.primary {
                if result.primary_key.is_empty() {
                    result.primary_key = fields;
                }
                continue;
            }
            if group.unique {
                result.unique.push(fields.clone());
            }
            let name = name
                .strip_prefix(index_prefix)
                .filter(|v| !v.is_empty())
                .map(ToOwned::to_owned)
                .unwrap_or(name);
            result.indices.insert(
                name,
                IndexInfo {
                    fields,
                    unique: group.unique,
                },
            );
        }

        for column in &mut result.columns {
            if result.primary_key.contains(&column.name) {
                column.allow_null = false;
            }
        }
        Ok(result)
    }
}
