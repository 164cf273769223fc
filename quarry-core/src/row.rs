use crate::{AsValue, Error, Outcome, Result, TableInfo, Value};
use std::sync::Arc;

pub type Labels = Arc<[String]>;

/// A fetched row, the labels are shared by every row of the same result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    labels: Labels,
    values: Box<[Value]>,
}

impl Row {
    pub fn new(labels: Labels, values: impl Into<Box<[Value]>>) -> Self {
        Self {
            labels,
            values: values.into(),
        }
    }
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn into_values(self) -> Box<[Value]> {
        self.values
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.labels.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Value of the column labeled `name`, exact match first then case insensitive.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let i = self
            .labels
            .iter()
            .position(|v| v == name)
            .or_else(|| self.labels.iter().position(|v| v.eq_ignore_ascii_case(name)))?;
        self.values.get(i)
    }

    pub fn get_as<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| Error::Conversion(format!("The row has no column `{}`", name)))?;
        T::try_from_value(value.clone())
    }
}

/// What an upsert did, the numeric codes are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted = 1,
    Updated = 2,
}

impl UpsertOutcome {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Result of [`Connection::execute`](crate::Connection::execute), the variant
/// depends on the kind of query.
#[derive(Debug)]
pub enum QueryResult {
    Rows(Vec<Row>),
    Affected(u64),
    Upserted(UpsertOutcome),
    Exists(bool),
    Schema(Outcome),
    TableInfo(TableInfo),
}

impl QueryResult {
    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            QueryResult::Rows(v) => Some(v),
            _ => None,
        }
    }
    pub fn affected(&self) -> Option<u64> {
        match self {
            QueryResult::Affected(v) => Some(*v),
            _ => None,
        }
    }
    pub fn upserted(&self) -> Option<UpsertOutcome> {
        match self {
            QueryResult::Upserted(v) => Some(*v),
            _ => None,
        }
    }
    pub fn exists(&self) -> Option<bool> {
        match self {
            QueryResult::Exists(v) => Some(*v),
            _ => None,
        }
    }
    pub fn into_outcome(self) -> Option<Outcome> {
        match self {
            QueryResult::Schema(v) => Some(v),
            _ => None,
        }
    }
    pub fn into_table_info(self) -> Option<TableInfo> {
        match self {
            QueryResult::TableInfo(v) => Some(v),
            _ => None,
        }
    }
}
