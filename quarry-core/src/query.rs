use crate::{ColumnDef, Dialect, IndexDef, Result};
use std::{
    borrow::Cow,
    sync::{Arc, OnceLock},
};

pub type Name = Cow<'static, str>;

fn names<N: Into<Name>>(values: impl IntoIterator<Item = N>) -> Vec<Name> {
    values.into_iter().map(Into::into).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// Predicate over fields, right hand sides are always named parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field <op> :param`
    Compare(Name, CompareOp, Name),
    /// `field IN :param`, the parameter is expected to be bound to a list.
    In(Name, Name),
    /// Pattern match `field LIKE :param`, case insensitive on every engine.
    Like(Name, Name),
    IsNull(Name),
    IsNotNull(Name),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    /// SQL fragment written verbatim.
    Raw(Name),
}

impl Condition {
    /// `field = :field`
    pub fn eq(field: impl Into<Name>) -> Self {
        let field = field.into();
        Condition::Compare(field.clone(), CompareOp::Equal, field)
    }
    pub fn compare(field: impl Into<Name>, op: CompareOp, param: impl Into<Name>) -> Self {
        Condition::Compare(field.into(), op, param.into())
    }
    pub fn is_in(field: impl Into<Name>, param: impl Into<Name>) -> Self {
        Condition::In(field.into(), param.into())
    }
    pub fn like(field: impl Into<Name>, param: impl Into<Name>) -> Self {
        Condition::Like(field.into(), param.into())
    }
    pub fn raw(sql: impl Into<Name>) -> Self {
        Condition::Raw(sql.into())
    }
    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::And(mut v) => {
                v.push(other);
                Condition::And(v)
            }
            v => Condition::And(vec![v, other]),
        }
    }
    pub fn or(self, other: Condition) -> Self {
        match self {
            Condition::Or(mut v) => {
                v.push(other);
                Condition::Or(v)
            }
            v => Condition::Or(vec![v, other]),
        }
    }
    pub fn not(self) -> Self {
        Condition::Not(Box::new(self))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    pub table: Name,
    /// Empty means every column.
    pub fields: Vec<Name>,
    pub condition: Option<Condition>,
    pub order_by: Vec<(Name, Order)>,
    /// Non positive values suppress the clause.
    pub limit: i64,
    /// Non positive values suppress the clause.
    pub offset: i64,
}

impl Select {
    pub fn new(table: impl Into<Name>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }
    pub fn fields<N: Into<Name>>(mut self, fields: impl IntoIterator<Item = N>) -> Self {
        self.fields = names(fields);
        self
    }
    pub fn filter(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
    pub fn order_by(mut self, field: impl Into<Name>, order: Order) -> Self {
        self.order_by.push((field.into(), order));
        self
    }
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Insert when no condition is present, update the matching rows otherwise.
/// Every field is bound to the parameter of the same name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InsertOrUpdate {
    pub table: Name,
    pub fields: Vec<Name>,
    pub condition: Option<Condition>,
}

impl InsertOrUpdate {
    pub fn insert<N: Into<Name>>(table: impl Into<Name>, fields: impl IntoIterator<Item = N>) -> Self {
        Self {
            table: table.into(),
            fields: names(fields),
            condition: None,
        }
    }
    pub fn update<N: Into<Name>>(
        table: impl Into<Name>,
        fields: impl IntoIterator<Item = N>,
        condition: Condition,
    ) -> Self {
        Self {
            table: table.into(),
            fields: names(fields),
            condition: Some(condition),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Delete {
    pub table: Name,
    /// `None` deletes every row.
    pub condition: Option<Condition>,
}

/// Insert or update by key. Keys and fields are bound to parameters of the
/// same name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Upsert {
    pub table: Name,
    pub keys: Vec<Name>,
    pub fields: Vec<Name>,
}

impl Upsert {
    pub fn new<K, F>(
        table: impl Into<Name>,
        keys: impl IntoIterator<Item = K>,
        fields: impl IntoIterator<Item = F>,
    ) -> Self
    where
        K: Into<Name>,
        F: Into<Name>,
    {
        Self {
            table: table.into(),
            keys: names(keys),
            fields: names(fields),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CreateTable {
    pub table: Name,
    pub columns: Vec<ColumnDef>,
    pub primary_key: Vec<Name>,
    pub if_not_exists: bool,
}

impl CreateTable {
    pub fn new(table: impl Into<Name>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }
    pub fn primary_key<N: Into<Name>>(mut self, fields: impl IntoIterator<Item = N>) -> Self {
        self.primary_key = names(fields);
        self
    }
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
    Select(Select),
    InsertOrUpdate(InsertOrUpdate),
    Delete(Delete),
    Upsert(Upsert),
    Truncate { table: Name },
    TableExists { table: Name },
    FieldExists { table: Name, field: Name },
    IndexExists { table: Name, index: Name },
    AddIndex { table: Name, index: IndexDef },
    DropIndex { table: Name, index: Name },
    /// Change the definition of the existing field `column.name`.
    AlterField { table: Name, column: ColumnDef },
    TableInfo { table: Name },
    CreateTable(CreateTable),
    DropTable { table: Name, if_exists: bool },
    AddField { table: Name, column: ColumnDef },
    DropField { table: Name, field: Name },
    /// Single statement written verbatim.
    Raw { sql: Name, returns_rows: bool },
}

impl QueryKind {
    /// Queries whose execution returns the fetched rows.
    pub fn returns_rows(&self) -> bool {
        matches!(
            self,
            QueryKind::Select(..) | QueryKind::Raw { returns_rows: true, .. }
        )
    }
    /// Schema operations whose driver failures are reported as [`Outcome`](crate::Outcome).
    pub fn is_soft_schema_operation(&self) -> bool {
        matches!(
            self,
            QueryKind::Truncate { .. }
                | QueryKind::AlterField { .. }
                | QueryKind::AddIndex { .. }
                | QueryKind::DropIndex { .. }
        )
    }
    /// Queries after which prepared statements may describe a stale schema.
    pub fn changes_schema(&self) -> bool {
        matches!(
            self,
            QueryKind::AlterField { .. }
                | QueryKind::CreateTable(..)
                | QueryKind::DropTable { .. }
                | QueryKind::AddField { .. }
                | QueryKind::DropField { .. }
                | QueryKind::Raw {
                    returns_rows: false,
                    ..
                }
        )
    }
    pub fn is_existence_check(&self) -> bool {
        matches!(
            self,
            QueryKind::TableExists { .. }
                | QueryKind::FieldExists { .. }
                | QueryKind::IndexExists { .. }
        )
    }
}

macro_rules! impl_into_query_kind {
    ($($source:ident),+) => {
        $(
            impl From<$source> for QueryKind {
                fn from(value: $source) -> Self {
                    QueryKind::$source(value)
                }
            }
        )+
    };
}
impl_into_query_kind!(Select, InsertOrUpdate, Delete, Upsert, CreateTable);

/// SQL statements produced by a [`Dialect`] for one query, executed in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub(crate) dialect: Dialect,
    pub(crate) statements: Arc<[Arc<str>]>,
}

impl Compiled {
    pub fn new(dialect: Dialect, statements: Vec<String>) -> Self {
        Self {
            dialect,
            statements: statements.into_iter().map(Into::into).collect(),
        }
    }
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }
    pub fn statements(&self) -> &[Arc<str>] {
        &self.statements
    }
    /// Nothing to execute.
    pub fn is_empty(&self) -> bool {
        self.statements.iter().all(|v| v.trim().is_empty())
    }
    /// The statements one per line, used for display and logging.
    pub fn sql(&self) -> String {
        self.statements
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A database operation plus its memoized compiled SQL.
///
/// The SQL is compiled the first time the query is executed and reused for
/// every later execution, only the parameters change. Prepared statements are
/// cached by the [`Connection`](crate::Connection) itself.
#[derive(Debug, Clone)]
pub struct Query {
    kind: QueryKind,
    compiled: OnceLock<Compiled>,
}

impl Query {
    pub fn new(kind: impl Into<QueryKind>) -> Self {
        Self {
            kind: kind.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> &QueryKind {
        &self.kind
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    pub fn compiled(&self) -> Option<&Compiled> {
        self.compiled.get()
    }

    /// Compile through `dialect` unless already compiled for it.
    ///
    /// A query compiled for a different dialect (or table prefix) is compiled
    /// again without replacing the memoized SQL.
    pub fn compile(&self, dialect: &Dialect) -> Result<Cow<'_, Compiled>> {
        if let Some(compiled) = self.compiled.get() {
            if compiled.dialect == *dialect {
                return Ok(Cow::Borrowed(compiled));
            }
            log::debug!(
                "Query compiled for {:?} is executed with {:?}, compiling without caching",
                compiled.dialect.kind(),
                dialect.kind()
            );
            return dialect.compile(&self.kind).map(Cow::Owned);
        }
        let compiled = dialect.compile(&self.kind)?;
        Ok(Cow::Borrowed(self.compiled.get_or_init(|| compiled)))
    }

    pub fn select(table: impl Into<Name>) -> Select {
        Select::new(table)
    }
    /// Caller written SQL not returning rows.
    ///
    /// Placeholders are found skipping quoted text, comments and Postgres
    /// dollar quoted bodies. MySQL backslash escapes inside string literals
    /// are not recognized: a literal containing `\'` followed by `:name` must
    /// be passed as a parameter instead. Executing it discards the cached
    /// prepared statements.
    pub fn raw(sql: impl Into<Name>) -> Self {
        QueryKind::Raw {
            sql: sql.into(),
            returns_rows: false,
        }
        .into()
    }
    pub fn raw_select(sql: impl Into<Name>) -> Self {
        QueryKind::Raw {
            sql: sql.into(),
            returns_rows: true,
        }
        .into()
    }
    pub fn truncate(table: impl Into<Name>) -> Self {
        QueryKind::Truncate {
            table: table.into(),
        }
        .into()
    }
    pub fn table_exists(table: impl Into<Name>) -> Self {
        QueryKind::TableExists {
            table: table.into(),
        }
        .into()
    }
    pub fn field_exists(table: impl Into<Name>, field: impl Into<Name>) -> Self {
        QueryKind::FieldExists {
            table: table.into(),
            field: field.into(),
        }
        .into()
    }
    pub fn index_exists(table: impl Into<Name>, index: impl Into<Name>) -> Self {
        QueryKind::IndexExists {
            table: table.into(),
            index: index.into(),
        }
        .into()
    }
    pub fn add_index(table: impl Into<Name>, index: IndexDef) -> Self {
        QueryKind::AddIndex {
            table: table.into(),
            index,
        }
        .into()
    }
    pub fn drop_index(table: impl Into<Name>, index: impl Into<Name>) -> Self {
        QueryKind::DropIndex {
            table: table.into(),
            index: index.into(),
        }
        .into()
    }
    pub fn alter_field(table: impl Into<Name>, column: ColumnDef) -> Self {
        QueryKind::AlterField {
            table: table.into(),
            column,
        }
        .into()
    }
    pub fn table_info(table: impl Into<Name>) -> Self {
        QueryKind::TableInfo {
            table: table.into(),
        }
        .into()
    }
    pub fn drop_table(table: impl Into<Name>, if_exists: bool) -> Self {
        QueryKind::DropTable {
            table: table.into(),
            if_exists,
        }
        .into()
    }
    pub fn add_field(table: impl Into<Name>, column: ColumnDef) -> Self {
        QueryKind::AddField {
            table: table.into(),
            column,
        }
        .into()
    }
    pub fn drop_field(table: impl Into<Name>, field: impl Into<Name>) -> Self {
        QueryKind::DropField {
            table: table.into(),
            field: field.into(),
        }
        .into()
    }
}

impl<T: Into<QueryKind>> From<T> for Query {
    fn from(value: T) -> Self {
        Query::new(value)
    }
}
