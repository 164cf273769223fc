use crate::Value;
use std::borrow::Cow;

/// Abstract column type, every dialect maps it to its closest native type.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Int8,
    Int16,
    #[default]
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    /// Auto incremented 32 bits identifier.
    Serial,
    /// Auto incremented 64 bits identifier.
    BigSerial,
    Float32,
    Float64,
    Decimal(u8, u8),
    Char(u32),
    Varchar(u32),
    Text,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    Uuid,
    /// Written verbatim.
    Custom(Cow<'static, str>),
}

impl ColumnType {
    /// Type able to hold `value`, `None` for untyped nulls and lists.
    pub fn for_value(value: &Value) -> Option<ColumnType> {
        Some(match value {
            Value::Boolean(..) => ColumnType::Boolean,
            Value::Int8(..) => ColumnType::Int8,
            Value::Int16(..) => ColumnType::Int16,
            Value::Int32(..) => ColumnType::Int32,
            Value::Int64(..) => ColumnType::Int64,
            Value::UInt8(..) => ColumnType::UInt8,
            Value::UInt16(..) => ColumnType::UInt16,
            Value::UInt32(..) => ColumnType::UInt32,
            Value::UInt64(..) => ColumnType::UInt64,
            Value::Float32(..) => ColumnType::Float32,
            Value::Float64(..) => ColumnType::Float64,
            Value::Decimal(..) => ColumnType::Decimal(0, 0),
            Value::Varchar(..) => ColumnType::Text,
            Value::Blob(..) => ColumnType::Blob,
            Value::Date(..) => ColumnType::Date,
            Value::Time(..) => ColumnType::Time,
            Value::Timestamp(..) => ColumnType::Timestamp,
            Value::TimestampWithTimezone(..) => ColumnType::TimestampWithTimezone,
            Value::Uuid(..) => ColumnType::Uuid,
            Value::Null | Value::List(..) => return None,
        })
    }
    pub fn is_serial(&self) -> bool {
        matches!(self, ColumnType::Serial | ColumnType::BigSerial)
    }
    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            ColumnType::UInt8 | ColumnType::UInt16 | ColumnType::UInt32 | ColumnType::UInt64
        )
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Cow<'static, str>,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<Value>,
}

impl ColumnDef {
    /// Nullable column without default.
    pub fn new(name: impl Into<Cow<'static, str>>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            default: None,
        }
    }
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Index over one or more fields. The name is local to the table, the
/// identifier created in the database is `{table}_{name}`.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: Cow<'static, str>,
    pub fields: Vec<Cow<'static, str>>,
    pub unique: bool,
}

impl IndexDef {
    pub fn new<F, I>(name: impl Into<Cow<'static, str>>, fields: I) -> Self
    where
        F: Into<Cow<'static, str>>,
        I: IntoIterator<Item = F>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}
