use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::{
    borrow::Cow,
    fmt::{self, Display},
};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed value used for parameters and fetched columns.
///
/// Typed variants carry `None` to represent a `NULL` of that type, drivers use
/// it to pick the right binding. `List` is only meaningful as a parameter: it
/// is expanded into one placeholder per element before execution.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    List(Option<Vec<Value>>, /* type: */ Box<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Boolean(None)
                | Value::Int8(None)
                | Value::Int16(None)
                | Value::Int32(None)
                | Value::Int64(None)
                | Value::UInt8(None)
                | Value::UInt16(None)
                | Value::UInt32(None)
                | Value::UInt64(None)
                | Value::Float32(None)
                | Value::Float64(None)
                | Value::Decimal(None)
                | Value::Varchar(None)
                | Value::Blob(None)
                | Value::Date(None)
                | Value::Time(None)
                | Value::Timestamp(None)
                | Value::TimestampWithTimezone(None)
                | Value::Uuid(None)
                | Value::List(None, ..)
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(Some(..), ..))
    }

    /// Any integer (or boolean) widened to `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Value::Boolean(Some(v)) => v as i128,
            Value::Int8(Some(v)) => v as i128,
            Value::Int16(Some(v)) => v as i128,
            Value::Int32(Some(v)) => v as i128,
            Value::Int64(Some(v)) => v as i128,
            Value::UInt8(Some(v)) => v as i128,
            Value::UInt16(Some(v)) => v as i128,
            Value::UInt32(Some(v)) => v as i128,
            Value::UInt64(Some(v)) => v as i128,
            Value::Decimal(Some(v)) if v.fract().is_zero() => v.to_i128()?,
            _ => return None,
        })
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float32(Some(v)) => Some(v as f64),
            Value::Float64(Some(v)) => Some(v),
            Value::Decimal(Some(v)) => v.to_f64(),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(Some(v)) => Some(v),
            _ => None,
        }
    }

    /// Lenient boolean used when reading catalogs: engines report flags as
    /// booleans, integers or `YES`/`NO` style strings.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(Some(v)) => Some(*v),
            Value::Varchar(Some(v)) => match v.to_ascii_lowercase().as_str() {
                "1" | "t" | "true" | "y" | "yes" => Some(true),
                "0" | "f" | "false" | "n" | "no" => Some(false),
                _ => None,
            },
            _ => self.as_i128().map(|v| v != 0),
        }
    }

    /// Textual rendering of scalar values, `None` for nulls and lists.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        if self.is_null() || self.is_list() {
            return None;
        }
        Some(match self {
            Value::Varchar(Some(v)) => Cow::Borrowed(v.as_str()),
            Value::Blob(Some(v)) => String::from_utf8_lossy(v),
            _ => Cow::Owned(self.to_string()),
        })
    }

    /// Empty value of the same type.
    pub fn as_type(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int8(..) => Value::Int8(None),
            Value::Int16(..) => Value::Int16(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::UInt8(..) => Value::UInt8(None),
            Value::UInt16(..) => Value::UInt16(None),
            Value::UInt32(..) => Value::UInt32(None),
            Value::UInt64(..) => Value::UInt64(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(..) => Value::Decimal(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Time(..) => Value::Time(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(None),
            Value::Uuid(..) => Value::Uuid(None),
            Value::List(.., inner) => Value::List(None, inner.clone()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Boolean(Some(v)) => write!(f, "{}", v),
            Value::Int8(Some(v)) => write!(f, "{}", v),
            Value::Int16(Some(v)) => write!(f, "{}", v),
            Value::Int32(Some(v)) => write!(f, "{}", v),
            Value::Int64(Some(v)) => write!(f, "{}", v),
            Value::UInt8(Some(v)) => write!(f, "{}", v),
            Value::UInt16(Some(v)) => write!(f, "{}", v),
            Value::UInt32(Some(v)) => write!(f, "{}", v),
            Value::UInt64(Some(v)) => write!(f, "{}", v),
            Value::Float32(Some(v)) => write!(f, "{}", v),
            Value::Float64(Some(v)) => write!(f, "{}", v),
            Value::Decimal(Some(v)) => write!(f, "{}", v),
            Value::Varchar(Some(v)) => write!(f, "{}", v),
            Value::Blob(Some(v)) => {
                f.write_str("x'")?;
                for b in v.iter() {
                    write!(f, "{:02X}", b)?;
                }
                f.write_str("'")
            }
            Value::Date(Some(v)) => write!(f, "{}", v),
            Value::Time(Some(v)) => write_time(f, v),
            Value::Timestamp(Some(v)) => {
                write!(f, "{} ", v.date())?;
                write_time(f, &v.time())
            }
            Value::TimestampWithTimezone(Some(v)) => {
                write!(f, "{} ", v.date())?;
                write_time(f, &v.time())?;
                let (h, m, _) = v.offset().as_hms();
                let sign = if v.offset().is_negative() { '-' } else { '+' };
                write!(f, "{}{:02}:{:02}", sign, h.abs(), m.abs())
            }
            Value::Uuid(Some(v)) => write!(f, "{}", v),
            Value::List(Some(v), ..) => {
                f.write_str("[")?;
                for (i, v) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            _ => f.write_str("NULL"),
        }
    }
}

fn write_time(f: &mut fmt::Formatter<'_>, value: &Time) -> fmt::Result {
    write!(
        f,
        "{:02}:{:02}:{:02}",
        value.hour(),
        value.minute(),
        value.second()
    )?;
    let mut subsecond = value.nanosecond();
    if subsecond == 0 {
        return Ok(());
    }
    let mut width = 9;
    while subsecond % 10 == 0 {
        subsecond /= 10;
        width -= 1;
    }
    write!(f, ".{:0width$}", subsecond)
}
