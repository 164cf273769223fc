use mysql::{Column, consts::ColumnType};
use quarry_core::{Error, Result, Value};
use rust_decimal::Decimal;
use time::{Date, Month, PrimitiveDateTime, Time, UtcOffset};

/// Character set number MySQL reports for binary strings.
const BINARY_CHARSET: u16 = 63;

pub(crate) struct ValueWrap(pub(crate) Value);

impl From<Value> for ValueWrap {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn decode_error(value: &mysql::Value, column: &Column) -> Error {
    Error::Conversion(format!(
        "Cannot decode {:?} from the MySQL column `{}`",
        value,
        column.name_str()
    ))
}

fn date(year: u16, month: u8, day: u8) -> Option<Date> {
    Date::from_calendar_date(year as i32, Month::try_from(month).ok()?, day).ok()
}

impl ValueWrap {
    /// Decode a fetched value, the column decides between text, blob and temporal variants.
    pub(crate) fn decode(value: &mysql::Value, column: &Column) -> Result<Self> {
        let column_type = column.column_type();
        Ok(ValueWrap(match value {
            mysql::Value::NULL => Value::Null,
            mysql::Value::Bytes(v) => match column_type {
                ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
                    let text = String::from_utf8_lossy(v);
                    Value::Decimal(Some(
                        text.parse::<Decimal>()
                            .map_err(|_| decode_error(value, column))?,
                    ))
                }
                _ if column.character_set() == BINARY_CHARSET => {
                    Value::Blob(Some(v.clone().into_boxed_slice()))
                }
                _ => Value::Varchar(Some(String::from_utf8_lossy(v).into_owned())),
            },
            mysql::Value::Int(v) => Value::Int64(Some(*v)),
            mysql::Value::UInt(v) => Value::UInt64(Some(*v)),
            mysql::Value::Float(v) => Value::Float32(Some(*v)),
            mysql::Value::Double(v) => Value::Float64(Some(*v)),
            &mysql::Value::Date(year, month, day, hour, minute, second, micros) => {
                let day = date(year, month, day).ok_or_else(|| decode_error(value, column))?;
                if column_type == ColumnType::MYSQL_TYPE_DATE {
                    Value::Date(Some(day))
                } else {
                    let time = Time::from_hms_micro(hour, minute, second, micros)
                        .map_err(|_| decode_error(value, column))?;
                    Value::Timestamp(Some(PrimitiveDateTime::new(day, time)))
                }
            }
            // Durations beyond a day or negative have no time of day equivalent
            &mysql::Value::Time(false, 0, hour, minute, second, micros) => Value::Time(Some(
                Time::from_hms_micro(hour, minute, second, micros)
                    .map_err(|_| decode_error(value, column))?,
            )),
            mysql::Value::Time(..) => return Err(decode_error(value, column)),
        }))
    }
}

impl TryFrom<ValueWrap> for mysql::Value {
    type Error = Error;

    fn try_from(value: ValueWrap) -> Result<Self> {
        type MySqlValue = mysql::Value;
        let timestamp = |v: PrimitiveDateTime| -> Result<MySqlValue> {
            let year = u16::try_from(v.year()).map_err(|_| {
                Error::Parameter(format!("Date {} is out of range for MySQL", v))
            })?;
            Ok(MySqlValue::Date(
                year,
                v.month().into(),
                v.day(),
                v.hour(),
                v.minute(),
                v.second(),
                v.microsecond(),
            ))
        };
        Ok(match value.0 {
            ref v if v.is_null() => MySqlValue::NULL,
            Value::Boolean(Some(v)) => MySqlValue::from(v),
            Value::Int8(Some(v)) => MySqlValue::from(v),
            Value::Int16(Some(v)) => MySqlValue::from(v),
            Value::Int32(Some(v)) => MySqlValue::from(v),
            Value::Int64(Some(v)) => MySqlValue::from(v),
            Value::UInt8(Some(v)) => MySqlValue::from(v),
            Value::UInt16(Some(v)) => MySqlValue::from(v),
            Value::UInt32(Some(v)) => MySqlValue::from(v),
            Value::UInt64(Some(v)) => MySqlValue::from(v),
            Value::Float32(Some(v)) => MySqlValue::Float(v),
            Value::Float64(Some(v)) => MySqlValue::Double(v),
            Value::Decimal(Some(v)) => MySqlValue::Bytes(v.to_string().into_bytes()),
            Value::Varchar(Some(v)) => MySqlValue::Bytes(v.into_bytes()),
            Value::Blob(Some(v)) => MySqlValue::Bytes(v.into_vec()),
            Value::Date(Some(v)) => timestamp(PrimitiveDateTime::new(v, Time::MIDNIGHT))?,
            Value::Time(Some(v)) => MySqlValue::Time(
                false,
                0,
                v.hour(),
                v.minute(),
                v.second(),
                v.microsecond(),
            ),
            Value::Timestamp(Some(v)) => timestamp(v)?,
            Value::TimestampWithTimezone(Some(v)) => {
                let v = v.to_offset(UtcOffset::UTC);
                timestamp(PrimitiveDateTime::new(v.date(), v.time()))?
            }
            Value::Uuid(Some(v)) => MySqlValue::Bytes(v.hyphenated().to_string().into_bytes()),
            v => {
                return Err(Error::Parameter(format!(
                    "Cannot use a {:?} as a MySQL parameter",
                    v
                )));
            }
        })
    }
}

/// Escape `value` as a string literal the way `mysql_real_escape_string` does.
pub(crate) fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
