use bytes::BytesMut;
use postgres_types::{FromSql, IsNull, Kind, ToSql, Type, to_sql_checked};
use quarry_core::Value;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::{any, error::Error};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

/// Adapts [`Value`] to the Postgres wire types.
///
/// Binding follows the type the server inferred for the parameter, so an
/// integer can be sent to any numeric column as long as it fits.
#[derive(Debug)]
pub(crate) struct ValueHolder(pub(crate) Value);

impl From<Value> for ValueHolder {
    fn from(value: Value) -> Self {
        ValueHolder(value)
    }
}

fn mismatch(value: &Value, ty: &Type) -> BoxError {
    quarry_core::Error::Parameter(format!(
        "Cannot bind {:?} to a parameter of type `{}`",
        value, ty
    ))
    .into()
}

fn integer<T: TryFrom<i128>>(value: &Value, ty: &Type) -> Result<T, BoxError> {
    let wide = value.as_i128().ok_or_else(|| mismatch(value, ty))?;
    T::try_from(wide).map_err(|_| {
        quarry_core::Error::Parameter(format!(
            "Value {} is out of range for `{}` ({})",
            wide,
            ty,
            any::type_name::<T>()
        ))
        .into()
    })
}

impl ToSql for ValueHolder {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        let value = &self.0;
        if value.is_null() {
            return Ok(IsNull::Yes);
        }
        if let Kind::Domain(base) = ty.kind() {
            return self.to_sql(base, out);
        }
        match *ty {
            Type::BOOL => value.as_bool().ok_or_else(|| mismatch(value, ty))?.to_sql(ty, out),
            Type::CHAR => integer::<i8>(value, ty)?.to_sql(ty, out),
            Type::INT2 => integer::<i16>(value, ty)?.to_sql(ty, out),
            Type::INT4 => integer::<i32>(value, ty)?.to_sql(ty, out),
            Type::INT8 => integer::<i64>(value, ty)?.to_sql(ty, out),
            Type::OID => integer::<u32>(value, ty)?.to_sql(ty, out),
            Type::FLOAT4 => (value.as_f64().ok_or_else(|| mismatch(value, ty))? as f32).to_sql(ty, out),
            Type::FLOAT8 => value.as_f64().ok_or_else(|| mismatch(value, ty))?.to_sql(ty, out),
            Type::NUMERIC => match value {
                Value::Decimal(Some(v)) => v.to_sql(ty, out),
                Value::Float32(..) | Value::Float64(..) => value
                    .as_f64()
                    .and_then(Decimal::from_f64)
                    .ok_or_else(|| mismatch(value, ty))?
                    .to_sql(ty, out),
                _ => value
                    .as_i128()
                    .and_then(Decimal::from_i128)
                    .ok_or_else(|| mismatch(value, ty))?
                    .to_sql(ty, out),
            },
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => value
                .to_text()
                .ok_or_else(|| mismatch(value, ty))?
                .into_owned()
                .to_sql(ty, out),
            Type::JSON | Type::JSONB | Type::XML => match value {
                Value::Varchar(Some(v)) => v.to_sql(ty, out),
                _ => Err(mismatch(value, ty)),
            },
            Type::BYTEA => match value {
                Value::Blob(Some(v)) => v.as_ref().to_sql(ty, out),
                Value::Varchar(Some(v)) => v.as_bytes().to_sql(ty, out),
                _ => Err(mismatch(value, ty)),
            },
            Type::DATE => match value {
                Value::Date(Some(v)) => v.to_sql(ty, out),
                _ => Err(mismatch(value, ty)),
            },
            Type::TIME => match value {
                Value::Time(Some(v)) => v.to_sql(ty, out),
                _ => Err(mismatch(value, ty)),
            },
            Type::TIMESTAMP => match value {
                Value::Timestamp(Some(v)) => v.to_sql(ty, out),
                _ => Err(mismatch(value, ty)),
            },
            Type::TIMESTAMPTZ => match value {
                Value::TimestampWithTimezone(Some(v)) => v.to_sql(ty, out),
                _ => Err(mismatch(value, ty)),
            },
            Type::UUID => match value {
                Value::Uuid(Some(v)) => v.to_sql(ty, out),
                Value::Varchar(Some(v)) => Uuid::parse_str(v)?.to_sql(ty, out),
                _ => Err(mismatch(value, ty)),
            },
            _ => Err(quarry_core::Error::Parameter(format!(
                "The Postgres type `{}` is not supported as a parameter",
                ty
            ))
            .into()),
        }
    }

    fn accepts(_ty: &Type) -> bool
    where
        Self: Sized,
    {
        true
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for ValueHolder {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Self::from_sql_nullable(ty, Some(raw))
    }
    fn from_sql_null(ty: &Type) -> Result<Self, BoxError> {
        Self::from_sql_nullable(ty, None)
    }
    fn from_sql_nullable(ty: &Type, raw: Option<&'a [u8]>) -> Result<Self, BoxError> {
        if let Kind::Domain(base) = ty.kind() {
            return Self::from_sql_nullable(base, raw);
        }
        macro_rules! to_value {
            ($ty_var:ident, $raw:ident, $($($ty:path)|+ => ( $value:path, $source:ty $(, $additional:expr)* ) ,)+) => {
                match *$ty_var {
                    $($($ty)|+ => $value(match $raw {
                        Some($raw) => Some(<$source>::from_sql($ty_var, $raw)?.into()),
                        None => None,
                    } $(, $additional)*),)+
                    _ => {
                        if $raw.is_some() {
                            return Err(quarry_core::Error::Conversion(format!(
                                "Cannot decode the Postgres type `{}`",
                                $ty_var
                            ))
                            .into());
                        }
                        Value::Null
                    }
                }
            };
        }
        let value = to_value!(ty, raw,
            Type::BOOL => (Value::Boolean, bool),
            Type::CHAR => (Value::Int8, i8),
            Type::INT2 => (Value::Int16, i16),
            Type::INT4 => (Value::Int32, i32),
            Type::INT8 => (Value::Int64, i64),
            Type::FLOAT4 => (Value::Float32, f32),
            Type::FLOAT8 => (Value::Float64, f64),
            Type::NUMERIC => (Value::Decimal, Decimal),
            Type::OID => (Value::UInt32, u32),
            Type::VARCHAR
            | Type::TEXT
            | Type::NAME
            | Type::BPCHAR
            | Type::JSON
            | Type::XML
            | Type::UNKNOWN => (Value::Varchar, String),
            Type::BYTEA => (Value::Blob, Vec<u8>),
            Type::DATE => (Value::Date, Date),
            Type::TIME => (Value::Time, Time),
            Type::TIMESTAMP => (Value::Timestamp, PrimitiveDateTime),
            Type::TIMESTAMPTZ => (Value::TimestampWithTimezone, OffsetDateTime),
            Type::UUID => (Value::Uuid, Uuid),
            Type::INT2_ARRAY => (Value::List, VecWrap<ValueHolder>, Box::new(Value::Int16(None))),
            Type::INT4_ARRAY => (Value::List, VecWrap<ValueHolder>, Box::new(Value::Int32(None))),
            Type::INT8_ARRAY => (Value::List, VecWrap<ValueHolder>, Box::new(Value::Int64(None))),
            Type::FLOAT8_ARRAY => (Value::List, VecWrap<ValueHolder>, Box::new(Value::Float64(None))),
            Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => (Value::List, VecWrap<ValueHolder>, Box::new(Value::Varchar(None))),
        );
        Ok(value.into())
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

struct VecWrap<T>(Vec<T>);

impl<'a, T: FromSql<'a>> FromSql<'a> for VecWrap<T> {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Vec::<T>::from_sql(ty, raw).map(VecWrap)
    }
    fn accepts(ty: &Type) -> bool {
        Vec::<T>::accepts(ty)
    }
}

impl From<VecWrap<ValueHolder>> for Vec<Value> {
    fn from(value: VecWrap<ValueHolder>) -> Self {
        value.0.into_iter().map(|v| v.0).collect()
    }
}
