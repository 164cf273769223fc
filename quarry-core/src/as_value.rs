use crate::{Error, Result, Value};
use rust_decimal::Decimal;
use std::any;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamic [`Value`].
///
/// `try_from_value` accepts the canonical variant and, for numbers, any other
/// integer width as long as the value fits.
/// ```rust
/// use quarry_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert_eq!(v, Value::Int32(Some(42)));
/// assert_eq!(i64::try_from_value(v).unwrap(), 42);
/// ```
pub trait AsValue {
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn mismatch<T>(value: &Value) -> Error {
    Error::Conversion(format!(
        "Cannot convert {:?} into {}",
        value,
        any::type_name::<T>()
    ))
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let $destination(Some(v)) = value {
                    return Ok(v);
                }
                let Some(wide) = value.as_i128() else {
                    return Err(mismatch::<Self>(&value));
                };
                <$source>::try_from(wide).map_err(|_| {
                    Error::Conversion(format!(
                        "Value {} is out of range for {}",
                        wide,
                        any::type_name::<Self>()
                    ))
                })
            }
        }
    };
}

impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat $(if $guard:expr)? => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $($pat_rest $(if $guard)? => $expr_rest,)*
                    #[allow(unreachable_patterns)]
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value!(
    bool,
    Value::Boolean,
    ref v if v.as_i128().is_some() => Ok(v.as_i128() != Some(0)),
);
impl_as_value!(
    f32,
    Value::Float32,
    Value::Float64(Some(v)) => Ok(v as f32),
);
impl_as_value!(
    f64,
    Value::Float64,
    ref v if v.as_f64().is_some() => v.as_f64().ok_or_else(|| mismatch::<f64>(v)),
);
impl_as_value!(
    Decimal,
    Value::Decimal,
    Value::Varchar(Some(v)) => v
        .parse::<Decimal>()
        .map_err(|e| Error::Conversion(e.to_string())),
);
impl_as_value!(String, Value::Varchar);
impl_as_value!(
    Box<[u8]>,
    Value::Blob,
    Value::Varchar(Some(v)) => Ok(v.into_bytes().into_boxed_slice()),
);
impl_as_value!(
    Vec<u8>,
    Value::Blob,
    Value::Varchar(Some(v)) => Ok(v.into_bytes()),
);
impl_as_value!(Date, Value::Date);
impl_as_value!(Time, Value::Time);
impl_as_value!(PrimitiveDateTime, Value::Timestamp);
impl_as_value!(OffsetDateTime, Value::TimestampWithTimezone);
impl_as_value!(
    Uuid,
    Value::Uuid,
    Value::Varchar(Some(v)) => Uuid::parse_str(&v).map_err(|e| Error::Conversion(e.to_string())),
    Value::Blob(Some(v)) => Uuid::from_slice(&v).map_err(|e| Error::Conversion(e.to_string())),
);

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::try_from_value(value).map(Some)
        }
    }
}

/// Lists are bound as array parameters, see [`Params`](crate::Params).
macro_rules! impl_as_value_list {
    ($($source:ty),+) => {
        $(
            impl AsValue for Vec<$source> {
                fn as_empty_value() -> Value {
                    Value::List(None, Box::new(<$source>::as_empty_value()))
                }
                fn as_value(self) -> Value {
                    Value::List(
                        Some(self.into_iter().map(AsValue::as_value).collect()),
                        Box::new(<$source>::as_empty_value()),
                    )
                }
                fn try_from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::List(Some(v), ..) => {
                            v.into_iter().map(<$source>::try_from_value).collect()
                        }
                        _ => Err(mismatch::<Self>(&value)),
                    }
                }
            }
        )+
    };
}

impl_as_value_list!(i8, i16, i32, i64, u16, u32, u64, f32, f64, bool, String, Uuid);

