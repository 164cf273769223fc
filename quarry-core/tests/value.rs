#[cfg(test)]
mod tests {
    use quarry_core::{AsValue, Error, Value};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::{Date, Month, PrimitiveDateTime, Time, UtcOffset};
    use uuid::Uuid;

    #[test]
    fn value_none() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
        assert!(Value::Int64(None).is_null());
        assert!(Option::<String>::None.as_value().is_null());
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::try_from_value(5i64.into()).unwrap(), Some(5));
    }

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Varchar(Some("true".into())));
        assert!(bool::try_from_value(val).unwrap());
        assert!(bool::try_from_value(1i8.into()).unwrap());
        assert!(bool::try_from_value(8i16.into()).unwrap());
        assert!(!bool::try_from_value(0i64.into()).unwrap());
        assert!(bool::try_from_value(2u64.into()).unwrap());
        assert!(bool::try_from_value(0.5f32.into()).is_err());
    }

    #[test]
    fn value_integers() {
        let val: Value = 127i8.into();
        assert_eq!(val, Value::Int8(Some(127)));
        assert_eq!(i64::try_from_value(val).unwrap(), 127);
        assert_eq!(u8::try_from_value(200i64.into()).unwrap(), 200);
        assert_eq!(i32::try_from_value(true.into()).unwrap(), 1);
        assert!(matches!(
            i8::try_from_value(300i32.into()),
            Err(Error::Conversion(..))
        ));
        assert!(matches!(
            u32::try_from_value((-1i64).into()),
            Err(Error::Conversion(..))
        ));
        assert_eq!(
            i64::try_from_value(Value::Decimal(Some(Decimal::from(42)))).unwrap(),
            42
        );
        assert!(i64::try_from_value(Value::Decimal(Some(Decimal::from_str("4.2").unwrap()))).is_err());
        assert!(i32::try_from_value("12".into()).is_err());
    }

    #[test]
    fn value_floats() {
        assert_eq!(f64::try_from_value(1.5f32.into()).unwrap(), 1.5);
        assert_eq!(f64::try_from_value(3i32.into()).unwrap(), 3.0);
        assert_eq!(f32::try_from_value(0.25f64.into()).unwrap(), 0.25);
        assert_eq!(Value::Float64(Some(2.5)).as_f64(), Some(2.5));
    }

    #[test]
    fn value_text_and_bytes() {
        let val: Value = "hello".into();
        assert_eq!(val.as_str(), Some("hello"));
        assert_eq!(String::try_from_value(val).unwrap(), "hello");
        let blob: Value = vec![1u8, 2, 255].into();
        assert_eq!(blob, Value::Blob(Some(vec![1u8, 2, 255].into_boxed_slice())));
        assert_eq!(blob.to_string(), "x'0102FF'");
        assert_eq!(Vec::<u8>::try_from_value("ab".into()).unwrap(), b"ab");
        assert_eq!(
            Decimal::try_from_value("12.50".into()).unwrap(),
            Decimal::from_str("12.50").unwrap()
        );
    }

    #[test]
    fn value_uuid() {
        let id = Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(Value::from(id), Value::Uuid(Some(id)));
        assert_eq!(
            Uuid::try_from_value("67e55044-10b1-426f-9247-bb680e5fe0c8".into()).unwrap(),
            id
        );
        assert_eq!(
            Uuid::try_from_value(Value::Blob(Some(id.as_bytes().to_vec().into()))).unwrap(),
            id
        );
        assert!(Uuid::try_from_value("nope".into()).is_err());
    }

    #[test]
    fn value_temporal_display() {
        let date = Date::from_calendar_date(2024, Month::February, 29).unwrap();
        let time = Time::from_hms_micro(13, 5, 9, 120_000).unwrap();
        assert_eq!(Value::from(date).to_string(), "2024-02-29");
        assert_eq!(Value::from(time).to_string(), "13:05:09.12");
        let timestamp = PrimitiveDateTime::new(date, time);
        assert_eq!(Value::from(timestamp).to_string(), "2024-02-29 13:05:09.12");
        let offset = timestamp.assume_offset(UtcOffset::from_hms(-3, -30, 0).unwrap());
        assert_eq!(
            Value::from(offset).to_string(),
            "2024-02-29 13:05:09.12-03:30"
        );
    }

    #[test]
    fn value_lists() {
        let list: Value = vec![1i64, 2, 3].into();
        assert!(list.is_list());
        assert_eq!(list.to_string(), "[1, 2, 3]");
        assert_eq!(Vec::<i64>::try_from_value(list).unwrap(), [1, 2, 3]);
        let empty: Value = Vec::<String>::new().into();
        assert!(empty.is_list());
        assert!(empty.to_text().is_none());
    }

    #[test]
    fn lenient_flags() {
        assert_eq!(Value::from("YES").as_bool(), Some(true));
        assert_eq!(Value::from("no").as_bool(), Some(false));
        assert_eq!(Value::from("t").as_bool(), Some(true));
        assert_eq!(Value::from("maybe").as_bool(), None);
        assert_eq!(Value::Int64(Some(0)).as_bool(), Some(false));
        assert_eq!(Value::Int32(None).as_bool(), None);
    }

    #[test]
    fn as_type_keeps_the_variant() {
        assert_eq!(Value::Int16(Some(3)).as_type(), Value::Int16(None));
        assert_eq!(Value::from("x").as_type(), Value::Varchar(None));
    }
}
