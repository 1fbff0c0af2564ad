#[cfg(test)]
mod tests {
    use keel_core::{AsValue, Value};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::macros::{date, datetime, time};
    use uuid::Uuid;

    #[test]
    fn nullable_flags() {
        assert!(!i32::NULLABLE);
        assert!(!String::NULLABLE);
        assert!(Option::<i32>::NULLABLE);
        assert!(Box::<Option<String>>::NULLABLE);
        assert!(!Box::<Decimal>::NULLABLE);
    }

    #[test]
    fn empty_values() {
        assert_eq!(i64::as_empty_value(), Value::Int64(None));
        assert_eq!(Option::<bool>::as_empty_value(), Value::Boolean(None));
        assert!(Uuid::as_empty_value().is_null());
        assert!(Value::Null.is_null());
        assert!(!Value::Varchar(Some("".into())).is_null());
        assert!(Vec::<i8>::as_empty_value().same_type(&vec![1i8].as_value()));
        assert!(!Vec::<i8>::as_empty_value().same_type(&vec![1i16].as_value()));
    }

    #[test]
    fn zero_values() {
        assert_eq!(f64::as_empty_value().zero_of(), Some(Value::Float64(Some(0.0))));
        assert_eq!(bool::as_empty_value().zero_of(), Some(Value::Boolean(Some(false))));
        assert_eq!(
            String::as_empty_value().zero_of(),
            Some(Value::Varchar(Some(String::new())))
        );
        assert_eq!(Uuid::as_empty_value().zero_of(), None);
        assert_eq!(time::Date::as_empty_value().zero_of(), None);
    }

    #[test]
    fn widening() {
        assert_eq!(i64::try_from_value(Value::Int32(Some(-5))).unwrap(), -5);
        assert_eq!(i64::try_from_value(Value::UInt32(Some(5))).unwrap(), 5);
        assert_eq!(i128::try_from_value(Value::UInt64(Some(u64::MAX))).unwrap(), u64::MAX as i128);
        assert_eq!(f64::try_from_value(Value::Float32(Some(1.5))).unwrap(), 1.5);
        assert_eq!(
            Decimal::try_from_value(Value::Int64(Some(12))).unwrap(),
            Decimal::new(12, 0)
        );
        assert!(bool::try_from_value(Value::Int8(Some(3))).unwrap());
        assert_eq!(String::try_from_value(Value::Char(Some('k'))).unwrap(), "k");
        assert_eq!(
            time::OffsetDateTime::try_from_value(Value::Timestamp(Some(datetime!(2025-02-03 04:05:06))))
                .unwrap(),
            datetime!(2025-02-03 04:05:06 UTC)
        );
    }

    #[test]
    fn narrowing_out_of_range() {
        assert_eq!(i8::try_from_value(Value::Int16(Some(127))).unwrap(), 127);
        assert!(i8::try_from_value(Value::Int16(Some(128))).is_err());
        assert!(u8::try_from_value(Value::Int16(Some(-1))).is_err());
        assert!(i32::try_from_value(Value::Int64(Some(i64::MAX))).is_err());
        assert!(i32::try_from_value(Value::Decimal(Some(Decimal::new(15, 1)), 0, 1)).is_err());
        assert_eq!(
            i32::try_from_value(Value::Decimal(Some(Decimal::new(40, 1)), 0, 1)).unwrap(),
            4
        );
        assert!(i16::try_from_value(Value::Float64(Some(1.0))).is_err());
        assert!(char::try_from_value(Value::Varchar(Some("ab".into()))).is_err());
    }

    #[test]
    fn unknown_text() {
        assert_eq!(i32::try_from_value(Value::Unknown(Some("-42".into()))).unwrap(), -42);
        assert!(i32::try_from_value(Value::Unknown(Some("42abc".into()))).is_err());
        assert!(u16::try_from_value(Value::Unknown(Some("70000".into()))).is_err());
        assert_eq!(f32::try_from_value(Value::Unknown(Some("2.5".into()))).unwrap(), 2.5);
        assert!(bool::try_from_value(Value::Unknown(Some("T".into()))).unwrap());
        assert!(!bool::try_from_value(Value::Unknown(Some("false".into()))).unwrap());
        assert_eq!(
            String::try_from_value(Value::Unknown(Some("plain".into()))).unwrap(),
            "plain"
        );
        assert_eq!(
            Decimal::try_from_value(Value::Unknown(Some("-3.250".into()))).unwrap(),
            Decimal::from_str("-3.250").unwrap()
        );
        let blob = Box::<[u8]>::try_from_value(Value::Unknown(Some("\\x0aff".into()))).unwrap();
        assert_eq!(*blob, [0x0a, 0xff]);
        assert_eq!(
            Uuid::try_from_value(Value::Unknown(Some(
                "67e55044-10b1-426f-9247-bb680e5fe0c8".into()
            )))
            .unwrap(),
            Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap()
        );
        assert_eq!(
            time::Date::try_from_value(Value::Unknown(Some("2024-02-29".into()))).unwrap(),
            date!(2024 - 02 - 29)
        );
        assert_eq!(
            time::Time::try_from_value(Value::Varchar(Some("13:45".into()))).unwrap(),
            time!(13:45)
        );
        assert_eq!(
            time::PrimitiveDateTime::try_from_value(Value::Unknown(Some(
                "2024-02-29 13:45:10".into()
            )))
            .unwrap(),
            datetime!(2024-02-29 13:45:10)
        );
        assert_eq!(
            Vec::<i64>::try_from_value(Value::Unknown(Some("[1, 2, 3]".into()))).unwrap(),
            [1, 2, 3]
        );
    }

    #[test]
    fn sign_without_digits() {
        for text in ["-", "+", "-x", "+.5"] {
            assert!(i32::try_from_value(Value::Unknown(Some(text.into()))).is_err());
            assert!(u64::try_from_value(Value::Unknown(Some(text.into()))).is_err());
            assert!(Decimal::try_from_value(Value::Unknown(Some(text.into()))).is_err());
        }
        let mut input = "-";
        assert!(i64::extract(&mut input).is_err());
        assert_eq!(input, "-");
        assert_eq!(i32::try_from_value(Value::Unknown(Some("+7".into()))).unwrap(), 7);
        assert_eq!(i32::try_from_value(Value::Unknown(Some("-0".into()))).unwrap(), 0);
    }

    #[test]
    fn quoted_strings() {
        let mut input = "'it''s', rest";
        assert_eq!(String::extract(&mut input).unwrap(), "it's");
        assert_eq!(input, ", rest");
        let mut input = "'open";
        assert!(String::extract(&mut input).is_err());
        assert_eq!(input, "'open");
    }

    #[test]
    fn optional() {
        assert_eq!(Option::<i64>::try_from_value(Value::Int64(None)).unwrap(), None);
        assert_eq!(Option::<i64>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i64>::try_from_value(Value::Int64(Some(3))).unwrap(),
            Some(3)
        );
        assert!(i64::try_from_value(Value::Null).is_err());
        assert_eq!(Option::<i32>::parse("NULL").unwrap(), None);
        assert_eq!(Option::<i32>::parse("12").unwrap(), Some(12));
        assert_eq!(None::<String>.as_value(), Value::Varchar(None));
    }

    #[test]
    fn into_value() {
        let value: Value = Box::new(7u16).into();
        assert_eq!(value, Value::UInt16(Some(7)));
        let value: Value = vec![Some(1i32), None].into();
        assert_eq!(
            value,
            Value::List(
                Some(vec![Value::Int32(Some(1)), Value::Int32(None)]),
                Box::new(Value::Int32(None))
            )
        );
    }
}
