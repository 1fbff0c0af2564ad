use crate::{Error, Result, Value, consume_while, truncate_long};
use anyhow::Context;
use atoi::{FromRadix10Checked, FromRadix10SignedChecked};
use fast_float::parse_partial;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{any, iter, sync::Arc};
use time::{PrimitiveDateTime, format_description::parse_borrowed};
use uuid::Uuid;

/// Value conversion and simple parsing utilities. It is the central conversion
/// abstraction used throughout `keel` to move between native Rust types and the
/// dynamically typed [`Value`] representation that backs bound parameters,
/// result columns and bean properties.
///
/// # Parsing contract
/// - `parse` delegates to `extract` then verifies the slice is exhausted.
/// - `extract` MUST update the input slice only on success.
///
/// # Error semantics
/// - Range checks always occur before returning numeric conversions. The error
///   message includes both the offending value and target type.
/// - `parse` errors when residual unconsumed input remains, helping surface
///   accidental trailing characters like `123abc`.
///
/// # Examples
/// ```rust
/// use keel_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42), ..)));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Whether the type accepts NULL (only `Option` and wrappers around it).
    const NULLABLE: bool = false;
    /// Return an "empty" (NULL-like) value variant for this type. It also acts
    /// as the type descriptor of scalar bean properties.
    fn as_empty_value() -> Value;
    /// Convert this value into its owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    ///
    /// Implementations accept the canonical variant for the type, optionally
    /// alternate numeric widths (with range checks), and fall back to parsing
    /// `Value::Unknown` through [`AsValue::parse`].
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Parse a full string into `Self` delegating to [`AsValue::extract`].
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        let mut value = input.as_ref();
        let result = Self::extract(&mut value)?;
        if !value.is_empty() {
            return Err(Error::msg(format!(
                "Value `{}` parsed correctly as {} but it did not consume all the input (remaining: `{}`)",
                truncate_long!(input.as_ref()),
                any::type_name::<Self>(),
                truncate_long!(value),
            )));
        }
        Ok(result)
    }
    /// Attempt to parse a prefix from the provided string slice, updating the
    /// slice to point to the remaining portion on success.
    fn extract(value: &mut &str) -> Result<Self>
    where
        Self: Sized,
    {
        Err(Error::msg(format!(
            "Cannot parse '{value}' as {}",
            any::type_name::<Self>()
        )))
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self as _))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v), ..) => Ok(v as _),
                    $($pat_rest => $expr_rest,)*
                    #[allow(unreachable_patterns)]
                    Value::Int32(Some(v), ..) => <$source>::try_from(v).map_err(|_| {
                        Error::msg(format!(
                            "Value {v}: i32 is out of range for {}",
                            any::type_name::<Self>(),
                        ))
                    }),
                    #[allow(unreachable_patterns)]
                    Value::Int64(Some(v), ..) => <$source>::try_from(v).map_err(|_| {
                        Error::msg(format!(
                            "Value {v}: i64 is out of range for {}",
                            any::type_name::<Self>(),
                        ))
                    }),
                    Value::Unknown(Some(ref v), ..) => Self::parse(v),
                    _ => Err(Error::msg(format!(
                        "Cannot convert {value:?} to {}",
                        any::type_name::<Self>(),
                    ))),
                }
            }
            fn extract(input: &mut &str) -> Result<Self> {
                let value = *input;
                #[allow(unused_comparisons)]
                let is_signed = <$source>::MIN < 0;
                let (result, len) = if is_signed {
                    let (n, len) = i128::from_radix_10_signed_checked(value.as_bytes());
                    (n.and_then(|n| <$source>::try_from(n).ok()), len)
                } else {
                    let (n, len) = u128::from_radix_10_checked(value.as_bytes());
                    (n.and_then(|n| <$source>::try_from(n).ok()), len)
                };
                // A lone sign parses as zero
                if !value.as_bytes()[..len].iter().any(u8::is_ascii_digit) {
                    return Err(Error::msg(format!(
                        "Cannot extract {} from `{}`",
                        any::type_name::<Self>(),
                        truncate_long!(value),
                    )));
                }
                let Some(result) = result else {
                    return Err(Error::msg(format!(
                        "Value {} is out of range for {}",
                        truncate_long!(&value[..len]),
                        any::type_name::<Self>(),
                    )));
                };
                *input = &value[len..];
                Ok(result)
            }
        }
    };
}
impl_as_value!(
    i8,
    Value::Int8,
    Value::UInt8(Some(v), ..) => i8::try_from(v).map_err(|_| Error::msg(format!("Value {v}: u8 is out of range for i8"))),
    Value::Int16(Some(v), ..) => i8::try_from(v).map_err(|_| Error::msg(format!("Value {v}: i16 is out of range for i8"))),
);
impl_as_value!(
    i16,
    Value::Int16,
    Value::Int8(Some(v), ..) => Ok(v as _),
    Value::UInt16(Some(v), ..) => i16::try_from(v).map_err(|_| Error::msg(format!("Value {v}: u16 is out of range for i16"))),
    Value::UInt8(Some(v), ..) => Ok(v as _),
);
impl_as_value!(
    i32,
    Value::Int32,
    Value::Int16(Some(v), ..) => Ok(v as _),
    Value::Int8(Some(v), ..) => Ok(v as _),
    Value::UInt32(Some(v), ..) => i32::try_from(v).map_err(|_| Error::msg(format!("Value {v}: u32 is out of range for i32"))),
    Value::UInt16(Some(v), ..) => Ok(v as _),
    Value::UInt8(Some(v), ..) => Ok(v as _),
    Value::Decimal(Some(v), ..) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into i32"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_i32().ok_or(error)
    }
);
impl_as_value!(
    i64,
    Value::Int64,
    Value::Int32(Some(v), ..) => Ok(v as _),
    Value::Int16(Some(v), ..) => Ok(v as _),
    Value::Int8(Some(v), ..) => Ok(v as _),
    Value::UInt64(Some(v), ..) => i64::try_from(v).map_err(|_| Error::msg(format!("Value {v}: u64 is out of range for i64"))),
    Value::UInt32(Some(v), ..) => Ok(v as _),
    Value::UInt16(Some(v), ..) => Ok(v as _),
    Value::UInt8(Some(v), ..) => Ok(v as _),
    Value::Decimal(Some(v), ..) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into i64"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_i64().ok_or(error)
    }
);
impl_as_value!(
    i128,
    Value::Int128,
    Value::Int64(Some(v), ..) => Ok(v as _),
    Value::Int32(Some(v), ..) => Ok(v as _),
    Value::Int16(Some(v), ..) => Ok(v as _),
    Value::Int8(Some(v), ..) => Ok(v as _),
    Value::UInt64(Some(v), ..) => Ok(v as _),
    Value::UInt32(Some(v), ..) => Ok(v as _),
    Value::UInt16(Some(v), ..) => Ok(v as _),
    Value::UInt8(Some(v), ..) => Ok(v as _),
);
impl_as_value!(
    u8,
    Value::UInt8,
    Value::Int16(Some(v), ..) => u8::try_from(v).map_err(|_| Error::msg(format!("Value {v}: i16 is out of range for u8"))),
);
impl_as_value!(
    u16,
    Value::UInt16,
    Value::UInt8(Some(v), ..) => Ok(v as _),
);
impl_as_value!(
    u32,
    Value::UInt32,
    Value::UInt16(Some(v), ..) => Ok(v as _),
    Value::UInt8(Some(v), ..) => Ok(v as _),
);
impl_as_value!(
    u64,
    Value::UInt64,
    Value::UInt32(Some(v), ..) => Ok(v as _),
    Value::UInt16(Some(v), ..) => Ok(v as _),
    Value::UInt8(Some(v), ..) => Ok(v as _),
);
impl_as_value!(
    u128,
    Value::UInt128,
    Value::UInt64(Some(v), ..) => Ok(v as _),
    Value::UInt32(Some(v), ..) => Ok(v as _),
    Value::UInt16(Some(v), ..) => Ok(v as _),
    Value::UInt8(Some(v), ..) => Ok(v as _),
);

macro_rules! impl_as_value {
    ($source:ty, $destination:path, $extract:expr $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v), ..) => Ok(v.into()),
                    $($pat_rest => $expr_rest,)*
                    #[allow(unreachable_patterns)]
                    Value::Unknown(Some(ref v)) => <Self as AsValue>::parse(v),
                    _ => Err(Error::msg(format!(
                        "Cannot convert {value:?} to {}",
                        any::type_name::<Self>(),
                    ))),
                }
            }
            fn extract(value: &mut &str) -> Result<Self> {
                $extract(value)
            }
        }
    };
}
impl_as_value!(
    bool,
    Value::Boolean,
    |input: &mut &str| {
        let mut value = *input;
        let result = consume_while(&mut value, |v| v.is_alphanumeric() || *v == '_');
        let result = match result {
            x if x.eq_ignore_ascii_case("true") || x.eq_ignore_ascii_case("t") || x.eq("1") => Ok(true),
            x if x.eq_ignore_ascii_case("false") || x.eq_ignore_ascii_case("f") || x.eq("0") => Ok(false),
            _  => return Err(Error::msg(format!("Cannot parse boolean from '{input}'")))
        };
        *input = value;
        result
    },
    Value::Int8(Some(v), ..) => Ok(v != 0),
    Value::Int16(Some(v), ..) => Ok(v != 0),
    Value::Int32(Some(v), ..) => Ok(v != 0),
    Value::Int64(Some(v), ..) => Ok(v != 0),
    Value::UInt8(Some(v), ..) => Ok(v != 0),
    Value::UInt16(Some(v), ..) => Ok(v != 0),
    Value::UInt32(Some(v), ..) => Ok(v != 0),
    Value::UInt64(Some(v), ..) => Ok(v != 0),
);

macro_rules! extract_float {
    ($input:expr) => {{
        let mut value = *$input;
        let quote = if value.starts_with(['"', '\'']) {
            let r = &value[0..1];
            value = &value[1..];
            r
        } else {
            ""
        };
        let context = || {
            format!(
                "Cannot extract a floating point value from `{}`",
                truncate_long!($input)
            )
        };
        let (num, tail) = parse_partial(value).with_context(context)?;
        value = &value[tail..];
        if !value.starts_with(quote) {
            return Err(Error::msg(context()));
        }
        value = &value[quote.len()..];
        *$input = value;
        Ok(num)
    }};
}
impl_as_value!(
    f32,
    Value::Float32,
    |input: &mut &str| {
        extract_float!(input)
    },
    Value::Float64(Some(v), ..) => Ok(v as _),
    Value::Decimal(Some(v), ..) => Ok(v.try_into()?),
);
impl_as_value!(
    f64,
    Value::Float64,
    |input: &mut &str| {
        extract_float!(input)
    },
    Value::Float32(Some(v), ..) => Ok(v as _),
    Value::Decimal(Some(v), ..) => Ok(v.try_into()?),
);

impl_as_value!(
    char,
    Value::Char,
    |input: &mut &str| {
        let mut chars = input.chars();
        let Some(c) = chars.next() else {
            return Err(Error::msg("Cannot extract a char from an empty string"));
        };
        *input = chars.as_str();
        Ok(c)
    },
    Value::Varchar(Some(v), ..) => {
        let mut chars = v.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::msg(
                "Cannot convert Value::Varchar not containing exactly one character into a char",
            )),
        }
    }
);
impl_as_value!(
    String,
    Value::Varchar,
    |input: &mut &str| {
        let mut value = *input;
        let delimiter = match value.chars().next() {
            Some(d @ ('\'' | '"')) => {
                value = &value[1..];
                Some(d)
            }
            _ => None,
        };
        let Some(delimiter) = delimiter else {
            *input = "";
            return Ok(value.to_owned());
        };
        let mut result = String::with_capacity(value.len());
        let mut chars = value.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c == delimiter {
                if let Some((_, next)) = chars.peek() {
                    if *next == delimiter {
                        result.push(c);
                        chars.next();
                        continue;
                    }
                }
                *input = &value[(i + c.len_utf8())..];
                return Ok(result);
            }
            result.push(c);
        }
        Err(Error::msg(format!(
            "Unterminated string literal `{}`",
            truncate_long!(input)
        )))
    },
    Value::Char(Some(v), ..) => Ok(v.into()),
    Value::Unknown(Some(v), ..) => Ok(v),
);
impl_as_value!(Box<[u8]>, Value::Blob, |input: &mut &str| {
    let mut value = *input;
    if value.starts_with("\\x") || value.starts_with("\\X") {
        value = &value[2..];
    }
    let hex = consume_while(&mut value, char::is_ascii_hexdigit);
    let result = hex::decode(hex).map(Into::into).context(format!(
        "While decoding `{}` as {}",
        truncate_long!(input),
        any::type_name::<Self>()
    ))?;
    *input = value;
    Ok(result)
});
impl_as_value!(
    Uuid,
    Value::Uuid,
    |input: &mut &str| {
        let mut value = *input;
        let delimiter = if value.starts_with(['"', '\'']) {
            let d = &value[0..1];
            value = &value[1..];
            d
        } else {
            ""
        };
        let context = || {
            format!(
                "Cannot extract a uuid value from `{}`",
                truncate_long!(input)
            )
        };
        let Some(text) = value.get(0..36) else {
            return Err(Error::msg(context()));
        };
        let uuid = Uuid::parse_str(text).with_context(context)?;
        value = &value[36..];
        if !value.starts_with(delimiter) {
            return Err(Error::msg(context()));
        }
        value = &value[delimiter.len()..];
        *input = value;
        Ok(uuid)
    },
    Value::Varchar(Some(v), ..) => Self::parse(v),
);

macro_rules! parse_time {
    ($value: ident, $($formats:literal),+ $(,)?) => {
        'value: {
            for format in [$($formats,)+] {
                let format = parse_borrowed::<2>(format)?;
                let mut parsed = time::parsing::Parsed::new();
                let remaining = parsed.parse_items($value.as_bytes(), &format);
                if let Ok(remaining) = remaining {
                    let result = parsed.try_into()?;
                    *$value = &$value[($value.len() - remaining.len())..];
                    break 'value Ok(result);
                }
            }
            Err(Error::msg(format!(
                "Cannot extract from `{}` as {}",
                $value,
                any::type_name::<Self>()
            )))
        }
    }
}

impl_as_value!(
    time::Date,
    Value::Date,
    |v: &mut &str| {
        let result: time::Date = parse_time!(v, "[year]-[month]-[day]")?;
        Ok(result)
    },
    Value::Varchar(Some(v), ..) => <Self as AsValue>::parse(v),
);

impl_as_value!(
    time::Time,
    Value::Time,
    |v: &mut &str| {
        let result: time::Time = parse_time!(
            v,
            "[hour]:[minute]:[second].[subsecond]",
            "[hour]:[minute]:[second]",
            "[hour]:[minute]",
        )?;
        Ok(result)
    },
    Value::Varchar(Some(v), ..) => <Self as AsValue>::parse(v),
);

impl_as_value!(
    time::PrimitiveDateTime,
    Value::Timestamp,
    |v: &mut &str| {
        let result: time::PrimitiveDateTime = parse_time!(
            v,
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]",
            "[year]-[month]-[day]T[hour]:[minute]:[second]",
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]",
            "[year]-[month]-[day] [hour]:[minute]:[second]",
        )?;
        Ok(result)
    },
    Value::Varchar(Some(v), ..) => <Self as AsValue>::parse(v),
);

impl_as_value!(
    time::OffsetDateTime,
    Value::TimestampWithTimezone,
    |v: &mut &str| {
        let result: time::OffsetDateTime = parse_time!(
            v,
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]",
        ).or(<PrimitiveDateTime as AsValue>::extract(v).map(|v| v.assume_utc()))?;
        Ok(result)
    },
    Value::Timestamp(Some(timestamp), ..) => Ok(timestamp.assume_utc()),
    Value::Varchar(Some(v), ..) => <Self as AsValue>::parse(v),
);

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None, 0, 0)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self), 0, self.scale() as _)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v), ..) => Ok(v),
            Value::Int8(Some(v), ..) => Ok(Decimal::new(v as i64, 0)),
            Value::Int16(Some(v), ..) => Ok(Decimal::new(v as i64, 0)),
            Value::Int32(Some(v), ..) => Ok(Decimal::new(v as i64, 0)),
            Value::Int64(Some(v), ..) => Ok(Decimal::new(v, 0)),
            Value::UInt8(Some(v), ..) => Ok(Decimal::new(v as i64, 0)),
            Value::UInt16(Some(v), ..) => Ok(Decimal::new(v as i64, 0)),
            Value::UInt32(Some(v), ..) => Ok(Decimal::new(v as i64, 0)),
            Value::Float32(Some(v), ..) => Ok(Decimal::from_f32(v)
                .ok_or(Error::msg(format!("Cannot convert {value:?} to Decimal")))?),
            Value::Float64(Some(v), ..) => Ok(Decimal::from_f64(v)
                .ok_or(Error::msg(format!("Cannot convert {value:?} to Decimal")))?),
            Value::Unknown(Some(v), ..) | Value::Varchar(Some(v), ..) => Self::parse(&v),
            _ => Err(Error::msg(format!("Cannot convert {value:?} to Decimal"))),
        }
    }
    fn extract(input: &mut &str) -> Result<Self> {
        let mut value = *input;
        let (n, len) = i128::from_radix_10_signed_checked(value.as_bytes());
        let Some(mut n) = n.filter(|_| value.as_bytes()[..len].iter().any(u8::is_ascii_digit))
        else {
            return Err(Error::msg(format!(
                "Cannot extract a Decimal from `{}`",
                truncate_long!(input)
            )));
        };
        value = &value[len..];
        let n = if value.starts_with('.') {
            value = &value[1..];
            let (dec, len) = i128::from_radix_10_checked(value.as_bytes());
            let dec = dec.unwrap_or_default();
            n = n * 10i128.pow(len as _) + if n < 0 { -dec } else { dec };
            value = &value[len..];
            Decimal::try_from_i128_with_scale(n, len as _)
                .map_err(|_| Error::msg(format!("Could not create a Decimal from {n}")))
        } else {
            Decimal::from_i128(n)
                .ok_or_else(|| Error::msg(format!("Could not create a Decimal from {n}")))
        }?;
        *input = value;
        Ok(n)
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_empty_value() -> Value {
        Value::List(None, Box::new(T::as_empty_value()))
    }
    fn as_value(self) -> Value {
        Value::List(
            Some(self.into_iter().map(AsValue::as_value).collect()),
            Box::new(T::as_empty_value()),
        )
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(Some(v), ..) => v.into_iter().map(T::try_from_value).collect(),
            Value::List(None, ..) => Ok(Vec::new()),
            Value::Unknown(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(Error::msg(format!(
                "Cannot convert {value:?} to {}",
                any::type_name::<Self>(),
            ))),
        }
    }
    fn extract(input: &mut &str) -> Result<Self> {
        let mut value = *input;
        let error = Arc::new(format!(
            "Cannot extract `{}` as {}",
            truncate_long!(input),
            any::type_name::<Self>(),
        ));
        let closing = match value.chars().next() {
            Some('{') => '}',
            Some('[') => ']',
            _ => {
                return Err(Error::msg(error));
            }
        };
        value = value[1..].trim_ascii_start();
        let result = iter::from_fn(|| {
            if value.starts_with(closing) {
                return None;
            }
            let result = match T::extract(&mut value) {
                Ok(v) => v,
                Err(e) => return Some(Err(e)),
            };
            value = value.trim_ascii_start();
            match value.chars().next() {
                Some(',') => value = value[1..].trim_ascii_start(),
                d if d == Some(closing) => {}
                _ => return Some(Err(Error::msg(error.clone()))),
            }
            Some(Ok(result))
        })
        .collect::<Result<Self>>()?;
        if !value.starts_with(closing) {
            return Err(Error::msg(format!(
                "Incorrect {} `{}`, expected a `{}`",
                any::type_name::<Self>(),
                truncate_long!(input),
                closing
            )));
        };
        *input = value[1..].trim_ascii_start();
        Ok(result)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    const NULLABLE: bool = true;
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
        Ok(if value.is_null() {
            None
        } else {
            Some(<T as AsValue>::try_from_value(value)?)
        })
    }
    fn extract(input: &mut &str) -> Result<Self> {
        let mut value = *input;
        let result = consume_while(&mut value, |v| v.is_alphanumeric() || *v == '_');
        if result.eq_ignore_ascii_case("null") {
            *input = value;
            return Ok(None);
        };
        T::extract(input).map(Some)
    }
}

impl<T: AsValue> AsValue for Box<T> {
    const NULLABLE: bool = T::NULLABLE;
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Self::new(<T as AsValue>::try_from_value(value)?))
    }
    fn extract(value: &mut &str) -> Result<Self> {
        T::extract(value).map(Self::new)
    }
}
