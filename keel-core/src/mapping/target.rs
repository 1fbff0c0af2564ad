use crate::{AsValue, Bean, BeanType, Result, Value};
use rust_decimal::Decimal;
use std::{
    any::{Any, TypeId, type_name},
    fmt::{self, Debug},
    hash::{Hash, Hasher},
};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// A single value type a one column result converts into directly.
#[derive(Clone, Copy)]
pub struct ScalarType {
    id: TypeId,
    name: &'static str,
    nullable: bool,
    template: fn() -> Value,
    convert: fn(Value) -> Result<Box<dyn Any + Send>>,
}

fn convert_boxed<T: AsValue + Send + 'static>(value: Value) -> Result<Box<dyn Any + Send>> {
    Ok(Box::new(T::try_from_value(value)?))
}

impl ScalarType {
    pub fn of<T: AsValue + Send + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            nullable: T::NULLABLE,
            template: T::as_empty_value,
            convert: convert_boxed::<T>,
        }
    }
    pub fn id(&self) -> TypeId {
        self.id
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
    pub fn template(&self) -> Value {
        (self.template)()
    }
    pub fn convert(&self, value: Value) -> Result<Box<dyn Any + Send>> {
        (self.convert)(value)
    }
}

impl Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScalarType({})", self.name)
    }
}

/// What a result row is mapped into. Identity is the `TypeId`.
#[derive(Clone, Copy)]
pub enum TargetType {
    Scalar(ScalarType),
    Bean(BeanType),
}

impl TargetType {
    pub fn id(&self) -> TypeId {
        match self {
            Self::Scalar(v) => v.id(),
            Self::Bean(v) => v.id(),
        }
    }
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar(v) => v.name(),
            Self::Bean(v) => v.name(),
        }
    }
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(..))
    }
}

impl PartialEq for TargetType {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TargetType {}

impl Hash for TargetType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl Debug for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "Scalar({})", v.name()),
            Self::Bean(v) => write!(f, "Bean({})", v.name()),
        }
    }
}

/// Types a result row can be mapped into.
pub trait Mappable: Sized + Send + 'static {
    fn target_type() -> TargetType;
}

impl<T: Bean> Mappable for T {
    fn target_type() -> TargetType {
        TargetType::Bean(BeanType::of::<T>())
    }
}

macro_rules! impl_mappable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Mappable for $ty {
                fn target_type() -> TargetType {
                    TargetType::Scalar(ScalarType::of::<Self>())
                }
            }
            impl Mappable for Option<$ty> {
                fn target_type() -> TargetType {
                    TargetType::Scalar(ScalarType::of::<Self>())
                }
            }
        )+
    };
}
impl_mappable!(
    bool,
    i8,
    i16,
    i32,
    i64,
    i128,
    u8,
    u16,
    u32,
    u64,
    u128,
    f32,
    f64,
    char,
    String,
    Box<[u8]>,
    Decimal,
    Uuid,
    Date,
    Time,
    PrimitiveDateTime,
    OffsetDateTime,
);
