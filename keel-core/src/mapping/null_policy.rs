use crate::{BeanProperty, Error, KeelError, Result, Value};
use std::{
    fmt::{self, Debug},
    sync::Arc,
};

/// Decides what happens when a NULL column targets a property that cannot hold NULL.
pub trait PrimitiveNullHandler: Send + Sync {
    /// `Some(value)` is assigned instead, `None` leaves the property untouched.
    fn on_null(&self, property: &BeanProperty, column: &str) -> Result<Option<Value>>;
}

#[derive(Clone, Default)]
pub enum PrimitiveNullPolicy {
    /// Leave the property with its current value.
    #[default]
    Ignore,
    /// Assign the zero value of the property type.
    Default,
    Fail,
    Custom(Arc<dyn PrimitiveNullHandler>),
}

impl PrimitiveNullPolicy {
    pub fn on_null(&self, property: &BeanProperty, column: &str) -> Result<Option<Value>> {
        let fail = || -> Error {
            KeelError::PrimitiveNull {
                column: column.into(),
                property: property.name().into(),
            }
            .into()
        };
        match self {
            Self::Ignore => Ok(None),
            Self::Default => property
                .template()
                .and_then(Value::zero_of)
                .map(Some)
                .ok_or_else(fail),
            Self::Fail => Err(fail()),
            Self::Custom(handler) => handler.on_null(property, column),
        }
    }
}

impl Debug for PrimitiveNullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => f.write_str("Ignore"),
            Self::Default => f.write_str("Default"),
            Self::Fail => f.write_str("Fail"),
            Self::Custom(..) => f.write_str("Custom(..)"),
        }
    }
}
