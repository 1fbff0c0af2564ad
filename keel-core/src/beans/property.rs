use crate::{AsValue, Bean, BeanType, Error, KeelError, Result, Value};
use std::{
    any::{Any, type_name},
    fmt::{self, Debug},
    sync::Arc,
};

/// Runtime access to one property of a bean, the owner is passed type-erased.
pub trait PropertyAccessor: Send + Sync {
    fn get_value(&self, owner: &dyn Any) -> Result<Value>;
    fn set_value(&self, owner: &mut dyn Any, value: Value) -> Result<()>;
    /// The nested bean held by the property, `None` when absent.
    fn nested<'a>(&self, _owner: &'a dyn Any) -> Result<Option<&'a dyn Any>> {
        Err(Error::msg("The property does not hold a nested bean"))
    }
    fn nested_mut<'a>(&self, _owner: &'a mut dyn Any) -> Result<Option<&'a mut dyn Any>> {
        Err(Error::msg("The property does not hold a nested bean"))
    }
    /// Store a freshly created nested bean into the property.
    fn attach(&self, _owner: &mut dyn Any, _value: Box<dyn Any + Send>) -> Result<()> {
        Err(Error::msg("The property does not hold a nested bean"))
    }
}

fn owner_ref<T: Any>(owner: &dyn Any) -> Result<&T> {
    owner
        .downcast_ref::<T>()
        .ok_or_else(|| Error::msg(format!("Expected an owner of type {}", type_name::<T>())))
}

fn owner_mut<T: Any>(owner: &mut dyn Any) -> Result<&mut T> {
    owner
        .downcast_mut::<T>()
        .ok_or_else(|| Error::msg(format!("Expected an owner of type {}", type_name::<T>())))
}

pub struct FieldAccessor<T, F> {
    pub get: fn(&T) -> &F,
    pub get_mut: fn(&mut T) -> &mut F,
}

impl<T: Any, F: AsValue + Clone + 'static> PropertyAccessor for FieldAccessor<T, F> {
    fn get_value(&self, owner: &dyn Any) -> Result<Value> {
        Ok((self.get)(owner_ref::<T>(owner)?).clone().as_value())
    }
    fn set_value(&self, owner: &mut dyn Any, value: Value) -> Result<()> {
        let owner = owner_mut::<T>(owner)?;
        *(self.get_mut)(owner) = F::try_from_value(value)?;
        Ok(())
    }
}

pub struct MethodAccessor<T, F> {
    pub getter: Option<fn(&T) -> F>,
    pub setter: Option<fn(&mut T, F)>,
}

impl<T: Any, F: AsValue + 'static> PropertyAccessor for MethodAccessor<T, F> {
    fn get_value(&self, owner: &dyn Any) -> Result<Value> {
        let Some(getter) = self.getter else {
            return Err(Error::msg("The property has no getter"));
        };
        Ok(getter(owner_ref::<T>(owner)?).as_value())
    }
    fn set_value(&self, owner: &mut dyn Any, value: Value) -> Result<()> {
        let Some(setter) = self.setter else {
            return Err(Error::msg("The property has no setter"));
        };
        let value = F::try_from_value(value)?;
        setter(owner_mut::<T>(owner)?, value);
        Ok(())
    }
}

pub struct NestedAccessor<T, N> {
    pub get: fn(&T) -> Option<&N>,
    pub get_mut: fn(&mut T) -> Option<&mut N>,
    pub attach: fn(&mut T, N),
}

impl<T: Any, N: Bean> PropertyAccessor for NestedAccessor<T, N> {
    fn get_value(&self, _owner: &dyn Any) -> Result<Value> {
        Err(Error::msg(format!(
            "The property holds a nested {}, not a value",
            type_name::<N>()
        )))
    }
    fn set_value(&self, _owner: &mut dyn Any, _value: Value) -> Result<()> {
        Err(Error::msg(format!(
            "Cannot assign a value to a property holding a nested {}",
            type_name::<N>()
        )))
    }
    fn nested<'a>(&self, owner: &'a dyn Any) -> Result<Option<&'a dyn Any>> {
        Ok((self.get)(owner_ref::<T>(owner)?).map(|v| v as &dyn Any))
    }
    fn nested_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<Option<&'a mut dyn Any>> {
        Ok((self.get_mut)(owner_mut::<T>(owner)?).map(|v| v as &mut dyn Any))
    }
    fn attach(&self, owner: &mut dyn Any, value: Box<dyn Any + Send>) -> Result<()> {
        let value = value.downcast::<N>().map_err(|_| {
            Error::msg(format!("Expected a nested value of type {}", type_name::<N>()))
        })?;
        (self.attach)(owner_mut::<T>(owner)?, *value);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    /// A value convertible through [`AsValue`], `template` is its empty value.
    Scalar { template: Value, nullable: bool },
    Bean(BeanType),
}

impl PropertyType {
    pub fn scalar<F: AsValue>() -> Self {
        Self::Scalar {
            template: F::as_empty_value(),
            nullable: F::NULLABLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySource {
    /// Getter and setter pair.
    Accessor,
    Field,
}

/// One property of a bean. Immutable once computed.
#[derive(Clone)]
pub struct BeanProperty {
    name: &'static str,
    owner: &'static str,
    property_type: PropertyType,
    source: PropertySource,
    readable: bool,
    writable: bool,
    accessor: Arc<dyn PropertyAccessor>,
}

impl BeanProperty {
    pub fn new(
        name: &'static str,
        owner: &'static str,
        property_type: PropertyType,
        source: PropertySource,
        readable: bool,
        writable: bool,
        accessor: Arc<dyn PropertyAccessor>,
    ) -> Self {
        Self {
            name,
            owner,
            property_type,
            source,
            readable,
            writable,
            accessor,
        }
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    /// Name of the bean type declaring the property.
    pub fn owner(&self) -> &'static str {
        self.owner
    }
    pub fn property_type(&self) -> &PropertyType {
        &self.property_type
    }
    pub fn source(&self) -> PropertySource {
        self.source
    }
    pub fn is_readable(&self) -> bool {
        self.readable
    }
    pub fn is_writable(&self) -> bool {
        self.writable
    }
    /// The nested bean type, when the property holds one.
    pub fn bean_type(&self) -> Option<BeanType> {
        match self.property_type {
            PropertyType::Bean(bean) => Some(bean),
            PropertyType::Scalar { .. } => None,
        }
    }
    /// Empty value describing the scalar type, `None` for nested beans.
    pub fn template(&self) -> Option<&Value> {
        match &self.property_type {
            PropertyType::Scalar { template, .. } => Some(template),
            PropertyType::Bean(..) => None,
        }
    }
    /// A scalar that cannot hold NULL.
    pub fn is_primitive(&self) -> bool {
        matches!(self.property_type, PropertyType::Scalar { nullable: false, .. })
    }
    fn access_error(&self, access: &'static str) -> Error {
        KeelError::PropertyAccess {
            bean: self.owner.into(),
            property: self.name.into(),
            access,
        }
        .into()
    }
    pub fn get_value(&self, owner: &dyn Any) -> Result<Value> {
        if !self.readable {
            return Err(self.access_error("readable"));
        }
        self.accessor.get_value(owner)
    }
    pub fn set_value(&self, owner: &mut dyn Any, value: Value) -> Result<()> {
        if !self.writable {
            return Err(self.access_error("writable"));
        }
        self.accessor.set_value(owner, value)
    }
    pub fn nested<'a>(&self, owner: &'a dyn Any) -> Result<Option<&'a dyn Any>> {
        self.accessor.nested(owner)
    }
    pub fn nested_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<Option<&'a mut dyn Any>> {
        self.accessor.nested_mut(owner)
    }
    pub fn attach(&self, owner: &mut dyn Any, value: Box<dyn Any + Send>) -> Result<()> {
        self.accessor.attach(owner, value)
    }
}

impl Debug for BeanProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanProperty")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("property_type", &self.property_type)
            .field("source", &self.source)
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .finish()
    }
}
