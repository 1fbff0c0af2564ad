use crate::{
    AsValue, BeanMetadata, BeanProperty, FieldAccessor, MethodAccessor, NestedAccessor,
    PropertySource, PropertyType,
};
use std::{
    any::{Any, TypeId, type_name},
    fmt::{self, Debug},
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::Arc,
};

/// A type whose properties can be discovered and accessed at runtime.
///
/// Usually derived:
/// ```rust,ignore
/// #[derive(Default, Bean)]
/// struct User {
///     id: i64,
///     name: Option<String>,
///     #[bean(nested)]
///     address: Option<Address>,
/// }
/// ```
pub trait Bean: Any + Send + Sized {
    /// The default construction strategy.
    fn instantiate() -> Self;
    /// Register the properties of the type.
    fn introspect(introspector: &mut Introspector<Self>);
    fn bean_type() -> BeanType {
        BeanType::of::<Self>()
    }
}

/// Copyable handle to a [`Bean`] type. Identity is the `TypeId`.
#[derive(Clone, Copy)]
pub struct BeanType {
    id: TypeId,
    name: &'static str,
    metadata: fn() -> BeanMetadata,
}

impl BeanType {
    pub fn of<T: Bean>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            metadata: BeanMetadata::compute::<T>,
        }
    }
    pub fn id(&self) -> TypeId {
        self.id
    }
    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }
    /// Type name without the module path.
    pub fn short_name(&self) -> &'static str {
        let name = self.name.split('<').next().unwrap_or(self.name);
        match name.rfind("::") {
            Some(i) => &self.name[(i + 2)..],
            None => self.name,
        }
    }
    pub(crate) fn compute_metadata(&self) -> BeanMetadata {
        (self.metadata)()
    }
}

impl PartialEq for BeanType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BeanType {}

impl Hash for BeanType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for BeanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BeanType({})", self.name)
    }
}

/// Collects the properties of `T` while its metadata is computed.
///
/// Accessor properties take precedence over fields with the same name.
pub struct Introspector<T: Bean> {
    accessors: Vec<BeanProperty>,
    fields: Vec<BeanProperty>,
    _bean: PhantomData<fn() -> T>,
}

impl<T: Bean> Introspector<T> {
    pub(crate) fn new() -> Self {
        Self {
            accessors: Vec::new(),
            fields: Vec::new(),
            _bean: PhantomData,
        }
    }
    /// A scalar field, read and written in place.
    pub fn field<F>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> &mut Self
    where
        F: AsValue + Clone + Send + 'static,
    {
        self.fields.push(BeanProperty::new(
            name,
            type_name::<T>(),
            PropertyType::scalar::<F>(),
            PropertySource::Field,
            true,
            true,
            Arc::new(FieldAccessor { get, get_mut }),
        ));
        self
    }
    /// A scalar property exposed through a getter and/or a setter.
    pub fn accessor<F>(
        &mut self,
        name: &'static str,
        getter: Option<fn(&T) -> F>,
        setter: Option<fn(&mut T, F)>,
    ) -> &mut Self
    where
        F: AsValue + Send + 'static,
    {
        self.accessors.push(BeanProperty::new(
            name,
            type_name::<T>(),
            PropertyType::scalar::<F>(),
            PropertySource::Accessor,
            getter.is_some(),
            setter.is_some(),
            Arc::new(MethodAccessor { getter, setter }),
        ));
        self
    }
    /// An optional nested bean, created on demand when a path descends into it.
    pub fn nested<N: Bean>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> Option<&N>,
        get_mut: fn(&mut T) -> Option<&mut N>,
        attach: fn(&mut T, N),
    ) -> &mut Self {
        self.fields.push(BeanProperty::new(
            name,
            type_name::<T>(),
            PropertyType::Bean(BeanType::of::<N>()),
            PropertySource::Field,
            true,
            true,
            Arc::new(NestedAccessor {
                get,
                get_mut,
                attach,
            }),
        ));
        self
    }
    pub(crate) fn into_properties(self) -> Vec<BeanProperty> {
        let mut result = self.accessors;
        for field in self.fields {
            if result.iter().all(|p| p.name() != field.name()) {
                result.push(field);
            }
        }
        result
    }
}
