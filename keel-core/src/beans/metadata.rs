use crate::{
    Bean, BeanProperty, BeanType, Introspector, KeelError, PublishCache, Result, Value,
};
use std::{
    any::Any,
    collections::HashMap,
    fmt::{self, Debug},
    sync::Arc,
};

/// Property table of one bean type, computed once and never mutated after.
pub struct BeanMetadata {
    bean_type: BeanType,
    properties: Vec<BeanProperty>,
    by_name: HashMap<&'static str, usize>,
    by_lowercase: HashMap<String, usize>,
    instantiate: fn() -> Box<dyn Any + Send>,
}

fn instantiate_boxed<T: Bean>() -> Box<dyn Any + Send> {
    Box::new(T::instantiate())
}

impl BeanMetadata {
    /// Introspect `T`. Nested bean types are not visited here, their metadata
    /// is requested separately when a path descends into them.
    pub fn compute<T: Bean>() -> Self {
        let mut introspector = Introspector::<T>::new();
        T::introspect(&mut introspector);
        let properties = introspector.into_properties();
        let mut by_name = HashMap::with_capacity(properties.len());
        let mut by_lowercase = HashMap::with_capacity(properties.len());
        for (i, property) in properties.iter().enumerate() {
            by_name.entry(property.name()).or_insert(i);
            by_lowercase
                .entry(property.name().to_lowercase())
                .or_insert(i);
        }
        Self {
            bean_type: BeanType::of::<T>(),
            properties,
            by_name,
            by_lowercase,
            instantiate: instantiate_boxed::<T>,
        }
    }
    pub fn bean_type(&self) -> BeanType {
        self.bean_type
    }
    pub fn property(&self, name: &str) -> Option<&BeanProperty> {
        self.by_name.get(name).map(|&i| &self.properties[i])
    }
    pub fn property_ignore_case(&self, name: &str) -> Option<&BeanProperty> {
        self.property(name).or_else(|| {
            self.by_lowercase
                .get(&name.to_lowercase())
                .map(|&i| &self.properties[i])
        })
    }
    /// Like [`BeanMetadata::property`] but failing with
    /// [`KeelError::PropertyNotFound`] when absent.
    pub fn obtain_property(&self, name: &str) -> Result<&BeanProperty> {
        self.property(name).ok_or_else(|| {
            KeelError::PropertyNotFound {
                bean: self.bean_type.name().into(),
                property: name.into(),
            }
            .into()
        })
    }
    pub fn get_property(&self, bean: &dyn Any, name: &str) -> Result<Value> {
        self.obtain_property(name)?.get_value(bean)
    }
    pub fn set_property(&self, bean: &mut dyn Any, name: &str, value: Value) -> Result<()> {
        self.obtain_property(name)?.set_value(bean, value)
    }
    pub fn contains_property(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
    pub fn len(&self) -> usize {
        self.properties.len()
    }
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &BeanProperty> {
        self.properties.iter()
    }
    pub fn property_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.iter().map(BeanProperty::name)
    }
    /// A new instance built with the type's default construction strategy.
    pub fn new_instance(&self) -> Box<dyn Any + Send> {
        (self.instantiate)()
    }
}

impl Debug for BeanMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanMetadata")
            .field("bean_type", &self.bean_type)
            .field("properties", &self.properties)
            .finish()
    }
}

impl<'a> IntoIterator for &'a BeanMetadata {
    type Item = &'a BeanProperty;
    type IntoIter = std::slice::Iter<'a, BeanProperty>;
    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

/// Bean metadata shared by every caller, keyed by type.
///
/// Construct one at startup and share it through an `Arc`.
#[derive(Debug, Default)]
pub struct BeanMetadataCache {
    cache: PublishCache<BeanType, BeanMetadata>,
}

impl BeanMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn for_type(&self, bean_type: BeanType) -> Arc<BeanMetadata> {
        self.cache.get_or_insert_with(bean_type, || {
            log::debug!("Computing bean metadata for {}", bean_type.name());
            bean_type.compute_metadata()
        })
    }
    pub fn get<T: Bean>(&self) -> Arc<BeanMetadata> {
        self.for_type(BeanType::of::<T>())
    }
    pub fn len(&self) -> usize {
        self.cache.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
