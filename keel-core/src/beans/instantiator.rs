use crate::{BeanMetadata, Result};
use std::any::Any;

/// Creates bean instances, both row objects and intermediate path objects.
pub trait Instantiator: Send + Sync {
    fn new_instance(&self, metadata: &BeanMetadata) -> Result<Box<dyn Any + Send>>;
}

/// Uses [`crate::Bean::instantiate`].
#[derive(Default, Debug, Clone, Copy)]
pub struct DefaultInstantiator;

impl Instantiator for DefaultInstantiator {
    fn new_instance(&self, metadata: &BeanMetadata) -> Result<Box<dyn Any + Send>> {
        Ok(metadata.new_instance())
    }
}
