use crate::{
    BeanMetadata, BeanMetadataCache, BeanType, ColumnValueConverter, DefaultConverter,
    DefaultInstantiator, Error, Extractor, ExtractorKind, Instantiator, KeelError, Mappable,
    MappingConfig, PropertyPath, PublishCache, Result, RowLabeled, Slot, TargetType,
};
use convert_case::{Case, Casing};
use std::{any::TypeId, borrow::Borrow, sync::Arc};

/// Cache key of an extractor: the column labels in order and the target type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    columns: String,
    target: TypeId,
}

impl HandlerKey {
    pub fn new<S: AsRef<str>>(columns: &[S], target: TargetType) -> Self {
        let mut signature = String::with_capacity(columns.len() * 10);
        for column in columns {
            signature.push_str(column.as_ref());
            signature.push('\n');
        }
        Self {
            columns: signature,
            target: target.id(),
        }
    }
}

/// Builds and caches the [`Extractor`] mapping a result shape onto a target type.
pub struct ResultMappingFactory {
    metadata: Arc<BeanMetadataCache>,
    converter: Arc<dyn ColumnValueConverter>,
    instantiator: Arc<dyn Instantiator>,
    config: MappingConfig,
    cache: PublishCache<HandlerKey, Extractor>,
}

#[derive(Default)]
pub struct ResultMappingFactoryBuilder {
    metadata: Option<Arc<BeanMetadataCache>>,
    converter: Option<Arc<dyn ColumnValueConverter>>,
    instantiator: Option<Arc<dyn Instantiator>>,
    config: MappingConfig,
}

impl ResultMappingFactoryBuilder {
    pub fn metadata_cache(mut self, metadata: Arc<BeanMetadataCache>) -> Self {
        self.metadata = Some(metadata);
        self
    }
    pub fn converter(mut self, converter: Arc<dyn ColumnValueConverter>) -> Self {
        self.converter = Some(converter);
        self
    }
    pub fn instantiator(mut self, instantiator: Arc<dyn Instantiator>) -> Self {
        self.instantiator = Some(instantiator);
        self
    }
    pub fn config(mut self, config: MappingConfig) -> Self {
        self.config = config;
        self
    }
    pub fn build(self) -> ResultMappingFactory {
        ResultMappingFactory {
            metadata: self.metadata.unwrap_or_default(),
            converter: self
                .converter
                .unwrap_or_else(|| Arc::new(DefaultConverter)),
            instantiator: self
                .instantiator
                .unwrap_or_else(|| Arc::new(DefaultInstantiator)),
            cache: PublishCache::with_capacity(self.config.extractor_cache_capacity),
            config: self.config,
        }
    }
}

impl ResultMappingFactory {
    pub fn builder() -> ResultMappingFactoryBuilder {
        ResultMappingFactoryBuilder::default()
    }
    /// Factory with the default collaborators and configuration.
    pub fn new(metadata: Arc<BeanMetadataCache>) -> Self {
        Self::builder().metadata_cache(metadata).build()
    }
    pub fn config(&self) -> &MappingConfig {
        &self.config
    }
    pub fn metadata_cache(&self) -> &Arc<BeanMetadataCache> {
        &self.metadata
    }
    /// Number of extractors currently cached.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
    /// The extractor for `columns` mapped onto `target`, built on first request.
    pub fn get<S: AsRef<str>>(&self, columns: &[S], target: TargetType) -> Result<Arc<Extractor>> {
        let key = HandlerKey::new(columns, target);
        self.cache
            .get_or_try_insert_with(key, || self.build_extractor(columns, target))
    }
    pub fn get_for<T: Mappable, S: AsRef<str>>(&self, columns: &[S]) -> Result<Arc<Extractor>> {
        self.get(columns, T::target_type())
    }
    pub fn map_row<T: Mappable>(&self, row: &RowLabeled) -> Result<T> {
        self.get_for::<T, _>(row.names())?.extract_as::<T>(row)
    }
    /// Map every row, the extractor is looked up once per distinct set of labels.
    pub fn map_rows<T, I>(&self, rows: I) -> Result<Vec<T>>
    where
        T: Mappable,
        I: IntoIterator,
        I::Item: Borrow<RowLabeled>,
    {
        let mut result = Vec::new();
        let mut current: Option<Arc<Extractor>> = None;
        for row in rows {
            let row = row.borrow();
            let extractor = match current.take() {
                Some(extractor) if extractor.columns() == row.names() => extractor,
                _ => self.get_for::<T, _>(row.names())?,
            };
            result.push(extractor.extract_as::<T>(row)?);
            current = Some(extractor);
        }
        Ok(result)
    }
    fn build_extractor<S: AsRef<str>>(&self, columns: &[S], target: TargetType) -> Result<Extractor> {
        let labels = columns
            .iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>();
        log::debug!(
            "Building the extractor of {} for columns [{}]",
            target.name(),
            labels.join(", ")
        );
        let kind = match target {
            TargetType::Scalar(scalar) => {
                if labels.len() != 1 {
                    return Err(Error::msg(format!(
                        "Cannot map {} columns into the scalar type {}",
                        labels.len(),
                        scalar.name()
                    )));
                }
                ExtractorKind::Scalar(scalar)
            }
            TargetType::Bean(bean) => {
                let metadata = self.metadata.for_type(bean);
                let slots = labels
                    .iter()
                    .map(|column| -> Result<Option<Slot>> {
                        let slot = self.resolve_column(&metadata, bean, column);
                        if slot.is_none() {
                            if labels.len() > 1 && self.config.strict {
                                return Err(KeelError::UnresolvedColumnMapping {
                                    column: column.clone(),
                                }
                                .into());
                            }
                            log::warn!(
                                "Column `{column}` does not match any property of {}, it will be skipped",
                                bean.name()
                            );
                        }
                        Ok(slot)
                    })
                    .collect::<Result<Vec<_>>>()?;
                ExtractorKind::Object { metadata, slots }
            }
        };
        Ok(Extractor::new(
            labels,
            kind,
            self.converter.clone(),
            self.instantiator.clone(),
            self.config.primitive_null_policy.clone(),
        ))
    }
    /// Alias, then exact name, then case insensitive, then snake_case form.
    /// A dotted label is resolved as a property path.
    fn resolve_column(&self, metadata: &BeanMetadata, bean: BeanType, column: &str) -> Option<Slot> {
        let name = self.config.alias_of(column).unwrap_or(column);
        if name.find('.').is_some_and(|i| i > 0) {
            let path = if self.config.case_sensitive {
                PropertyPath::new(&self.metadata, bean, name)
            } else {
                PropertyPath::new_ignore_case(&self.metadata, bean, name)
            };
            let assignable = path.is_resolved()
                && path
                    .terminal_property()
                    .is_some_and(|p| p.is_writable() && p.bean_type().is_none());
            return assignable.then_some(Slot::Path(path));
        }
        let lookup = |name: &str| {
            if self.config.case_sensitive {
                metadata.property(name)
            } else {
                metadata.property_ignore_case(name)
            }
        };
        let property = lookup(name).or_else(|| {
            if !self.config.auto_derive_column_names {
                return None;
            }
            let derived = name.to_case(Case::Snake);
            if derived == name {
                return None;
            }
            lookup(&derived)
        })?;
        if !property.is_writable() || property.bean_type().is_some() {
            return None;
        }
        Some(Slot::Flat(property.clone()))
    }
}
