use crate::{
    BeanMetadata, BeanProperty, ColumnValueConverter, Context, Error, Instantiator, KeelError,
    PrimitiveNullPolicy, PropertyPath, Result, RowLabeled, ScalarType,
};
use std::{
    any::{Any, type_name},
    fmt::{self, Debug},
    sync::Arc,
};

/// Where the value of one column goes.
#[derive(Clone)]
pub enum Slot {
    Flat(BeanProperty),
    Path(PropertyPath),
}

impl Slot {
    /// The property receiving the value.
    pub fn property(&self) -> Option<&BeanProperty> {
        match self {
            Self::Flat(property) => Some(property),
            Self::Path(path) => path.terminal_property(),
        }
    }
}

impl Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat(property) => write!(f, "Flat({})", property.name()),
            Self::Path(path) => write!(f, "Path({path})"),
        }
    }
}

#[derive(Debug)]
pub enum ExtractorKind {
    /// The only column converted into the result itself.
    Scalar(ScalarType),
    /// One optional slot per column, in column order.
    Object {
        metadata: Arc<BeanMetadata>,
        slots: Vec<Option<Slot>>,
    },
}

/// Turns one result row into one instance of the target type.
///
/// Built once per column labels and target type, then reused for every row.
pub struct Extractor {
    columns: Vec<String>,
    kind: ExtractorKind,
    converter: Arc<dyn ColumnValueConverter>,
    instantiator: Arc<dyn Instantiator>,
    null_policy: PrimitiveNullPolicy,
}

impl Extractor {
    pub fn new(
        columns: Vec<String>,
        kind: ExtractorKind,
        converter: Arc<dyn ColumnValueConverter>,
        instantiator: Arc<dyn Instantiator>,
        null_policy: PrimitiveNullPolicy,
    ) -> Self {
        Self {
            columns,
            kind,
            converter,
            instantiator,
            null_policy,
        }
    }
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn kind(&self) -> &ExtractorKind {
        &self.kind
    }
    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, ExtractorKind::Scalar(..))
    }
    /// The slots of an object extractor, empty for a scalar one.
    pub fn slots(&self) -> &[Option<Slot>] {
        match &self.kind {
            ExtractorKind::Object { slots, .. } => slots,
            ExtractorKind::Scalar(..) => &[],
        }
    }
    pub fn extract(&self, row: &RowLabeled) -> Result<Box<dyn Any + Send>> {
        match &self.kind {
            ExtractorKind::Scalar(scalar) => self.extract_scalar(row, scalar),
            ExtractorKind::Object { metadata, slots } => self.extract_object(row, metadata, slots),
        }
    }
    /// Like [`Extractor::extract`] returning the concrete type.
    pub fn extract_as<T: Any>(&self, row: &RowLabeled) -> Result<T> {
        self.extract(row)?
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| {
                Error::msg(format!(
                    "The extractor does not produce a {}",
                    type_name::<T>()
                ))
            })
    }
    fn conversion_failure(&self, index: usize, target: String) -> KeelError {
        KeelError::ConversionFailure {
            column: self.columns.get(index).cloned().unwrap_or_default(),
            target,
        }
    }
    fn extract_scalar(&self, row: &RowLabeled, scalar: &ScalarType) -> Result<Box<dyn Any + Send>> {
        let target = || self.conversion_failure(0, scalar.name().to_string());
        let value = self.converter.read(row, 0)?;
        let value = self
            .converter
            .convert(value, &scalar.template())
            .with_context(target)?;
        scalar.convert(value).with_context(target)
    }
    fn extract_object(
        &self,
        row: &RowLabeled,
        metadata: &BeanMetadata,
        slots: &[Option<Slot>],
    ) -> Result<Box<dyn Any + Send>> {
        let mut instance = self.instantiator.new_instance(metadata)?;
        for (i, slot) in slots.iter().enumerate() {
            let Some(slot) = slot else {
                continue;
            };
            let Some(property) = slot.property() else {
                continue;
            };
            let target = || {
                self.conversion_failure(
                    i,
                    format!("property `{}` of {}", property.name(), property.owner()),
                )
            };
            let value = self.converter.read(row, i)?;
            let template = property.template().cloned().unwrap_or_default();
            let value = self
                .converter
                .convert(value, &template)
                .with_context(target)?;
            let value = if value.is_null() && property.is_primitive() {
                let column = self.columns.get(i).map(String::as_str).unwrap_or_default();
                match self.null_policy.on_null(property, column)? {
                    Some(value) => value,
                    None => {
                        // The intermediate beans are created even when the value is dropped
                        if let Slot::Path(path) = slot {
                            path.nested_object_mut_with(&mut *instance, &*self.instantiator)
                                .with_context(target)?;
                        }
                        continue;
                    }
                }
            } else {
                value
            };
            let owner: &mut dyn Any = &mut *instance;
            let assigned = match slot {
                Slot::Flat(property) => property.set_value(owner, value),
                Slot::Path(path) => path.set_with(owner, value, &*self.instantiator).map(|_| ()),
            };
            assigned.with_context(target)?;
        }
        Ok(instance)
    }
}

impl Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("columns", &self.columns)
            .field("kind", &self.kind)
            .field("null_policy", &self.null_policy)
            .finish()
    }
}
