use crate::{AsValue, Value};
use std::slice;

/// Positions (1-based) of every placeholder bound to one named parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterIndexHolder {
    Single(usize),
    Multi(Vec<usize>),
}

impl ParameterIndexHolder {
    /// Build a holder from positions in left-to-right order, `None` when empty.
    pub fn from_indices(indices: Vec<usize>) -> Option<Self> {
        match indices.len() {
            0 => None,
            1 => Some(Self::Single(indices[0])),
            _ => Some(Self::Multi(indices)),
        }
    }
    /// Record one more occurrence, upgrading `Single` to `Multi`.
    pub fn push(&mut self, index: usize) {
        match self {
            Self::Single(first) => *self = Self::Multi(vec![*first, index]),
            Self::Multi(indices) => indices.push(index),
        }
    }
    pub fn indices(&self) -> &[usize] {
        match self {
            Self::Single(index) => slice::from_ref(index),
            Self::Multi(indices) => indices,
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices().iter().copied()
    }
    pub fn len(&self) -> usize {
        self.indices().len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices().is_empty()
    }
    pub fn first(&self) -> usize {
        self.indices()[0]
    }
}

/// Value bound to a named parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterBinder {
    Single(Value),
    /// A sequence, each element takes its own placeholder.
    Array(Box<[Value]>),
}

impl ParameterBinder {
    pub fn single(value: impl AsValue) -> Self {
        Self::Single(value.as_value())
    }
    pub fn array<V: AsValue>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Array(values.into_iter().map(AsValue::as_value).collect())
    }
    /// Number of placeholders one occurrence of the parameter expands into.
    /// An empty sequence still occupies one placeholder and binds NULL.
    pub fn element_count(&self) -> usize {
        match self {
            Self::Single(..) => 1,
            Self::Array(values) => values.len().max(1),
        }
    }
    /// The value for the `i`-th placeholder of one occurrence.
    pub fn element(&self, i: usize) -> Value {
        match self {
            Self::Single(value) => value.clone(),
            Self::Array(values) => values.get(i).cloned().unwrap_or(Value::Null),
        }
    }
}

/// A named parameter of a parsed query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    pub name: String,
    pub holder: ParameterIndexHolder,
    pub binder: Option<ParameterBinder>,
}

impl QueryParameter {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            holder: ParameterIndexHolder::Single(index),
            binder: None,
        }
    }
    /// True when bound to a sequence that needs more than one placeholder.
    pub fn is_expanding(&self) -> bool {
        self.binder
            .as_ref()
            .is_some_and(|binder| binder.element_count() > 1)
    }
}

/// One occurrence of an expanding parameter.
///
/// Ordered and compared by original position only.
#[derive(Debug, Clone, Copy)]
pub struct ArrayParameter {
    pub position: usize,
    pub count: usize,
}

impl PartialEq for ArrayParameter {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for ArrayParameter {}

impl PartialOrd for ArrayParameter {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArrayParameter {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.position.cmp(&other.position)
    }
}
