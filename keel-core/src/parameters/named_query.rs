use crate::{
    AsValue, KeelError, ParameterBinder, ParsedSql, Prepared, QueryParameter, Result,
    expand_array_parameters,
};
use std::fmt::{self, Display};

/// SQL template with `:name` markers, scanned once and bound by name.
///
/// ```rust
/// use keel_core::NamedQuery;
/// let mut query = NamedQuery::new("SELECT * FROM user WHERE id IN (:ids) AND active = :active");
/// query.add_array_parameter("ids", [4, 5, 6]).unwrap();
/// query.add_parameter("active", true).unwrap();
/// let expanded = query.build().unwrap();
/// assert_eq!(expanded.sql, "SELECT * FROM user WHERE id IN (?,?,?) AND active = ?");
/// ```
#[derive(Debug, Clone)]
pub struct NamedQuery {
    parsed: ParsedSql,
    batch_mode: bool,
}

/// Final SQL and parameter positions of a bound [`NamedQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedQuery {
    pub sql: String,
    pub parameters: Vec<QueryParameter>,
    pub placeholders: usize,
}

impl NamedQuery {
    pub fn new(sql: impl AsRef<str>) -> Self {
        Self {
            parsed: ParsedSql::parse(sql.as_ref()),
            batch_mode: false,
        }
    }
    /// The SQL with positional placeholders, before any array expansion.
    pub fn parsed(&self) -> &ParsedSql {
        &self.parsed
    }
    /// Names in order of first occurrence.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parsed.parameter_names()
    }
    /// When enabled, the placeholder layout must not change between
    /// executions and array parameters with more than one value are rejected.
    pub fn set_batch_mode(&mut self, batch_mode: bool) -> &mut Self {
        self.batch_mode = batch_mode;
        self
    }
    pub fn is_batch_mode(&self) -> bool {
        self.batch_mode
    }
    pub fn add_parameter(&mut self, name: &str, value: impl AsValue) -> Result<&mut Self> {
        self.set_binder(name, ParameterBinder::single(value))
    }
    /// Bind a sequence, each element takes its own placeholder. An empty
    /// sequence binds a single NULL.
    pub fn add_array_parameter<V: AsValue>(
        &mut self,
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<&mut Self> {
        self.set_binder(name, ParameterBinder::array(values))
    }
    pub fn set_binder(&mut self, name: &str, binder: ParameterBinder) -> Result<&mut Self> {
        let Some(parameter) = self.parsed.parameter_mut(name) else {
            return Err(KeelError::UnknownParameter(name.to_owned()).into());
        };
        parameter.binder = Some(binder);
        Ok(self)
    }
    /// Forget all the values bound so far.
    pub fn clear_parameters(&mut self) -> &mut Self {
        for parameter in self.parsed.parameters_mut() {
            parameter.binder = None;
        }
        self
    }
    /// Expand a copy of the parsed query against the current values, the
    /// query itself stays reusable with different sequence lengths.
    pub fn build(&self) -> Result<ExpandedQuery> {
        let mut parsed = self.parsed.clone();
        expand_array_parameters(&mut parsed, !self.batch_mode)?;
        let placeholders = parsed.placeholder_count();
        let parameters = parsed.parameters().to_vec();
        Ok(ExpandedQuery {
            sql: parsed.sql,
            parameters,
            placeholders,
        })
    }
    /// Build then bind every value onto `prepared`.
    pub fn bind<P: Prepared>(&self, prepared: &mut P) -> Result<ExpandedQuery> {
        let expanded = self.build()?;
        expanded.bind(prepared)?;
        Ok(expanded)
    }
}

impl ExpandedQuery {
    /// Call `bind_index` once for every final position of every parameter.
    pub fn bind<P: Prepared>(&self, prepared: &mut P) -> Result<()> {
        for parameter in &self.parameters {
            let Some(binder) = &parameter.binder else {
                return Err(KeelError::MissingParameterValue(parameter.name.clone()).into());
            };
            let count = binder.element_count();
            for (i, position) in parameter.holder.iter().enumerate() {
                let value = binder.element(i % count);
                log::trace!("Binding `{}` at position {position}", parameter.name);
                prepared.bind_index(value, position as u64)?;
            }
        }
        Ok(())
    }
}

impl Display for NamedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::truncate_long!(self.parsed.sql))
    }
}
