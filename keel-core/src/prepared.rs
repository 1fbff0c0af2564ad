use crate::{AsValue, Result, Value};
use std::fmt::Display;

/// A statement handle accepting positional parameter values.
///
/// This is the seam between [`crate::NamedQuery`] and whatever executes SQL:
/// a driver prepared statement, a logging stub, a test double.
///
/// # Binding Semantics
/// * `bind_index` sets the parameter at `index` (1-based, as in the rewritten SQL).
/// * The same index may be bound more than once, the last value wins.
///
/// Methods return `&mut Self` for fluent chaining:
/// ```rust,ignore
/// prepared.bind(42, 1)?.bind("hello".to_string(), 2)?;
/// ```
pub trait Prepared: Send + Display {
    /// Remove all the previously bound values.
    fn clear_bindings(&mut self) -> Result<&mut Self>;
    /// Bind a dynamic value at a specific index.
    fn bind_index(&mut self, value: Value, index: u64) -> Result<&mut Self>;
    /// Bind any convertible value at a specific index.
    fn bind(&mut self, value: impl AsValue, index: u64) -> Result<&mut Self>
    where
        Self: Sized,
    {
        self.bind_index(value.as_value(), index)
    }
}
