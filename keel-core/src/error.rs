use thiserror::Error;

/// Failures specific to parameter expansion, binding and result mapping.
///
/// They travel inside [`crate::Error`] (an `anyhow::Error`) and can be
/// recovered with `error.downcast_ref::<KeelError>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeelError {
    #[error("Array parameters are not allowed in batch mode")]
    ArrayExpansionDisallowed,

    #[error("Could not map column `{column}` to any property of the target type")]
    UnresolvedColumnMapping { column: String },

    #[error("Cannot convert the value of column `{column}` into {target}")]
    ConversionFailure { column: String, target: String },

    #[error("Column `{column}` is NULL but property `{property}` cannot hold NULL")]
    PrimitiveNull { column: String, property: String },

    #[error("Unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("Parameter `{0}` has no value bound")]
    MissingParameterValue(String),

    #[error("Property `{property}` not found in {bean}")]
    PropertyNotFound { bean: String, property: String },

    #[error("Property `{property}` of {bean} is not {access}")]
    PropertyAccess {
        bean: String,
        property: String,
        access: &'static str,
    },
}
