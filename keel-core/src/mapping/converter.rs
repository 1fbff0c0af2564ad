use crate::{Error, Result, RowLabeled, Value};

/// Reads column values out of a row and adapts them before they are assigned.
///
/// The final conversion into the property type goes through
/// [`crate::AsValue::try_from_value`], a converter only reshapes the dynamic value.
pub trait ColumnValueConverter: Send + Sync {
    fn read(&self, row: &RowLabeled, index: usize) -> Result<Value> {
        row.values.get(index).cloned().ok_or_else(|| {
            Error::msg(format!(
                "Column {index} is out of range, the row has {} values",
                row.values.len()
            ))
        })
    }
    /// `template` is the empty value of the destination type.
    fn convert(&self, value: Value, template: &Value) -> Result<Value>;
}

/// Turns untyped NULLs into the NULL of the destination type and leaves
/// everything else as it is.
#[derive(Default, Debug, Clone, Copy)]
pub struct DefaultConverter;

impl ColumnValueConverter for DefaultConverter {
    fn convert(&self, value: Value, template: &Value) -> Result<Value> {
        Ok(match value {
            Value::Null | Value::Unknown(None) => template.clone(),
            v => v,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn reads_and_converts() {
        let row = RowLabeled::new(
            Arc::from(["a".to_string()]),
            [Value::Int32(Some(1))].into(),
        );
        assert_eq!(DefaultConverter.read(&row, 0).unwrap(), Value::Int32(Some(1)));
        assert!(DefaultConverter.read(&row, 1).is_err());
        assert_eq!(
            DefaultConverter
                .convert(Value::Null, &Value::Int64(None))
                .unwrap(),
            Value::Int64(None)
        );
        assert_eq!(
            DefaultConverter
                .convert(Value::Int32(Some(3)), &Value::Int64(None))
                .unwrap(),
            Value::Int32(Some(3))
        );
    }
}
