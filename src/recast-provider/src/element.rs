//! Conversion from dynamic values to typed query elements.

use common_error::{RecastError, RecastResult};
use recast_core::{DataType, Record, Value};

/// A Rust type that query results can be converted into.
///
/// `accepts` is checked when a typed handle is created, so an element type
/// mismatch is reported before anything runs. `from_value` converts each row.
pub trait Element: Sized + Send + 'static {
    /// Whether values of `data_type` convert to `Self`.
    fn accepts(data_type: &DataType) -> bool;

    /// Convert a single value.
    fn from_value(value: Value) -> RecastResult<Self>;
}

fn mismatch(expected: &str, value: &Value) -> RecastError {
    RecastError::type_error(format!(
        "expected {expected}, got {} value {value}",
        value.type_name()
    ))
}

impl Element for Value {
    fn accepts(_data_type: &DataType) -> bool {
        true
    }

    fn from_value(value: Value) -> RecastResult<Self> {
        Ok(value)
    }
}

impl Element for String {
    fn accepts(data_type: &DataType) -> bool {
        data_type.is_string()
    }

    fn from_value(value: Value) -> RecastResult<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("String", &other)),
        }
    }
}

impl Element for i64 {
    fn accepts(data_type: &DataType) -> bool {
        matches!(data_type, DataType::Int64)
    }

    fn from_value(value: Value) -> RecastResult<Self> {
        match value {
            Value::Int64(i) => Ok(i),
            other => Err(mismatch("Int64", &other)),
        }
    }
}

impl Element for f64 {
    fn accepts(data_type: &DataType) -> bool {
        data_type.is_numeric()
    }

    fn from_value(value: Value) -> RecastResult<Self> {
        match value {
            Value::Float64(f) => Ok(f),
            #[allow(clippy::cast_precision_loss)]
            Value::Int64(i) => Ok(i as f64),
            other => Err(mismatch("Float64", &other)),
        }
    }
}

impl Element for bool {
    fn accepts(data_type: &DataType) -> bool {
        matches!(data_type, DataType::Bool)
    }

    fn from_value(value: Value) -> RecastResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("Bool", &other)),
        }
    }
}

impl Element for Record {
    fn accepts(data_type: &DataType) -> bool {
        data_type.as_record().is_some()
    }

    fn from_value(value: Value) -> RecastResult<Self> {
        match value {
            Value::Record(r) => Ok(r),
            other => Err(mismatch("Record", &other)),
        }
    }
}

impl<T: Element> Element for Option<T> {
    fn accepts(data_type: &DataType) -> bool {
        matches!(data_type, DataType::Null) || T::accepts(data_type)
    }

    fn from_value(value: Value) -> RecastResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts() {
        assert!(String::accepts(&DataType::String));
        assert!(!String::accepts(&DataType::Int64));
        assert!(f64::accepts(&DataType::Int64));
        assert!(!i64::accepts(&DataType::Float64));
        assert!(Value::accepts(&DataType::sequence(DataType::Bool)));
        assert!(Option::<String>::accepts(&DataType::String));
    }

    #[test]
    fn test_from_value() {
        assert_eq!(String::from_value(Value::from("a")).unwrap(), "a");
        assert_eq!(f64::from_value(Value::Int64(2)).unwrap(), 2.0);
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(Value::Int64(4)).unwrap(), Some(4));

        let err = bool::from_value(Value::from("yes")).unwrap_err();
        assert!(matches!(err, RecastError::TypeError(_)));
        assert!(err.to_string().contains("expected Bool"));
    }
}
