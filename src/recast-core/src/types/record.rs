//! Structured record values and their types.

use common_error::{RecastError, RecastResult};
use serde::{Deserialize, Serialize};

use super::{DataType, Value};

/// A named field of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Declared type of the field.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Type of a record: a name plus an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordType {
    name: String,
    fields: Vec<Field>,
}

impl RecordType {
    /// Create a new record type.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Find a field by name, returning its position and definition.
    pub fn field(&self, name: &str) -> Option<(usize, &Field)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Check that a record conforms to this type.
    ///
    /// Field names must match in order; each value must be null or coercible
    /// to the declared field type.
    pub fn validate(&self, record: &Record) -> RecastResult<()> {
        if record.type_name() != self.name {
            return Err(RecastError::type_error(format!(
                "expected record of type {}, got {}",
                self.name,
                record.type_name()
            )));
        }
        if record.len() != self.fields.len() {
            return Err(RecastError::type_error(format!(
                "record {} has {} fields, type declares {}",
                self.name,
                record.len(),
                self.fields.len()
            )));
        }

        for (field, (name, value)) in self.fields.iter().zip(record.iter()) {
            if field.name != *name {
                return Err(RecastError::type_error(format!(
                    "record {} field '{name}' does not match declared field '{}'",
                    self.name, field.name
                )));
            }
            if !value.data_type().can_coerce_to(&field.data_type) {
                return Err(RecastError::type_error(format!(
                    "field {}.{} expects {}, got {}",
                    self.name,
                    field.name,
                    field.data_type,
                    value.type_name()
                )));
            }
        }

        Ok(())
    }
}

/// A record value: a type name plus ordered named values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Type name of this record.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Value of a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Value of a field by position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.fields.get(index).map(|(_, v)| v)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Infer a record type from the values present.
    pub fn record_type(&self) -> RecordType {
        RecordType::new(
            self.type_name.clone(),
            self.fields
                .iter()
                .map(|(n, v)| Field::new(n.clone(), v.data_type()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thing_type() -> RecordType {
        RecordType::new(
            "Thing",
            vec![
                Field::new("name", DataType::String),
                Field::new("rank", DataType::Int64),
            ],
        )
    }

    #[test]
    fn test_field_lookup() {
        let ty = thing_type();
        let (index, field) = ty.field("rank").unwrap();
        assert_eq!(index, 1);
        assert_eq!(field.data_type, DataType::Int64);
        assert!(ty.field("missing").is_none());
    }

    #[test]
    fn test_record_access() {
        let rec = Record::new("Thing").with("name", "a").with("rank", 3i64);
        assert_eq!(rec.get("name"), Some(&Value::from("a")));
        assert_eq!(rec.get_index(1), Some(&Value::Int64(3)));
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn test_validate_accepts_nulls() {
        let rec = Record::new("Thing").with("name", Value::Null).with("rank", 1i64);
        assert!(thing_type().validate(&rec).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_field_type() {
        let rec = Record::new("Thing").with("name", 5i64).with("rank", 1i64);
        let err = thing_type().validate(&rec).unwrap_err();
        assert!(matches!(err, RecastError::TypeError(_)));
        assert!(err.to_string().contains("Thing.name"));
    }

    #[test]
    fn test_validate_rejects_wrong_shape() {
        let ty = thing_type();
        assert!(ty.validate(&Record::new("Other")).is_err());
        assert!(ty.validate(&Record::new("Thing").with("name", "x")).is_err());
        let swapped = Record::new("Thing").with("rank", 1i64).with("name", "x");
        assert!(ty.validate(&swapped).is_err());
    }
}
