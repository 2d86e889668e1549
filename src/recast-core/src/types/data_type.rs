//! Static data types for expression nodes.

use serde::{Deserialize, Serialize};

use super::RecordType;

/// Static type of an expression node or query element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Null type (untyped null literal).
    Null,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Structured record with named fields.
    Record(RecordType),
    /// Lazily produced sequence of elements.
    Sequence(Box<Self>),
    /// Function type of a lambda expression.
    Function {
        /// Parameter types, in order.
        params: Vec<Self>,
        /// Result type of the body.
        result: Box<Self>,
    },
}

impl DataType {
    /// Create a sequence type over `element`.
    pub fn sequence(element: Self) -> Self {
        Self::Sequence(Box::new(element))
    }

    /// Check if this type is numeric.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// Check if this type is the string type.
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }

    /// Check if this type is a sequence type.
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    /// Element type of a sequence, or `None` for scalar types.
    pub fn element_type(&self) -> Option<&Self> {
        match self {
            Self::Sequence(inner) => Some(inner),
            _ => None,
        }
    }

    /// Record type, if this is a record.
    pub const fn as_record(&self) -> Option<&RecordType> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Get the display name for this type.
    pub fn display_name(&self) -> String {
        match self {
            Self::Null => "Null".to_string(),
            Self::Bool => "Bool".to_string(),
            Self::Int64 => "Int64".to_string(),
            Self::Float64 => "Float64".to_string(),
            Self::String => "String".to_string(),
            Self::Record(record) => record.name().to_string(),
            Self::Sequence(inner) => format!("Sequence<{}>", inner.display_name()),
            Self::Function { params, result } => {
                let params = params
                    .iter()
                    .map(Self::display_name)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Fn({params}) -> {}", result.display_name())
            }
        }
    }

    /// Check if this type can be coerced to another type.
    pub fn can_coerce_to(&self, target: &Self) -> bool {
        if self == target {
            return true;
        }

        match (self, target) {
            // Null can coerce to anything, Int64 widens to Float64
            (Self::Null, _) | (Self::Int64, Self::Float64) => true,
            (Self::Sequence(a), Self::Sequence(b)) => a.can_coerce_to(b),
            _ => false,
        }
    }

    /// Get the common supertype of two types.
    pub fn common_supertype(&self, other: &Self) -> Option<Self> {
        if self == other {
            return Some(self.clone());
        }

        match (self, other) {
            (Self::Null, t) | (t, Self::Null) => Some(t.clone()),
            (Self::Int64, Self::Float64) | (Self::Float64, Self::Int64) => Some(Self::Float64),
            _ => None,
        }
    }

    /// Whether values of this type have a total order usable for sorting.
    pub const fn is_orderable(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool | Self::Int64 | Self::Float64 | Self::String
        )
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
