//! Binary operators for expressions.

use recast_core::DataType;
use serde::{Deserialize, Serialize};

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic operators
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Subtract,
    /// Multiplication (*)
    Multiply,
    /// Division (/)
    Divide,
    /// Modulo (%)
    Modulo,

    // Comparison operators
    /// Equality (==), ordinal for strings
    Eq,
    /// Inequality (!=)
    NotEq,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    LtEq,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    GtEq,

    // Logical operators
    /// Logical AND
    And,
    /// Logical OR
    Or,

    /// String concatenation
    Concat,
}

impl BinaryOp {
    /// Check if this is an arithmetic operator.
    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo
        )
    }

    /// Check if this is a comparison operator.
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    /// Check if this is a logical operator.
    pub const fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Get the result type of this operator given input types.
    ///
    /// Returns `None` if the operation is not valid for the given types.
    pub fn result_type(&self, left: &DataType, right: &DataType) -> Option<DataType> {
        match self {
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo => {
                match (left, right) {
                    (DataType::Int64, DataType::Int64) => Some(DataType::Int64),
                    (DataType::Float64, DataType::Float64)
                    | (DataType::Int64, DataType::Float64)
                    | (DataType::Float64, DataType::Int64) => Some(DataType::Float64),
                    _ => None,
                }
            }

            // Equality works on any pair of compatible types
            Self::Eq | Self::NotEq => left.common_supertype(right).map(|_| DataType::Bool),

            // Ordering comparisons need an orderable common type
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => left
                .common_supertype(right)
                .filter(DataType::is_orderable)
                .map(|_| DataType::Bool),

            Self::And | Self::Or => {
                if matches!(left, DataType::Bool) && matches!(right, DataType::Bool) {
                    Some(DataType::Bool)
                } else {
                    None
                }
            }

            Self::Concat => {
                if left.is_string() && right.is_string() {
                    Some(DataType::String)
                } else {
                    None
                }
            }
        }
    }

    /// Get the operator symbol for display.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Concat => "++",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_type_inference() {
        assert_eq!(
            BinaryOp::Add.result_type(&DataType::Int64, &DataType::Int64),
            Some(DataType::Int64)
        );
        assert_eq!(
            BinaryOp::Add.result_type(&DataType::Int64, &DataType::Float64),
            Some(DataType::Float64)
        );
        assert_eq!(
            BinaryOp::Add.result_type(&DataType::String, &DataType::Int64),
            None
        );
    }

    #[test]
    fn test_comparison_type_inference() {
        assert_eq!(
            BinaryOp::Eq.result_type(&DataType::String, &DataType::String),
            Some(DataType::Bool)
        );
        assert_eq!(
            BinaryOp::Eq.result_type(&DataType::String, &DataType::Null),
            Some(DataType::Bool)
        );
        assert_eq!(
            BinaryOp::Eq.result_type(&DataType::String, &DataType::Int64),
            None
        );
        assert_eq!(
            BinaryOp::Lt.result_type(&DataType::Int64, &DataType::Float64),
            Some(DataType::Bool)
        );
    }

    #[test]
    fn test_logical_type_inference() {
        assert_eq!(
            BinaryOp::And.result_type(&DataType::Bool, &DataType::Bool),
            Some(DataType::Bool)
        );
        assert_eq!(
            BinaryOp::Or.result_type(&DataType::Int64, &DataType::Bool),
            None
        );
    }

    #[test]
    fn test_operator_classification() {
        assert!(BinaryOp::Add.is_arithmetic());
        assert!(BinaryOp::Eq.is_comparison());
        assert!(!BinaryOp::Eq.is_arithmetic());
        assert!(BinaryOp::And.is_logical());
    }
}
