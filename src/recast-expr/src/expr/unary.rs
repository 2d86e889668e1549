//! Unary operators for expressions.

use recast_core::DataType;
use serde::{Deserialize, Serialize};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical NOT
    Not,
    /// Arithmetic negation (-)
    Neg,
    /// Null check
    IsNull,
    /// Not-null check
    IsNotNull,
}

impl UnaryOp {
    /// Get the result type of this operator given the input type.
    pub fn result_type(&self, input: &DataType) -> Option<DataType> {
        match self {
            Self::Not => matches!(input, DataType::Bool).then_some(DataType::Bool),
            Self::Neg => input.is_numeric().then(|| input.clone()),
            Self::IsNull | Self::IsNotNull => Some(DataType::Bool),
        }
    }

    /// Get the operator name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Neg => "-",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator is written before its operand.
    pub const fn is_prefix(&self) -> bool {
        matches!(self, Self::Not | Self::Neg)
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
