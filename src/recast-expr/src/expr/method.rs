//! Methods that a call expression can bind to.
//!
//! A call node names its method up front, and the method's signature is
//! checked against the argument types when the node is built. A tree that
//! holds a `Call` therefore always refers to a method that resolved.

use common_error::{RecastError, RecastResult};
use recast_core::{DataType, StringComparison};
use serde::{Deserialize, Serialize};

use super::Expr;

/// A method bound by a call expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// Filter a sequence by a predicate lambda.
    Where,
    /// Project each element through a selector lambda.
    Select,
    /// Sort ascending by a key lambda.
    OrderBy,
    /// Sort descending by a key lambda.
    OrderByDescending,
    /// Secondary ascending sort of an ordered sequence.
    ThenBy,
    /// Secondary descending sort of an ordered sequence.
    ThenByDescending,
    /// Bypass a number of elements.
    Skip,
    /// Keep at most a number of elements.
    Take,
    /// Count elements, optionally matching a predicate.
    Count,
    /// Whether any element exists, optionally matching a predicate.
    Any,
    /// First element, optionally matching a predicate.
    First,
    /// String equality under an explicit comparison mode.
    StringEquals(StringComparison),
    /// Uppercase a string.
    ToUpper,
    /// Lowercase a string.
    ToLower,
    /// Substring test (ordinal).
    Contains,
    /// Prefix test (ordinal).
    StartsWith,
}

impl Method {
    /// Method name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Where => "Where",
            Self::Select => "Select",
            Self::OrderBy => "OrderBy",
            Self::OrderByDescending => "OrderByDescending",
            Self::ThenBy => "ThenBy",
            Self::ThenByDescending => "ThenByDescending",
            Self::Skip => "Skip",
            Self::Take => "Take",
            Self::Count => "Count",
            Self::Any => "Any",
            Self::First => "First",
            Self::StringEquals(_) => "StringEquals",
            Self::ToUpper => "ToUpper",
            Self::ToLower => "ToLower",
            Self::Contains => "Contains",
            Self::StartsWith => "StartsWith",
        }
    }

    /// Whether this method consumes a sequence as its first argument.
    pub const fn is_query_operator(&self) -> bool {
        matches!(
            self,
            Self::Where
                | Self::Select
                | Self::OrderBy
                | Self::OrderByDescending
                | Self::ThenBy
                | Self::ThenByDescending
                | Self::Skip
                | Self::Take
                | Self::Count
                | Self::Any
                | Self::First
        )
    }

    /// Whether this method produces an ordered sequence.
    pub const fn is_ordering(&self) -> bool {
        matches!(
            self,
            Self::OrderBy | Self::OrderByDescending | Self::ThenBy | Self::ThenByDescending
        )
    }

    /// Whether this method sorts descending.
    pub const fn is_descending(&self) -> bool {
        matches!(self, Self::OrderByDescending | Self::ThenByDescending)
    }

    /// Resolve the result type of calling this method with `args`.
    ///
    /// Fails with `MethodResolution` when the arguments do not fit the
    /// method's signature.
    pub fn resolve(&self, args: &[Expr]) -> RecastResult<DataType> {
        match self {
            Self::Where => {
                self.arity(args, 2, 2)?;
                let element = self.sequence_element(&args[0])?;
                self.predicate(&args[1], &element)?;
                Ok(DataType::sequence(element))
            }
            Self::Select => {
                self.arity(args, 2, 2)?;
                let element = self.sequence_element(&args[0])?;
                let projected = self.lambda_result(&args[1], &element)?;
                Ok(DataType::sequence(projected))
            }
            Self::OrderBy | Self::OrderByDescending | Self::ThenBy | Self::ThenByDescending => {
                self.arity(args, 2, 2)?;
                if matches!(self, Self::ThenBy | Self::ThenByDescending)
                    && !is_ordered(&args[0])
                {
                    return Err(RecastError::method_resolution(format!(
                        "{} requires an ordered sequence, got {}",
                        self.name(),
                        args[0]
                    )));
                }
                let element = self.sequence_element(&args[0])?;
                let key = self.lambda_result(&args[1], &element)?;
                if !key.is_orderable() {
                    return Err(RecastError::method_resolution(format!(
                        "{} key of type {key} is not orderable",
                        self.name()
                    )));
                }
                Ok(DataType::sequence(element))
            }
            Self::Skip | Self::Take => {
                self.arity(args, 2, 2)?;
                let element = self.sequence_element(&args[0])?;
                self.expect_type(&args[1], &DataType::Int64)?;
                Ok(DataType::sequence(element))
            }
            Self::Count | Self::Any | Self::First => {
                self.arity(args, 1, 2)?;
                let element = self.sequence_element(&args[0])?;
                if let Some(predicate) = args.get(1) {
                    self.predicate(predicate, &element)?;
                }
                Ok(match self {
                    Self::Count => DataType::Int64,
                    Self::Any => DataType::Bool,
                    _ => element,
                })
            }
            Self::StringEquals(_) | Self::Contains | Self::StartsWith => {
                self.arity(args, 2, 2)?;
                self.expect_type(&args[0], &DataType::String)?;
                self.expect_type(&args[1], &DataType::String)?;
                Ok(DataType::Bool)
            }
            Self::ToUpper | Self::ToLower => {
                self.arity(args, 1, 1)?;
                self.expect_type(&args[0], &DataType::String)?;
                Ok(DataType::String)
            }
        }
    }

    fn arity(&self, args: &[Expr], min: usize, max: usize) -> RecastResult<()> {
        if (min..=max).contains(&args.len()) {
            return Ok(());
        }
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min} to {max}")
        };
        Err(RecastError::method_resolution(format!(
            "{self} expects {expected} arguments, got {}",
            args.len()
        )))
    }

    fn sequence_element(&self, arg: &Expr) -> RecastResult<DataType> {
        match arg.data_type()? {
            DataType::Sequence(element) => Ok(*element),
            other => Err(RecastError::method_resolution(format!(
                "{self} expects a sequence, got {other}"
            ))),
        }
    }

    fn expect_type(&self, arg: &Expr, expected: &DataType) -> RecastResult<()> {
        let actual = arg.data_type()?;
        if actual.can_coerce_to(expected) {
            Ok(())
        } else {
            Err(RecastError::method_resolution(format!(
                "{self} cannot be applied to {actual}, expected {expected}"
            )))
        }
    }

    /// Check a single-parameter lambda over `element` and return its body type.
    fn lambda_result(&self, arg: &Expr, element: &DataType) -> RecastResult<DataType> {
        let Expr::Lambda(lambda) = arg else {
            return Err(RecastError::method_resolution(format!(
                "{self} expects a lambda, got {arg}"
            )));
        };
        match lambda.params() {
            [param] if param.data_type() == element => lambda.body().data_type(),
            [param] => Err(RecastError::method_resolution(format!(
                "{self} lambda parameter '{}' has type {}, sequence yields {element}",
                param.name(),
                param.data_type()
            ))),
            params => Err(RecastError::method_resolution(format!(
                "{self} lambda takes 1 parameter, got {}",
                params.len()
            ))),
        }
    }

    fn predicate(&self, arg: &Expr, element: &DataType) -> RecastResult<()> {
        let result = self.lambda_result(arg, element)?;
        if result == DataType::Bool {
            Ok(())
        } else {
            Err(RecastError::method_resolution(format!(
                "{self} predicate must return Bool, got {result}"
            )))
        }
    }
}

fn is_ordered(expr: &Expr) -> bool {
    matches!(expr, Expr::Call(call) if call.method().is_ordering())
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StringEquals(comparison) => write!(f, "StringEquals[{comparison}]"),
            other => write!(f, "{}", other.name()),
        }
    }
}
