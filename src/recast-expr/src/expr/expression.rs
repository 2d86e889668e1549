//! Query expression tree.
//!
//! An `Expr` describes a whole query: the source it reads, the operators
//! applied to it, and the scalar expressions inside those operators' lambdas.
//! Trees are immutable values; every transformation builds a new tree.

use common_error::{RecastError, RecastResult};
use recast_core::{DataType, StringComparison, Value};
use serde::{Deserialize, Serialize};

use super::{BinaryOp, Method, UnaryOp};

/// A query expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal constant value.
    Constant(Value),

    /// A lambda parameter reference.
    Parameter(ParameterExpr),

    /// Access to a named member of a record-typed expression.
    Member {
        /// Record-typed operand.
        expr: Box<Self>,
        /// Member name.
        member: String,
        /// Declared type of the member.
        data_type: DataType,
    },

    /// A binary operation.
    Binary {
        /// Left operand.
        left: Box<Self>,
        /// Binary operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Self>,
    },

    /// A unary operation.
    Unary {
        /// Unary operator.
        op: UnaryOp,
        /// Operand.
        expr: Box<Self>,
    },

    /// A call to a resolved method.
    Call(CallExpr),

    /// A lambda abstraction.
    Lambda(LambdaExpr),

    /// A named data source, resolved by the executing provider.
    Source(SourceExpr),
}

/// Discriminant of an [`Expr`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// [`Expr::Constant`]
    Constant,
    /// [`Expr::Parameter`]
    Parameter,
    /// [`Expr::Member`]
    Member,
    /// [`Expr::Binary`]
    Binary,
    /// [`Expr::Unary`]
    Unary,
    /// [`Expr::Call`]
    Call,
    /// [`Expr::Lambda`]
    Lambda,
    /// [`Expr::Source`]
    Source,
}

impl ExprKind {
    /// Display name of the node kind.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Constant => "Constant",
            Self::Parameter => "Parameter",
            Self::Member => "Member",
            Self::Binary => "Binary",
            Self::Unary => "Unary",
            Self::Call => "Call",
            Self::Lambda => "Lambda",
            Self::Source => "Source",
        }
    }
}

impl std::fmt::Display for ExprKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named, typed lambda parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterExpr {
    name: String,
    data_type: DataType,
}

impl ParameterExpr {
    /// Create a new parameter.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type.
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }
}

/// A method call whose signature has been resolved.
///
/// Deserialized calls are resolved again; the serialized return type is
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UnresolvedCall")]
pub struct CallExpr {
    method: Method,
    args: Vec<Expr>,
    return_type: DataType,
}

#[derive(Deserialize)]
struct UnresolvedCall {
    method: Method,
    args: Vec<Expr>,
}

impl TryFrom<UnresolvedCall> for CallExpr {
    type Error = RecastError;

    fn try_from(call: UnresolvedCall) -> RecastResult<Self> {
        Self::new(call.method, call.args)
    }
}

impl CallExpr {
    /// Resolve `method` against `args` and build the call.
    pub fn new(method: Method, args: Vec<Expr>) -> RecastResult<Self> {
        let return_type = method.resolve(&args)?;
        Ok(Self {
            method,
            args,
            return_type,
        })
    }

    /// Bound method.
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Call arguments.
    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    /// Resolved return type.
    pub const fn return_type(&self) -> &DataType {
        &self.return_type
    }

    /// Decompose into method and arguments.
    pub fn into_parts(self) -> (Method, Vec<Expr>) {
        (self.method, self.args)
    }
}

/// A lambda: parameters plus a body expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaExpr {
    params: Vec<ParameterExpr>,
    body: Box<Expr>,
}

impl LambdaExpr {
    /// Lambda parameters.
    pub fn params(&self) -> &[ParameterExpr] {
        &self.params
    }

    /// Lambda body.
    pub fn body(&self) -> &Expr {
        &self.body
    }
}

/// A named data source and the type of its elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceExpr {
    name: String,
    element_type: DataType,
}

impl SourceExpr {
    /// Source name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type of the source.
    pub const fn element_type(&self) -> &DataType {
        &self.element_type
    }
}

impl Expr {
    // ========== Constructors ==========

    /// Create a constant expression.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    /// Create a parameter reference.
    pub fn parameter(name: impl Into<String>, data_type: DataType) -> Self {
        Self::Parameter(ParameterExpr::new(name, data_type))
    }

    /// Create a source reference.
    pub fn source(name: impl Into<String>, element_type: DataType) -> Self {
        Self::Source(SourceExpr {
            name: name.into(),
            element_type,
        })
    }

    /// Create a binary expression.
    pub fn binary(left: Self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression.
    pub fn unary(op: UnaryOp, expr: Self) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    /// Create a call, resolving the method signature immediately.
    pub fn call(method: Method, args: Vec<Self>) -> RecastResult<Self> {
        CallExpr::new(method, args).map(Self::Call)
    }

    /// Create a lambda expression.
    pub fn lambda(params: Vec<ParameterExpr>, body: Self) -> Self {
        Self::Lambda(LambdaExpr {
            params,
            body: Box::new(body),
        })
    }

    /// Access a member of this record-typed expression.
    ///
    /// Fails with `MemberNotFound` if the record type has no such member and
    /// with `TypeError` if this expression is not a record.
    pub fn member(self, name: impl Into<String>) -> RecastResult<Self> {
        let name = name.into();
        let data_type = match self.data_type()? {
            DataType::Record(record) => match record.field(&name) {
                Some((_, field)) => field.data_type.clone(),
                None => {
                    return Err(RecastError::member_not_found(format!(
                        "type {} has no member '{name}'",
                        record.name()
                    )));
                }
            },
            other => {
                return Err(RecastError::type_error(format!(
                    "cannot access member '{name}' of {other}"
                )));
            }
        };

        Ok(Self::Member {
            expr: Box::new(self),
            member: name,
            data_type,
        })
    }

    // ========== Convenience builders ==========

    /// Create an equality expression.
    #[must_use]
    pub fn eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Eq, other)
    }

    /// Create an inequality expression.
    #[must_use]
    pub fn not_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::NotEq, other)
    }

    /// Create a less than expression.
    #[must_use]
    pub fn lt(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Lt, other)
    }

    /// Create a less than or equal expression.
    #[must_use]
    pub fn lt_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::LtEq, other)
    }

    /// Create a greater than expression.
    #[must_use]
    pub fn gt(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Gt, other)
    }

    /// Create a greater than or equal expression.
    #[must_use]
    pub fn gt_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::GtEq, other)
    }

    /// Create an AND expression.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::And, other)
    }

    /// Create an OR expression.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Or, other)
    }

    /// Create a NOT expression.
    #[must_use]
    pub fn logical_not(self) -> Self {
        Self::unary(UnaryOp::Not, self)
    }

    /// Create an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::unary(UnaryOp::IsNull, self)
    }

    /// Create an addition expression.
    #[must_use]
    pub fn add_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Add, other)
    }

    /// Call `StringEquals` with an explicit comparison mode.
    pub fn string_equals(self, other: Self, comparison: StringComparison) -> RecastResult<Self> {
        Self::call(Method::StringEquals(comparison), vec![self, other])
    }

    // ========== Analysis methods ==========

    /// Node kind tag.
    pub const fn kind(&self) -> ExprKind {
        match self {
            Self::Constant(_) => ExprKind::Constant,
            Self::Parameter(_) => ExprKind::Parameter,
            Self::Member { .. } => ExprKind::Member,
            Self::Binary { .. } => ExprKind::Binary,
            Self::Unary { .. } => ExprKind::Unary,
            Self::Call(_) => ExprKind::Call,
            Self::Lambda(_) => ExprKind::Lambda,
            Self::Source(_) => ExprKind::Source,
        }
    }

    /// Parameter definition, if this is a parameter reference.
    pub const fn as_parameter(&self) -> Option<&ParameterExpr> {
        match self {
            Self::Parameter(p) => Some(p),
            _ => None,
        }
    }

    /// Call node, if this is a call.
    pub const fn as_call(&self) -> Option<&CallExpr> {
        match self {
            Self::Call(c) => Some(c),
            _ => None,
        }
    }

    /// Resolve the static type of this expression.
    ///
    /// Fails with `TypeError` when an operator is applied to operands it
    /// does not accept.
    pub fn data_type(&self) -> RecastResult<DataType> {
        match self {
            Self::Constant(v) => Ok(v.data_type()),
            Self::Parameter(p) => Ok(p.data_type.clone()),
            Self::Member { data_type, .. } => Ok(data_type.clone()),
            Self::Binary { left, op, right } => {
                let left_type = left.data_type()?;
                let right_type = right.data_type()?;
                op.result_type(&left_type, &right_type).ok_or_else(|| {
                    RecastError::type_error(format!(
                        "operator {op} cannot be applied to {left_type} and {right_type}"
                    ))
                })
            }
            Self::Unary { op, expr } => {
                let input_type = expr.data_type()?;
                op.result_type(&input_type).ok_or_else(|| {
                    RecastError::type_error(format!(
                        "operator {op} cannot be applied to {input_type}"
                    ))
                })
            }
            Self::Call(call) => Ok(call.return_type.clone()),
            Self::Lambda(lambda) => Ok(DataType::Function {
                params: lambda.params.iter().map(|p| p.data_type.clone()).collect(),
                result: Box::new(lambda.body.data_type()?),
            }),
            Self::Source(source) => Ok(DataType::sequence(source.element_type.clone())),
        }
    }

    /// Direct children of this node, in evaluation order.
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Constant(_) | Self::Parameter(_) | Self::Source(_) => vec![],
            Self::Member { expr, .. } | Self::Unary { expr, .. } => vec![expr],
            Self::Binary { left, right, .. } => vec![left, right],
            Self::Call(call) => call.args.iter().collect(),
            Self::Lambda(lambda) => vec![&lambda.body],
        }
    }

    /// Rebuild this node with every direct child replaced by `f(child)`.
    ///
    /// Call nodes are re-resolved, so a transformation that changes a child's
    /// type in a way the method does not accept fails here rather than at
    /// execution time.
    pub fn map_children<F>(self, mut f: F) -> RecastResult<Self>
    where
        F: FnMut(Self) -> RecastResult<Self>,
    {
        Ok(match self {
            Self::Constant(_) | Self::Parameter(_) | Self::Source(_) => self,
            Self::Member {
                expr,
                member,
                data_type,
            } => Self::Member {
                expr: Box::new(f(*expr)?),
                member,
                data_type,
            },
            Self::Binary { left, op, right } => {
                let left = f(*left)?;
                let right = f(*right)?;
                Self::binary(left, op, right)
            }
            Self::Unary { op, expr } => Self::unary(op, f(*expr)?),
            Self::Call(call) => {
                let args = call
                    .args
                    .into_iter()
                    .map(&mut f)
                    .collect::<RecastResult<Vec<_>>>()?;
                Self::call(call.method, args)?
            }
            Self::Lambda(lambda) => Self::Lambda(LambdaExpr {
                params: lambda.params,
                body: Box::new(f(*lambda.body)?),
            }),
        })
    }

    /// Check whether any node in the tree satisfies `predicate`.
    pub fn any_node<P>(&self, predicate: &P) -> bool
    where
        P: Fn(&Self) -> bool,
    {
        predicate(self) || self.children().into_iter().any(|c| c.any_node(predicate))
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Self::node_count)
            .sum::<usize>()
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(v) => write!(f, "{v}"),
            Self::Parameter(p) => write!(f, "{}", p.name),
            Self::Member { expr, member, .. } => write!(f, "{expr}.{member}"),
            Self::Binary { left, op, right } => write!(f, "({left} {op} {right})"),
            Self::Unary { op, expr } => {
                if op.is_prefix() {
                    write!(f, "{op}{expr}")
                } else {
                    write!(f, "{expr} {op}")
                }
            }
            Self::Call(call) => {
                let args = call
                    .args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}({args})", call.method)
            }
            Self::Lambda(lambda) => match lambda.params.as_slice() {
                [single] => write!(f, "{} => {}", single.name, lambda.body),
                params => {
                    let names = params
                        .iter()
                        .map(|p| p.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "({names}) => {}", lambda.body)
                }
            },
            Self::Source(source) => write!(f, "source({})", source.name),
        }
    }
}
