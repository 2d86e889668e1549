//! Immutable query expression trees.
//!
//! A query is described as an [`Expr`] tree: a [`Expr::Source`] at the
//! leaf, wrapped in [`Expr::Call`] nodes for each operator, with scalar
//! logic held in [`Expr::Lambda`] arguments. Calls are resolved when they
//! are built, so every tree in circulation is well typed.

mod explain;
pub mod expr;

pub use expr::{
    BinaryOp, CallExpr, Expr, ExprKind, LambdaExpr, Method, ParameterExpr, SourceExpr, UnaryOp,
};

/// Create a constant expression.
pub fn lit(value: impl Into<recast_core::Value>) -> Expr {
    Expr::constant(value)
}

/// Create a parameter reference.
pub fn param(name: impl Into<String>, data_type: recast_core::DataType) -> Expr {
    Expr::parameter(name, data_type)
}
