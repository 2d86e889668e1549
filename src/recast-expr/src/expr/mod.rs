//! Expression tree types.

mod binary;
mod expression;
mod method;
mod unary;

pub use binary::BinaryOp;
pub use expression::{CallExpr, Expr, ExprKind, LambdaExpr, ParameterExpr, SourceExpr};
pub use method::Method;
pub use unary::UnaryOp;
