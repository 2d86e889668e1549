//! Expression rewriting for Recast query trees.
//!
//! A rewriter takes an [`Expr`](recast_expr::Expr) and returns a new tree,
//! never mutating its input. Rewriters are composed into a [`RewriteChain`]
//! that applies each one once, in registration order.

mod chain;
mod fn_rewriter;
mod rule;
mod rules;

pub use chain::RewriteChain;
pub use fn_rewriter::FnRewriter;
pub use rule::{ExprRewriter, RewriteTrace, RewrittenExpr, Transformed};
pub use rules::CaseInsensitiveEquality;

use common_error::RecastResult;
use recast_expr::Expr;

/// Rewrite an expression with the default chain.
pub fn rewrite(expr: Expr) -> RecastResult<Expr> {
    RewriteChain::default().rewrite(expr).map(|r| r.expr)
}
