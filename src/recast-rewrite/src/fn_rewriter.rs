//! Closure-backed rewriter.

use common_error::RecastResult;
use recast_expr::Expr;

use crate::rule::{ExprRewriter, Transformed};

/// Adapts a plain function over expressions into an [`ExprRewriter`].
///
/// Whether the function changed anything is decided by comparing its output
/// with its input.
pub struct FnRewriter<F> {
    name: String,
    func: F,
}

impl<F> FnRewriter<F>
where
    F: Fn(Expr) -> RecastResult<Expr> + Send + Sync,
{
    /// Create a named rewriter from `func`.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> ExprRewriter for FnRewriter<F>
where
    F: Fn(Expr) -> RecastResult<Expr> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "User-supplied expression function"
    }

    fn rewrite(&self, expr: Expr) -> RecastResult<Transformed> {
        let before = expr.clone();
        let after = (self.func)(expr)?;
        if after == before {
            Ok(Transformed::no(after))
        } else {
            Ok(Transformed::yes(after))
        }
    }
}

impl<F> std::fmt::Debug for FnRewriter<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRewriter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
