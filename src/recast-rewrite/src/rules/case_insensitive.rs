//! Case-insensitive string equality.

use common_error::RecastResult;
use recast_core::{DataType, StringComparison};
use recast_expr::{BinaryOp, Expr, Method};

use crate::rule::{ExprRewriter, Transformed};

/// Replaces string `==` comparisons with an ordinal ignore-case
/// `StringEquals` call.
///
/// A binary equality qualifies when both operands, after their own rewrite,
/// are typed `String`. Operands may be any node kind: parameters, constants,
/// member accesses or calls. `!=`, ordering comparisons and equality over
/// other types are left as they are. A `null` literal is typed `Null`, so
/// `x == null` keeps its native meaning.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitiveEquality;

impl ExprRewriter for CaseInsensitiveEquality {
    fn name(&self) -> &str {
        "CaseInsensitiveEquality"
    }

    fn description(&self) -> &str {
        "Compare strings for equality ignoring case"
    }

    fn rewrite(&self, expr: Expr) -> RecastResult<Transformed> {
        let (expr, changed) = rewrite_equality(expr)?;
        Ok(Transformed { expr, changed })
    }
}

fn rewrite_equality(expr: Expr) -> RecastResult<(Expr, bool)> {
    match expr {
        Expr::Binary { left, op, right } => {
            let (left, left_changed) = rewrite_equality(*left)?;
            let (right, right_changed) = rewrite_equality(*right)?;

            if op == BinaryOp::Eq && is_string(&left)? && is_string(&right)? {
                let call = Expr::call(
                    Method::StringEquals(StringComparison::OrdinalIgnoreCase),
                    vec![left, right],
                )?;
                return Ok((call, true));
            }

            Ok((
                Expr::binary(left, op, right),
                left_changed || right_changed,
            ))
        }

        // Leaves have nothing to rewrite.
        leaf @ (Expr::Constant(_) | Expr::Parameter(_) | Expr::Source(_)) => Ok((leaf, false)),

        other => {
            let mut changed = false;
            let rebuilt = other.map_children(|child| {
                let (child, child_changed) = rewrite_equality(child)?;
                changed |= child_changed;
                Ok(child)
            })?;
            Ok((rebuilt, changed))
        }
    }
}

fn is_string(expr: &Expr) -> RecastResult<bool> {
    Ok(expr.data_type()? == DataType::String)
}
