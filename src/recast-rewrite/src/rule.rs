//! Rewriter trait and the records a rewrite produces.

use common_error::RecastResult;
use recast_expr::Expr;

/// A single rewrite that maps an expression tree to a new tree.
///
/// A rewriter must be referentially transparent: structurally equal inputs
/// produce structurally equal outputs, and the input tree is never modified.
/// A rewriter that finds nothing to do returns its input unchanged rather than
/// an error.
pub trait ExprRewriter: Send + Sync {
    /// Get the name of this rewriter.
    fn name(&self) -> &str;

    /// Get a description of what this rewriter does.
    fn description(&self) -> &str {
        "No description available"
    }

    /// Rewrite the expression, returning the (possibly new) tree.
    fn rewrite(&self, expr: Expr) -> RecastResult<Transformed>;
}

/// The result of applying a rewriter.
#[derive(Debug, Clone)]
pub struct Transformed {
    /// The (potentially rewritten) expression.
    pub expr: Expr,
    /// Whether the expression was actually changed.
    pub changed: bool,
}

impl Transformed {
    /// The expression was rewritten.
    pub fn yes(expr: Expr) -> Self {
        Self {
            expr,
            changed: true,
        }
    }

    /// The expression was left as is.
    pub fn no(expr: Expr) -> Self {
        Self {
            expr,
            changed: false,
        }
    }
}

impl From<Expr> for Transformed {
    fn from(expr: Expr) -> Self {
        Self::no(expr)
    }
}

/// A trace entry for a single rewriter application.
#[derive(Debug, Clone)]
pub struct RewriteTrace {
    /// Name of the rewriter.
    pub rule_name: String,
    /// Expression before the rewriter ran, as explain text.
    pub before: String,
    /// Expression after the rewriter ran, as explain text.
    pub after: String,
    /// Whether the rewriter changed the expression.
    pub changed: bool,
}

impl RewriteTrace {
    /// Create a new trace entry.
    pub fn new(
        rule_name: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
        changed: bool,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            before: before.into(),
            after: after.into(),
            changed,
        }
    }
}

/// Output of a rewrite chain.
#[derive(Debug, Clone)]
pub struct RewrittenExpr {
    /// The final expression.
    pub expr: Expr,
    /// Number of rewriters that changed the expression.
    pub rules_applied: usize,
    /// Per-rewriter trace, empty unless tracing is enabled.
    pub trace: Vec<RewriteTrace>,
}

impl RewrittenExpr {
    /// Wrap an expression that no rewriter has touched.
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            rules_applied: 0,
            trace: Vec::new(),
        }
    }

    /// Format the trace as a human-readable string.
    pub fn format_trace(&self) -> String {
        let mut output = format!("Rewrite completed, {} rules applied\n", self.rules_applied);

        if self.trace.is_empty() {
            output.push_str("  (no trace available)\n");
            return output;
        }

        for entry in &self.trace {
            let status = if entry.changed { "changed" } else { "unchanged" };
            output.push_str(&format!("\n--- {} ({status}) ---\n", entry.rule_name));
            output.push_str("Before:\n");
            output.push_str(&entry.before);
            output.push_str("After:\n");
            output.push_str(&entry.after);
        }

        output
    }
}
