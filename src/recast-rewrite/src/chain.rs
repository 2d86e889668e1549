//! Ordered rewrite chains.

use std::sync::Arc;

use common_config::RewriteConfig;
use common_error::RecastResult;
use log::debug;
use recast_expr::Expr;

use crate::rule::{ExprRewriter, RewriteTrace, RewrittenExpr};
use crate::rules::CaseInsensitiveEquality;

/// An ordered list of rewriters.
///
/// Each rewriter runs exactly once per call to [`RewriteChain::rewrite`], in
/// registration order, and receives the previous rewriter's output. There is
/// no fixpoint iteration. Chains are cheap to clone and are shared by every
/// query handle derived from the same intercepting provider.
#[derive(Clone, Default)]
pub struct RewriteChain {
    rules: Vec<Arc<dyn ExprRewriter>>,
    config: RewriteConfig,
}

impl RewriteChain {
    /// Create a chain with the given rewriters.
    pub fn new(rules: Vec<Arc<dyn ExprRewriter>>) -> Self {
        Self {
            rules,
            config: RewriteConfig::default(),
        }
    }

    /// Create a chain with custom config.
    pub fn with_config(rules: Vec<Arc<dyn ExprRewriter>>, config: RewriteConfig) -> Self {
        Self { rules, config }
    }

    /// Build the standard chain described by `config`.
    pub fn from_config(config: &RewriteConfig) -> Self {
        let mut rules: Vec<Arc<dyn ExprRewriter>> = Vec::new();
        if config.case_insensitive {
            rules.push(Arc::new(CaseInsensitiveEquality));
        }
        Self::with_config(rules, config.clone())
    }

    /// Append a rewriter to the end of the chain.
    pub fn add_rule<R: ExprRewriter + 'static>(&mut self, rule: R) {
        self.rules.push(Arc::new(rule));
    }

    /// Builder form of [`RewriteChain::add_rule`].
    #[must_use]
    pub fn with_rule<R: ExprRewriter + 'static>(mut self, rule: R) -> Self {
        self.add_rule(rule);
        self
    }

    /// Enable or disable tracing.
    #[must_use]
    pub fn with_trace(mut self, enable: bool) -> Self {
        self.config.enable_trace = enable;
        self
    }

    /// Names of the rewriters, in application order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Number of rewriters in the chain.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the chain has no rewriters.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rewriter once, in order.
    pub fn rewrite(&self, expr: Expr) -> RecastResult<RewrittenExpr> {
        let mut current = expr;
        let mut rules_applied = 0;
        let mut trace = Vec::new();

        for rule in &self.rules {
            let before = self.config.enable_trace.then(|| current.explain());

            let result = rule.rewrite(current)?;

            if result.changed {
                rules_applied += 1;
                debug!("Rewriter '{}' changed the expression", rule.name());
            }

            if let Some(before) = before {
                trace.push(RewriteTrace::new(
                    rule.name(),
                    before,
                    result.expr.explain(),
                    result.changed,
                ));
            }

            current = result.expr;
        }

        Ok(RewrittenExpr {
            expr: current,
            rules_applied,
            trace,
        })
    }
}

impl std::fmt::Debug for RewriteChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteChain")
            .field("rules", &self.rule_names())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use recast_core::{DataType, Value};
    use recast_expr::{lit, param};

    use super::*;
    use crate::FnRewriter;

    fn append(tag: &'static str) -> FnRewriter<impl Fn(Expr) -> RecastResult<Expr> + Send + Sync> {
        FnRewriter::new(tag, move |expr| match expr {
            Expr::Constant(Value::String(s)) => Ok(lit(format!("{s}{tag}"))),
            other => Ok(other),
        })
    }

    #[test]
    fn test_rules_apply_in_registration_order() {
        let chain = RewriteChain::default().with_rule(append("a")).with_rule(append("b"));
        assert_eq!(chain.rule_names(), vec!["a", "b"]);

        let result = chain.rewrite(lit("x")).unwrap();
        assert_eq!(result.expr, lit("xab"));
        assert_eq!(result.rules_applied, 2);

        let reversed = RewriteChain::default().with_rule(append("b")).with_rule(append("a"));
        assert_eq!(reversed.rewrite(lit("x")).unwrap().expr, lit("xba"));
    }

    #[test]
    fn test_each_rule_runs_once() {
        let chain = RewriteChain::default().with_rule(append("!"));
        let result = chain.rewrite(lit("x")).unwrap();
        assert_eq!(result.expr, lit("x!"));
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = RewriteChain::default();
        assert!(chain.is_empty());
        let expr = param("s", DataType::String).eq(lit("x"));
        let result = chain.rewrite(expr.clone()).unwrap();
        assert_eq!(result.expr, expr);
        assert_eq!(result.rules_applied, 0);
    }

    #[test]
    fn test_trace_disabled_by_default() {
        let chain = RewriteChain::default().with_rule(append("a"));
        assert!(chain.rewrite(lit("x")).unwrap().trace.is_empty());
    }

    #[test]
    fn test_trace_records_every_rule() {
        let chain = RewriteChain::default()
            .with_rule(append("a"))
            .with_rule(FnRewriter::new("identity", Ok))
            .with_trace(true);

        let result = chain.rewrite(lit("x")).unwrap();
        assert_eq!(result.trace.len(), 2);
        assert_eq!(result.trace[0].rule_name, "a");
        assert!(result.trace[0].changed);
        assert!(result.trace[0].before.contains("\"x\""));
        assert!(result.trace[0].after.contains("\"xa\""));
        assert!(!result.trace[1].changed);
        assert_eq!(result.rules_applied, 1);
    }

    #[test]
    fn test_from_config() {
        let chain = RewriteChain::from_config(&RewriteConfig::default());
        assert_eq!(chain.rule_names(), vec!["CaseInsensitiveEquality"]);

        let config = RewriteConfig {
            case_insensitive: false,
            enable_trace: true,
        };
        assert!(RewriteChain::from_config(&config).is_empty());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let expr = param("s", DataType::String).eq(lit("x"));
        let original = expr.clone();
        let chain = RewriteChain::from_config(&RewriteConfig::default());
        let rewritten = chain.rewrite(expr.clone()).unwrap();
        assert_ne!(rewritten.expr, expr);
        assert_eq!(expr, original);
    }
}
