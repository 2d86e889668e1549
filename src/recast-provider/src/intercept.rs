//! Provider decorator that rewrites expressions before execution.

use std::sync::Arc;

use common_config::RewriteConfig;
use common_error::RecastResult;
use log::{debug, trace};
use recast_core::Value;
use recast_expr::Expr;
use recast_rewrite::{ExprRewriter, RewriteChain};

use crate::element::Element;
use crate::provider::{QueryProvider, RowStream};
use crate::query::{DynQuery, Query};

/// Wraps a provider and rewrites every expression before delegating to it.
///
/// The wrapper holds no state besides the delegate and the chain. Nothing is
/// cached: each execution rewrites the expression again, and errors from the
/// chain or the delegate are returned as they are.
pub struct InterceptingProvider {
    inner: Arc<dyn QueryProvider>,
    chain: RewriteChain,
}

impl InterceptingProvider {
    /// Wrap `inner` with `chain`.
    pub fn new(inner: Arc<dyn QueryProvider>, chain: RewriteChain) -> Self {
        Self { inner, chain }
    }

    /// Intercept `source` with `rewriters`, applied in the given order.
    ///
    /// Returns a new handle over the same expression; nothing runs until it
    /// is enumerated.
    pub fn intercept<T: Element>(
        source: &Query<T>,
        rewriters: Vec<Arc<dyn ExprRewriter>>,
    ) -> RecastResult<Query<T>> {
        Self::intercept_with_chain(source, RewriteChain::new(rewriters))
    }

    /// Intercept `source` with a prebuilt chain.
    pub fn intercept_with_chain<T: Element>(
        source: &Query<T>,
        chain: RewriteChain,
    ) -> RecastResult<Query<T>> {
        let provider = Arc::new(Self::new(Arc::clone(source.provider()), chain));
        Ok(source.with_provider(provider))
    }

    /// Intercept `source` with the chain described by `config`.
    pub fn from_config<T: Element>(
        source: &Query<T>,
        config: &RewriteConfig,
    ) -> RecastResult<Query<T>> {
        Self::intercept_with_chain(source, RewriteChain::from_config(config))
    }

    /// The wrapped provider.
    pub const fn inner(&self) -> &Arc<dyn QueryProvider> {
        &self.inner
    }

    /// The rewrite chain.
    pub const fn chain(&self) -> &RewriteChain {
        &self.chain
    }

    fn rewrite(&self, expression: &Expr) -> RecastResult<Expr> {
        trace!(
            "Intercepting expression for provider '{}': {expression}",
            self.inner.name()
        );

        let rewritten = self.chain.rewrite(expression.clone())?;
        if !rewritten.trace.is_empty() {
            debug!("{}", rewritten.format_trace());
        }
        Ok(rewritten.expr)
    }
}

impl QueryProvider for InterceptingProvider {
    fn name(&self) -> &str {
        "intercepting"
    }

    fn create_query(self: Arc<Self>, expression: Expr) -> RecastResult<DynQuery> {
        DynQuery::new(self, expression)
    }

    fn execute(&self, expression: &Expr) -> RecastResult<Value> {
        let rewritten = self.rewrite(expression)?;
        self.inner.execute(&rewritten)
    }

    fn execute_query(&self, expression: &Expr) -> RecastResult<RowStream> {
        let rewritten = self.rewrite(expression)?;
        self.inner.execute_query(&rewritten)
    }
}

impl std::fmt::Debug for InterceptingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptingProvider")
            .field("inner", &self.inner.name())
            .field("chain", &self.chain)
            .finish()
    }
}
