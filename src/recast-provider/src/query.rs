//! Typed query handles.

use std::marker::PhantomData;
use std::sync::Arc;

use common_error::{RecastError, RecastResult};
use recast_core::{DataType, MemberCache, Value};
use recast_expr::{Expr, Method, ParameterExpr, lit};
use recast_rewrite::{CaseInsensitiveEquality, ExprRewriter};

use crate::element::Element;
use crate::intercept::InterceptingProvider;
use crate::provider::{QueryProvider, RowStream};

/// Name of the parameter bound by lambdas built from closures.
const LAMBDA_PARAM: &str = "item";

/// A deferred query: a provider plus the expression it will run.
///
/// Building a query runs nothing. Each operator returns a new handle from the
/// same provider; each call to [`Query::iter`] or a terminal operator executes
/// the current expression from scratch.
pub struct Query<T> {
    provider: Arc<dyn QueryProvider>,
    expression: Expr,
    element_type: DataType,
    _marker: PhantomData<fn() -> T>,
}

/// Query whose element type is only known at runtime.
pub type DynQuery = Query<Value>;

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            expression: self.expression.clone(),
            element_type: self.element_type.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("provider", &self.provider.name())
            .field("element_type", &self.element_type)
            .field("expression", &self.expression)
            .finish()
    }
}

impl<T> std::fmt::Display for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}

impl DynQuery {
    /// Create a handle, resolving the element type from the expression.
    ///
    /// Fails with `TypeError` if the expression does not produce a sequence.
    pub fn new(provider: Arc<dyn QueryProvider>, expression: Expr) -> RecastResult<Self> {
        let element_type = match expression.data_type()? {
            DataType::Sequence(element) => *element,
            other => {
                return Err(RecastError::type_error(format!(
                    "query expression must produce a sequence, got {other}"
                )));
            }
        };

        Ok(Self {
            provider,
            expression,
            element_type,
            _marker: PhantomData,
        })
    }
}

impl<T> Query<T> {
    /// Element type of the sequence this query produces.
    pub const fn element_type(&self) -> &DataType {
        &self.element_type
    }

    /// Expression this query will execute.
    pub const fn expression(&self) -> &Expr {
        &self.expression
    }

    /// Provider that owns this query.
    pub const fn provider(&self) -> &Arc<dyn QueryProvider> {
        &self.provider
    }

    /// Render the query expression as an explain tree.
    pub fn explain(&self) -> String {
        self.expression.explain()
    }

    /// Reinterpret the elements as `U`.
    ///
    /// Fails with `TypeError` if `U` cannot hold this query's element type.
    pub fn typed<U: Element>(self) -> RecastResult<Query<U>> {
        if !U::accepts(&self.element_type) {
            return Err(RecastError::type_error(format!(
                "query over {} cannot produce {}",
                self.element_type,
                std::any::type_name::<U>()
            )));
        }
        Ok(self.with_provider(Arc::clone(&self.provider)))
    }

    /// Drop the static element type.
    pub fn into_dyn(self) -> DynQuery {
        self.with_provider(Arc::clone(&self.provider))
    }

    pub(crate) fn with_provider<U>(&self, provider: Arc<dyn QueryProvider>) -> Query<U> {
        Query {
            provider,
            expression: self.expression.clone(),
            element_type: self.element_type.clone(),
            _marker: PhantomData,
        }
    }

    /// Build a single-parameter lambda over the element type.
    fn lambda<F>(&self, body: F) -> RecastResult<Expr>
    where
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        let param = ParameterExpr::new(LAMBDA_PARAM, self.element_type.clone());
        let body = body(Expr::Parameter(param.clone()))?;
        Ok(Expr::lambda(vec![param], body))
    }

    /// Wrap the current expression in a call to `method`.
    fn call(&self, method: Method, extra: Vec<Expr>) -> RecastResult<Expr> {
        let mut args = Vec::with_capacity(extra.len() + 1);
        args.push(self.expression.clone());
        args.extend(extra);
        Expr::call(method, args)
    }

    /// Build a new handle from the owning provider.
    fn compose(&self, method: Method, extra: Vec<Expr>) -> RecastResult<DynQuery> {
        let expression = self.call(method, extra)?;
        Arc::clone(&self.provider).create_query(expression)
    }
}

impl<T: Element> Query<T> {
    /// Keep the elements matching a predicate.
    pub fn filter<F>(&self, predicate: F) -> RecastResult<Self>
    where
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        let lambda = self.lambda(predicate)?;
        self.compose(Method::Where, vec![lambda])?.typed()
    }

    /// Project each element; the result type is resolved at runtime.
    pub fn select<F>(&self, selector: F) -> RecastResult<DynQuery>
    where
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        let lambda = self.lambda(selector)?;
        self.compose(Method::Select, vec![lambda])
    }

    /// Project each element into `U`.
    pub fn select_as<U, F>(&self, selector: F) -> RecastResult<Query<U>>
    where
        U: Element,
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        self.select(selector)?.typed()
    }

    /// Sort ascending by a key.
    pub fn order_by<F>(&self, key: F) -> RecastResult<Self>
    where
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        self.ordered(Method::OrderBy, key)
    }

    /// Sort descending by a key.
    pub fn order_by_descending<F>(&self, key: F) -> RecastResult<Self>
    where
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        self.ordered(Method::OrderByDescending, key)
    }

    /// Add an ascending secondary key to an ordered query.
    pub fn then_by<F>(&self, key: F) -> RecastResult<Self>
    where
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        self.ordered(Method::ThenBy, key)
    }

    /// Add a descending secondary key to an ordered query.
    pub fn then_by_descending<F>(&self, key: F) -> RecastResult<Self>
    where
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        self.ordered(Method::ThenByDescending, key)
    }

    /// Sort by a record member named at runtime.
    ///
    /// The member is resolved through `cache` immediately, so an unknown name
    /// fails here with `MemberNotFound`. The sort key is typed from the cached
    /// entry.
    pub fn order_by_member(
        &self,
        cache: &MemberCache,
        member: &str,
        descending: bool,
    ) -> RecastResult<Self> {
        let record = self.element_type.as_record().ok_or_else(|| {
            RecastError::type_error(format!(
                "cannot order {} by member '{member}'",
                self.element_type
            ))
        })?;
        let info = cache.lookup(record, member)?;

        let method = if descending {
            Method::OrderByDescending
        } else {
            Method::OrderBy
        };
        self.ordered(method, |item| {
            Ok(Expr::Member {
                expr: Box::new(item),
                member: member.to_string(),
                data_type: info.data_type,
            })
        })
    }

    fn ordered<F>(&self, method: Method, key: F) -> RecastResult<Self>
    where
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        let lambda = self.lambda(key)?;
        self.compose(method, vec![lambda])?.typed()
    }

    /// Bypass the first `count` elements.
    pub fn skip(&self, count: i64) -> RecastResult<Self> {
        self.compose(Method::Skip, vec![lit(count)])?.typed()
    }

    /// Keep at most `count` elements.
    pub fn take(&self, count: i64) -> RecastResult<Self> {
        self.compose(Method::Take, vec![lit(count)])?.typed()
    }

    /// One page of results.
    ///
    /// Pages are numbered from 1; a page below 1 is read as the first page.
    pub fn page(&self, page_size: i64, page: i64) -> RecastResult<Self> {
        common_error::ensure!(
            page_size > 0,
            InvalidParameter: "page size must be positive, got {page_size}"
        );
        let offset = (page.max(1) - 1).checked_mul(page_size).ok_or_else(|| {
            RecastError::invalid_parameter(format!("page {page} of size {page_size} overflows"))
        })?;
        self.skip(offset)?.take(page_size)
    }

    /// Wrap this query so every execution goes through `rewriters` first.
    pub fn intercept(&self, rewriters: Vec<Arc<dyn ExprRewriter>>) -> RecastResult<Self> {
        InterceptingProvider::intercept(self, rewriters)
    }

    /// Compare strings for equality ignoring case.
    pub fn case_insensitive(&self) -> RecastResult<Self> {
        self.intercept(vec![Arc::new(CaseInsensitiveEquality)])
    }

    /// Execute the query and return a fresh stream of rows.
    pub fn iter(&self) -> RecastResult<Rows<T>> {
        let inner = self.provider.execute_query(&self.expression)?;
        Ok(Rows {
            inner,
            _marker: PhantomData,
        })
    }

    /// Execute the query and collect every row.
    pub fn to_vec(&self) -> RecastResult<Vec<T>> {
        self.iter()?.collect()
    }

    /// Number of elements.
    pub fn count(&self) -> RecastResult<i64> {
        self.terminal(Method::Count, vec![])
    }

    /// Number of elements matching a predicate.
    pub fn count_where<F>(&self, predicate: F) -> RecastResult<i64>
    where
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        let lambda = self.lambda(predicate)?;
        self.terminal(Method::Count, vec![lambda])
    }

    /// Whether the query yields any element.
    pub fn any(&self) -> RecastResult<bool> {
        self.terminal(Method::Any, vec![])
    }

    /// Whether any element matches a predicate.
    pub fn any_where<F>(&self, predicate: F) -> RecastResult<bool>
    where
        F: FnOnce(Expr) -> RecastResult<Expr>,
    {
        let lambda = self.lambda(predicate)?;
        self.terminal(Method::Any, vec![lambda])
    }

    /// First element; fails if the query yields nothing.
    pub fn first(&self) -> RecastResult<T> {
        self.terminal(Method::First, vec![])
    }

    fn terminal<R: Element>(&self, method: Method, extra: Vec<Expr>) -> RecastResult<R> {
        let expression = self.call(method, extra)?;
        R::from_value(self.provider.execute(&expression)?)
    }
}

/// Forward-only stream of typed rows from one execution.
pub struct Rows<T> {
    inner: RowStream,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Element> Iterator for Rows<T> {
    type Item = RecastResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|row| row.and_then(T::from_value))
    }
}

impl<T> std::fmt::Debug for Rows<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rows").finish_non_exhaustive()
    }
}
