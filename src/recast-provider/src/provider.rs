//! The provider abstraction.

use std::sync::Arc;

use common_error::RecastResult;
use recast_core::Value;
use recast_expr::Expr;

use crate::element::Element;
use crate::query::{DynQuery, Query};

/// A lazy stream of result rows.
pub type RowStream = Box<dyn Iterator<Item = RecastResult<Value>> + Send>;

/// Something that can build and run queries from expression trees.
///
/// Providers are shared behind `Arc` by every query handle they create, so
/// they must be usable from several threads at once.
pub trait QueryProvider: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Create a query handle owned by this provider.
    ///
    /// The element type is taken from the expression's declared sequence
    /// type, so the caller need not know it statically.
    fn create_query(self: Arc<Self>, expression: Expr) -> RecastResult<DynQuery>;

    /// Execute an expression that produces a single value.
    fn execute(&self, expression: &Expr) -> RecastResult<Value>;

    /// Execute an expression that produces a sequence.
    fn execute_query(&self, expression: &Expr) -> RecastResult<RowStream>;
}

/// Create a query with a statically known element type.
///
/// Goes through [`QueryProvider::create_query`] and checks that `T` accepts
/// the resolved element type.
pub fn create_query_as<T, P>(provider: &Arc<P>, expression: Expr) -> RecastResult<Query<T>>
where
    T: Element,
    P: QueryProvider + ?Sized,
{
    Arc::clone(provider).create_query(expression)?.typed()
}

/// Execute a scalar expression and convert the result.
pub fn execute_as<R, P>(provider: &P, expression: &Expr) -> RecastResult<R>
where
    R: Element,
    P: QueryProvider + ?Sized,
{
    R::from_value(provider.execute(expression)?)
}
