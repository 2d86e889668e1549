//! Query providers and query handles.
//!
//! A [`QueryProvider`] turns expression trees into results. A [`Query`] pairs
//! a provider with the expression describing what to compute; composing
//! operators on a query builds a larger expression and hands it back to the
//! same provider, and enumerating a query asks the provider to run it.
//!
//! [`InterceptingProvider`] wraps another provider and sends every expression
//! through a [`RewriteChain`](recast_rewrite::RewriteChain) before delegating.

mod element;
mod intercept;
mod provider;
mod query;

pub use element::Element;
pub use intercept::InterceptingProvider;
pub use provider::{QueryProvider, RowStream, create_query_as, execute_as};
pub use query::{DynQuery, Query, Rows};
