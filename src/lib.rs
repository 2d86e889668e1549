//! Recast - query expression rewriting
//!
//! Recast rewrites query expression trees before they reach a query engine.
//! Its core is a case-insensitive string equality rewriter and an
//! intercepting query provider that runs a chain of rewriters over every
//! expression before delegating execution.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export core crates
pub use common_config as config;
pub use common_error as error;
pub use recast_core as core;
pub use recast_engine as engine;
pub use recast_expr as expr;
pub use recast_provider as provider;
pub use recast_rewrite as rewrite;

pub use common_error::{RecastError, RecastResult};
pub use recast_provider::{DynQuery, InterceptingProvider, Query, QueryProvider};
pub use recast_rewrite::{CaseInsensitiveEquality, ExprRewriter, RewriteChain};

/// Recast version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
