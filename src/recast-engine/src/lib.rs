//! In-memory execution engine for Recast.
//!
//! This crate provides a reference [`QueryProvider`](recast_provider::QueryProvider)
//! that runs query expression trees over named in-memory sources. It is the
//! engine the rewrite and interception layers are exercised against; it knows
//! nothing about rewriting itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │  Expr (Call …)  │ ──▶ │  MemoryProvider  │ ──▶ │    RowStream     │
//! │  (recast-expr)  │     │  stream / sort   │     │  (lazy, pulled)  │
//! └─────────────────┘     └──────────────────┘     └──────────────────┘
//!                                │
//!                                ▼
//!                     Evaluator + CompiledLambda
//! ```
//!
//! - [`MemoryProvider`]: named sources, validated on registration
//! - [`Evaluator`]: scalar evaluation with parameter [`Bindings`]
//! - [`CompiledLambda`]: a lambda ready to be invoked per row

#![allow(clippy::missing_const_for_fn)] // Builder patterns often can't be const
#![allow(clippy::return_self_not_must_use)] // Builder patterns don't always need must_use
#![allow(clippy::doc_markdown)] // Documentation backticks are sometimes unnecessary
#![allow(clippy::needless_pass_by_value)] // Streams are moved into operators
#![allow(clippy::match_same_arms)] // Some match arms intentionally have same body
#![allow(clippy::option_if_let_else)] // if let/else is sometimes clearer than map_or

mod evaluator;
mod lambda;
mod operators;
mod provider;

pub use evaluator::{Bindings, Evaluator};
pub use lambda::{CompiledLambda, compile_lambda};
pub use provider::MemoryProvider;
