//! Error types and result aliases for Recast.
//!
//! Every crate in the workspace reports failures through [`RecastError`] so
//! that errors raised by an underlying query engine keep their identity when
//! they travel back through an intercepting provider.

mod error;

pub use error::{RecastError, RecastResult};
