//! Core data model for Recast.
//!
//! This crate provides the types every other Recast crate agrees on:
//! - `Value` and `DataType` for the type system
//! - `Record` and `RecordType` for structured query elements
//! - `StringComparison` for the string equality modes a rewrite can request
//! - `MemberCache` for explicit, shareable member lookups

mod cache;
pub mod types;

pub use cache::{MemberCache, MemberInfo, MemberTable};
pub use types::{DataType, Field, Record, RecordType, StringComparison, Value};
